//! Cursor pagination driven by the RFC 8288 `Link` response header.
//!
//! Storefronts advertise adjacent pages as
//! `<https://shop/products.json?limit=250&page_info=CURSOR>; rel="next"`,
//! optionally preceded by a `rel="previous"` entry.

/// Returns the `page_info` cursor of the `rel="next"` link, if any.
#[must_use]
pub fn next_page_cursor(link_header: Option<&str>) -> Option<String> {
    let (target, _) = link_entries(link_header?).find(|(_, rel)| *rel == "next")?;
    let url = reqwest::Url::parse(target).ok()?;
    url.query_pairs()
        .find(|(key, value)| key == "page_info" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Iterates `(target, rel)` pairs of a `Link` header, skipping malformed
/// entries.
fn link_entries(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header.split(',').filter_map(|entry| {
        let mut parts = entry.split(';').map(str::trim);
        let target = parts
            .next()?
            .strip_prefix('<')?
            .strip_suffix('>')?;
        let rel = parts.find_map(|param| {
            param
                .strip_prefix("rel=")
                .map(|v| v.trim_matches('"'))
        })?;
        Some((target, rel))
    })
}
