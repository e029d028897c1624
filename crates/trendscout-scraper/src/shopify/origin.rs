//! Store origin and host helpers.

use crate::error::ScraperError;

/// Scheme + host (+ port) of a storefront URL.
///
/// `"https://cozyhome.example.com/collections/all"` becomes
/// `"https://cozyhome.example.com"`, so `products.json` is always requested
/// from the store root.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] when `store_url` is not an absolute
/// http(s) URL.
pub fn store_origin(store_url: &str) -> Result<String, ScraperError> {
    let url = reqwest::Url::parse(store_url).map_err(|e| ScraperError::InvalidUrl {
        url: store_url.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            url: store_url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }

    Ok(url.origin().ascii_serialization())
}

/// Hostname for log fields and error messages; falls back to the input.
pub(super) fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
