//! Title normalization into keyword sets.
//!
//! Scraped titles are noisy: Instagram alt text ("Photo by ... on
//! Instagram"), influencer hashtags, emoji, unit counts. Normalization keeps
//! only the distinctive words so titles from different marketplaces can be
//! compared.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Hashtags and mentions, removed as whole tokens before punctuation is
/// stripped so `#amazonfinds` doesn't survive as `amazonfinds`.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#@]\S+").expect("valid tag regex"));

/// Anything that is not a letter, number, underscore or whitespace. Unicode
/// `\w` is not used because it keeps combining marks and joiners, so emoji
/// variation selectors (U+FE0F), keycaps (U+20E3) and ZWJ would survive.
static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_\s]").expect("valid punctuation regex"));

/// Domain junk: platform names, alt-text boilerplate, calls-to-action and
/// influencer tags that are written without the `#`.
pub const STOPWORDS: &[&str] = &[
    "photo",
    "by",
    "on",
    "instagram",
    "may",
    "be",
    "an",
    "image",
    "of",
    "and",
    "link",
    "in",
    "my",
    "bio",
    "to",
    "shop",
    "amazon",
    "home",
    "finds",
    "amazonhome",
    "amazoninfluencer",
    "founditonamazon",
    "amazonmusthaves",
    "amazonfavorites",
    "amazonprime",
    "amazonfinds",
    "ltkhome",
    "ltkunder",
    "ad",
];

/// Normalized, deduplicated keywords of one title.
///
/// Ordered so printed output and serialized artifacts are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, keyword: &str) -> bool {
        self.0.contains(keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of keywords present in both sets.
    #[must_use]
    pub fn shared_count(&self, other: &KeywordSet) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.0.iter().filter(|k| large.0.contains(*k)).count()
    }

    /// Keywords present in both sets, in sorted order.
    #[must_use]
    pub fn shared<'a>(&'a self, other: &'a KeywordSet) -> Vec<&'a str> {
        self.0.intersection(&other.0).map(String::as_str).collect()
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Reduce a raw title to its keyword set.
///
/// Steps, in order: lowercase, drop `#tag`/`@mention` tokens, strip
/// punctuation and symbols, split on whitespace, then drop stopwords,
/// numeric tokens and tokens with no letter or digit left (`"_"`). A title
/// made only of junk yields an empty set.
#[must_use]
pub fn normalize(title: &str) -> KeywordSet {
    let lowered = title.to_lowercase();
    let without_tags = TAG_RE.replace_all(&lowered, " ");
    let cleaned = NON_WORD_RE.replace_all(&without_tags, "");

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .filter(|token| !is_stopword(token) && !is_numeric(token))
        .collect()
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// A token is numeric only when the whole of it parses as a number, so
/// `"500"` is dropped but `"32oz"` is kept. Requiring a digit keeps words
/// like `"inf"` and `"nan"` that `f64` would otherwise accept. Hex, binary
/// and octal literals (`0x1f`, `0b101`, `0o17`) count as numbers too.
fn is_numeric(token: &str) -> bool {
    if let Some(radix) = radix_literal(token) {
        return radix;
    }
    token.bytes().any(|b| b.is_ascii_digit()) && token.parse::<f64>().is_ok()
}

/// `Some(valid)` when `token` carries a `0x`/`0b`/`0o` prefix.
fn radix_literal(token: &str) -> Option<bool> {
    let (radix, digits) = match token.get(..2)? {
        "0x" => (16, &token[2..]),
        "0b" => (2, &token[2..]),
        "0o" => (8, &token[2..]),
        _ => return None,
    };
    Some(!digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(words: &[&str]) -> KeywordSet {
        words.iter().copied().collect()
    }

    #[test]
    fn lowercases_and_splits() {
        assert_eq!(
            normalize("Wireless Bluetooth Earbuds Noise Cancelling"),
            set(&["wireless", "bluetooth", "earbuds", "noise", "cancelling"])
        );
    }

    #[test]
    fn strips_hashtags_and_mentions_whole() {
        assert_eq!(
            normalize("Sunset lamp #amazonfinds #TikTokMadeMeBuyIt @cozy.home"),
            set(&["sunset", "lamp"])
        );
    }

    #[test]
    fn strips_punctuation_and_emoji() {
        assert_eq!(
            normalize("✨ Ice-Roller, for face!! ✨"),
            set(&["iceroller", "for", "face"])
        );
    }

    #[test]
    fn instagram_alt_text_boilerplate_is_removed() {
        assert_eq!(
            normalize("Photo by Cozy Home on Instagram. May be an image of lamp"),
            set(&["cozy", "lamp"])
        );
    }

    #[test]
    fn all_stopwords_yields_empty_set() {
        assert!(normalize("Amazon Home Finds").is_empty());
        assert!(normalize("").is_empty());
        assert!(normalize("   #ad  @shop ").is_empty());
    }

    #[test]
    fn numeric_tokens_are_dropped_but_units_kept() {
        assert_eq!(normalize("32oz Tumbler"), set(&["32oz", "tumbler"]));
        assert!(normalize("500").is_empty());
        assert_eq!(normalize("500 sold tumbler"), set(&["sold", "tumbler"]));
        assert_eq!(normalize("1e3 pack"), set(&["pack"]));
    }

    #[test]
    fn number_like_words_are_kept() {
        assert_eq!(normalize("inf nan"), set(&["inf", "nan"]));
        assert_eq!(normalize("0xford 0b 0o"), set(&["0xford", "0b", "0o"]));
    }

    #[test]
    fn radix_literals_are_numeric() {
        assert_eq!(normalize("0x1f lamp"), set(&["lamp"]));
        assert_eq!(normalize("0X1F 0b101 0o17 lamp"), set(&["lamp"]));
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(normalize("Lamp lamp LAMP"), set(&["lamp"]));
    }

    #[test]
    fn unicode_words_survive() {
        assert_eq!(normalize("Café Crème"), set(&["café", "crème"]));
        assert_eq!(normalize("Плед Уютный"), set(&["плед", "уютный"]));
    }

    #[test]
    fn emoji_sequences_leave_no_residue() {
        assert_eq!(normalize("Fuzzy Socks ❤️"), set(&["fuzzy", "socks"]));
        assert_eq!(normalize("Lamp 1️⃣"), set(&["lamp"]));
        assert_eq!(normalize("Sunset ☀️ Lamp ✔️"), set(&["sunset", "lamp"]));
        let family = normalize("Family 👨\u{200d}👩\u{200d}👧 Mug");
        assert_eq!(family, set(&["family", "mug"]));
        assert!(normalize("❤️ ☀️ 👍🏽").is_empty());
    }

    #[test]
    fn underscore_only_tokens_are_dropped() {
        assert_eq!(normalize("_ __ cozy_lamp"), set(&["cozy_lamp"]));
    }

    #[test]
    fn shared_counts_intersection() {
        let a = normalize("Wireless Bluetooth Earbuds Noise Cancelling");
        let b = normalize("Bluetooth Wireless Earbuds with Case");
        assert_eq!(a.shared_count(&b), 3);
        assert_eq!(b.shared_count(&a), 3);
        assert_eq!(a.shared(&b), vec!["bluetooth", "earbuds", "wireless"]);
    }

    proptest! {
        #[test]
        fn normalize_ignores_case(title in "[a-zA-Z0-9 #@.,!-]{0,60}") {
            prop_assert_eq!(normalize(&title), normalize(&title.to_uppercase()));
        }

        #[test]
        fn normalize_ignores_surrounding_punctuation(title in "[a-z0-9 ]{0,60}") {
            let noisy: String = title
                .split(' ')
                .map(|w| format!("{w}!,"))
                .collect::<Vec<_>>()
                .join(" ");
            prop_assert_eq!(normalize(&title), normalize(&noisy));
        }

        #[test]
        fn keywords_are_clean(title in "\\PC{0,80}") {
            for keyword in &normalize(&title) {
                prop_assert!(!keyword.is_empty());
                prop_assert!(!STOPWORDS.contains(&keyword.as_str()));
                prop_assert!(!is_numeric(keyword));
                prop_assert!(!keyword.contains(char::is_whitespace));
                prop_assert!(keyword.chars().any(char::is_alphanumeric));
                prop_assert!(keyword.chars().all(|c| c.is_alphanumeric() || c == '_'));
            }
        }

        #[test]
        fn emoji_decoration_does_not_change_keywords(
            words in prop::collection::vec("[a-z]{1,8}", 0..6),
            emoji in prop::sample::select(vec!["❤️", "☀️", "✔️", "1️⃣", "👍🏽", "✨", "👨\u{200d}👩"]),
        ) {
            let plain = words.join(" ");
            let decorated = words
                .iter()
                .map(|w| format!("{w} {emoji}"))
                .collect::<Vec<_>>()
                .join(" ");
            prop_assert_eq!(normalize(&plain), normalize(&decorated));
        }
    }
}
