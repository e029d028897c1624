//! Product listings as they flow from collectors to the published snapshot.
//!
//! Collectors emit [`RawListing`]s, where every field is optional because the
//! upstream pages are noisy. [`Listing::from_raw`] is the ingestion gate:
//! anything without a title, image URL, or product URL is rejected there and
//! never reaches scoring.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a listing was observed.
///
/// Serialized as a lowercase tag (`"amazon"`, `"ebay"`, ...). Tags that do not
/// map to a known marketplace survive as [`Source::Other`] with the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    Amazon,
    Ebay,
    Instagram,
    TikTok,
    AliExpress,
    Shopify,
    Other(String),
}

impl Source {
    /// Wire tag for this source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Source::Amazon => "amazon",
            Source::Ebay => "ebay",
            Source::Instagram => "instagram",
            Source::TikTok => "tiktok",
            Source::AliExpress => "aliexpress",
            Source::Shopify => "shopify",
            Source::Other(tag) => tag,
        }
    }

    /// Human-facing name, e.g. `"eBay"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Source::Amazon => "Amazon",
            Source::Ebay => "eBay",
            Source::Instagram => "Instagram",
            Source::TikTok => "TikTok",
            Source::AliExpress => "AliExpress",
            Source::Shopify => "Shopify",
            Source::Other(tag) => tag,
        }
    }
}

impl From<String> for Source {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "amazon" => Source::Amazon,
            "ebay" => Source::Ebay,
            "instagram" => Source::Instagram,
            "tiktok" => Source::TikTok,
            "aliexpress" => Source::AliExpress,
            "shopify" => Source::Shopify,
            _ => Source::Other(raw.trim().to_string()),
        }
    }
}

impl From<&str> for Source {
    fn from(raw: &str) -> Self {
        Source::from(raw.to_string())
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        match source {
            Source::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listing exactly as a collector scraped it, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
    /// Overrides the collector's own source tag when present (aggregating
    /// feeds carry one per item).
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub sold_count: Option<u64>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("listing is missing required field `{0}`")]
    MissingField(&'static str),
}

/// One observed product occurrence, validated and ready for scoring.
///
/// `trend_score` is `None` until the scorer runs; once set it is at least 1.
/// `sold_count` and `rating` are presentational only and never influence
/// similarity or scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub image_url: String,
    pub product_url: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_score: Option<u32>,
}

impl Listing {
    /// Validate a raw listing.
    ///
    /// Text fields are trimmed and a blank value counts as missing. Prices
    /// that are blank or the scraper placeholder `"N/A"` become `None`.
    /// `fallback_source` is used when the raw listing does not name one.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::MissingField`] when `title`, `imageUrl`, or
    /// `productUrl` is absent or blank.
    pub fn from_raw(raw: RawListing, fallback_source: &Source) -> Result<Self, ListingError> {
        let title = required(raw.title, "title")?;
        let image_url = required(raw.image_url, "imageUrl")?;
        let product_url = required(raw.product_url, "productUrl")?;

        let price = raw
            .price
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("n/a"));

        let rating = raw.rating.filter(|r| r.is_finite());

        Ok(Self {
            title,
            price,
            image_url,
            product_url,
            source: raw.source.unwrap_or_else(|| fallback_source.clone()),
            sold_count: raw.sold_count,
            rating,
            trend_score: None,
        })
    }

    /// Returns a copy annotated with `score`.
    #[must_use]
    pub fn with_trend_score(mut self, score: u32) -> Self {
        self.trend_score = Some(score);
        self
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ListingError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ListingError::MissingField(field))
}
