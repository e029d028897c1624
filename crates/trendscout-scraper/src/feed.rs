//! Collector for pre-scraped listing feeds.
//!
//! A feed is a JSON array of raw listing objects, served over HTTP(S) or
//! stored on disk. It is how marketplace and social scrapers that run out of
//! process hand their output to the aggregator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use trendscout_core::{RawListing, Source};

use crate::collector::SourceCollector;
use crate::error::ScraperError;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone)]
enum FeedLocation {
    Remote(String),
    File(PathBuf),
}

pub struct JsonFeedCollector {
    name: String,
    source: Source,
    location: FeedLocation,
    client: Client,
    retry: RetryPolicy,
}

impl JsonFeedCollector {
    /// `location` is treated as a URL when it starts with `http://` or
    /// `https://`, otherwise as a filesystem path (a `file://` prefix is
    /// stripped).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] for an unparseable remote URL or an
    /// empty location, and [`ScraperError::Http`] if the client cannot be
    /// built.
    pub fn new(
        name: impl Into<String>,
        location: &str,
        source: Source,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, ScraperError> {
        let location = parse_location(location)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            name: name.into(),
            source,
            location,
            client,
            retry,
        })
    }

    async fn fetch_remote(&self, url: &str) -> Result<String, ScraperError> {
        self.retry
            .run(|| async move {
                let response = self.client.get(url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    let domain = reqwest::Url::parse(url)
                        .ok()
                        .and_then(|u| u.host_str().map(str::to_owned))
                        .unwrap_or_else(|| url.to_owned());
                    return Err(ScraperError::RateLimited {
                        domain,
                        retry_after_secs,
                    });
                }
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound {
                        url: url.to_owned(),
                    });
                }
                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_owned(),
                    });
                }

                Ok(response.text().await?)
            })
            .await
    }

    async fn read_file(path: &Path) -> Result<String, ScraperError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScraperError::Io {
                path: path.display().to_string(),
                source: e,
            })
    }
}

#[async_trait]
impl SourceCollector for JsonFeedCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> Source {
        self.source.clone()
    }

    async fn collect(&self) -> Result<Vec<RawListing>, ScraperError> {
        let body = match &self.location {
            FeedLocation::Remote(url) => self.fetch_remote(url).await?,
            FeedLocation::File(path) => Self::read_file(path).await?,
        };
        parse_feed(&self.name, &body)
    }
}

fn parse_location(location: &str) -> Result<FeedLocation, ScraperError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(ScraperError::InvalidUrl {
            url: location.to_owned(),
            reason: "feed location is empty".to_owned(),
        });
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        reqwest::Url::parse(trimmed).map_err(|e| ScraperError::InvalidUrl {
            url: trimmed.to_owned(),
            reason: e.to_string(),
        })?;
        return Ok(FeedLocation::Remote(trimmed.to_owned()));
    }

    let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
    Ok(FeedLocation::File(PathBuf::from(path)))
}

/// Parse a feed body into raw listings.
///
/// The top level must be a JSON array. Items that are not objects of the
/// raw listing shape are skipped with a warning rather than failing the feed.
///
/// # Errors
///
/// Returns [`ScraperError::Deserialize`] when the body is not a JSON array.
pub fn parse_feed(name: &str, body: &str) -> Result<Vec<RawListing>, ScraperError> {
    let items: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| ScraperError::Deserialize {
            context: format!("listing feed {name}"),
            source: e,
        })?;

    let mut listings = Vec::with_capacity(items.len());
    let mut skipped = 0usize;

    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawListing>(item) {
            Ok(raw) => listings.push(raw),
            Err(e) => {
                skipped += 1;
                tracing::warn!(collector = name, index, error = %e, "skipping malformed feed item");
            }
        }
    }

    if skipped > 0 {
        tracing::info!(
            collector = name,
            parsed = listings.len(),
            skipped,
            "feed parsed with skipped items"
        );
    }

    Ok(listings)
}
