//! Collector for storefronts that expose the public `products.json` endpoint.

mod listing;
mod origin;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use trendscout_core::{RawListing, Source};

use crate::collector::SourceCollector;
use crate::error::ScraperError;
use crate::pagination::next_page_cursor;
use crate::retry::RetryPolicy;

pub use listing::product_to_raw_listing;
pub use origin::store_origin;
use types::{ProductsPage, StoreProduct};

/// Pages fetched before giving up on a store. Guards against cursors that
/// cycle back on themselves.
pub const MAX_PAGES: usize = 200;

/// Largest page size the endpoint honours.
pub const DEFAULT_PAGE_LIMIT: u32 = 250;

/// Collects every product of one storefront as raw listings.
///
/// Pages are requested sequentially, following the `Link` header cursor,
/// with `inter_request_delay_ms` between requests. Each page request is
/// retried on 429 and network errors. Any page failure fails the whole
/// collection; a half-read store is reported as a failed collector.
pub struct ShopifyCollector {
    name: String,
    source: Source,
    origin: String,
    page_limit: u32,
    inter_request_delay_ms: u64,
    client: Client,
    retry: RetryPolicy,
}

impl ShopifyCollector {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `store_url` has no usable
    /// origin, or [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(
        name: impl Into<String>,
        store_url: &str,
        source: Source,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, ScraperError> {
        let origin = store_origin(store_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            name: name.into(),
            source,
            origin,
            page_limit: DEFAULT_PAGE_LIMIT,
            inter_request_delay_ms: 0,
            client,
            retry,
        })
    }

    /// Page size requested from the store, clamped to `1..=250`.
    #[must_use]
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.clamp(1, DEFAULT_PAGE_LIMIT);
        self
    }

    #[must_use]
    pub fn with_inter_request_delay_ms(mut self, delay_ms: u64) -> Self {
        self.inter_request_delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Fetch every product across all pages.
    ///
    /// # Errors
    ///
    /// Propagates the first page error, or [`ScraperError::PaginationLimit`]
    /// once more than [`MAX_PAGES`] pages have been requested.
    pub async fn fetch_all_products(&self) -> Result<Vec<StoreProduct>, ScraperError> {
        let mut products = Vec::new();
        let mut cursor: Option<String> = None;

        for page in 0..MAX_PAGES {
            if page > 0 && self.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.inter_request_delay_ms)).await;
            }

            let (batch, link_header) = self.fetch_page(cursor.as_deref()).await?;
            tracing::debug!(
                collector = %self.name,
                page = page + 1,
                products = batch.products.len(),
                "fetched products page"
            );
            products.extend(batch.products);

            match next_page_cursor(link_header.as_deref()) {
                Some(next) => cursor = Some(next),
                None => return Ok(products),
            }
        }

        Err(ScraperError::PaginationLimit {
            url: self.origin.clone(),
            max_pages: MAX_PAGES,
        })
    }

    async fn fetch_page(
        &self,
        page_info: Option<&str>,
    ) -> Result<(ProductsPage, Option<String>), ScraperError> {
        let url = self.products_url(page_info)?;

        self.retry
            .run(|| {
                let url = url.clone();
                async move {
                    let response = self
                        .client
                        .get(&url)
                        .header(reqwest::header::ACCEPT, "application/json")
                        .send()
                        .await?;
                    let status = response.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after_secs = response
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(60);
                        return Err(ScraperError::RateLimited {
                            domain: origin::host_of(&url),
                            retry_after_secs,
                        });
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(ScraperError::NotFound { url });
                    }

                    if !status.is_success() {
                        return Err(ScraperError::UnexpectedStatus {
                            status: status.as_u16(),
                            url,
                        });
                    }

                    let link_header = response
                        .headers()
                        .get(reqwest::header::LINK)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);

                    let body = response.text().await?;
                    let page = serde_json::from_str::<ProductsPage>(&body).map_err(|e| {
                        ScraperError::Deserialize {
                            context: format!("products page from {url}"),
                            source: e,
                        }
                    })?;

                    Ok((page, link_header))
                }
            })
            .await
    }

    fn products_url(&self, page_info: Option<&str>) -> Result<String, ScraperError> {
        let base = format!("{}/products.json", self.origin);
        let mut url = reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;

        url.query_pairs_mut()
            .append_pair("limit", &self.page_limit.to_string());
        if let Some(cursor) = page_info {
            url.query_pairs_mut().append_pair("page_info", cursor);
        }

        Ok(url.to_string())
    }
}

#[async_trait]
impl SourceCollector for ShopifyCollector {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> Source {
        self.source.clone()
    }

    async fn collect(&self) -> Result<Vec<RawListing>, ScraperError> {
        let products = self.fetch_all_products().await?;
        Ok(products
            .into_iter()
            .map(|p| product_to_raw_listing(p, &self.origin))
            .collect())
    }
}
