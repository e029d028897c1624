//! Builds the collector set from the sources file.

use std::sync::Arc;

use trendscout_core::{AppConfig, SourceConfig, SourceKind};

use crate::collector::SourceCollector;
use crate::error::ScraperError;
use crate::feed::JsonFeedCollector;
use crate::retry::RetryPolicy;
use crate::shopify::ShopifyCollector;

/// HTTP behaviour shared by every collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub inter_request_delay_ms: u64,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.scraper_request_timeout_secs,
            user_agent: config.scraper_user_agent.clone(),
            inter_request_delay_ms: config.scraper_inter_request_delay_ms,
            max_retries: config.scraper_max_retries,
            backoff_base_secs: config.scraper_retry_backoff_base_secs,
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.backoff_base_secs)
    }
}

/// Instantiate one collector per configured source, preserving file order.
///
/// Registration order is the order listings appear in a batch, so it is kept
/// exactly as written.
///
/// # Errors
///
/// Returns the first construction error (bad URL, HTTP client failure).
/// A misconfigured source is a startup problem, not a per-run one.
pub fn build_collectors(
    sources: &[SourceConfig],
    http: &HttpSettings,
) -> Result<Vec<Arc<dyn SourceCollector>>, ScraperError> {
    sources
        .iter()
        .map(|config| build_collector(config, http))
        .collect()
}

fn build_collector(
    config: &SourceConfig,
    http: &HttpSettings,
) -> Result<Arc<dyn SourceCollector>, ScraperError> {
    let source = config.source_tag();

    let collector: Arc<dyn SourceCollector> = match config.kind {
        SourceKind::Shopify => {
            let mut collector = ShopifyCollector::new(
                config.name.clone(),
                &config.url,
                source,
                http.timeout_secs,
                &http.user_agent,
                http.retry_policy(),
            )?
            .with_inter_request_delay_ms(http.inter_request_delay_ms);
            if let Some(limit) = config.limit {
                collector = collector.with_page_limit(limit);
            }
            Arc::new(collector)
        }
        SourceKind::JsonFeed => Arc::new(JsonFeedCollector::new(
            config.name.clone(),
            &config.url,
            source,
            http.timeout_secs,
            &http.user_agent,
            http.retry_policy(),
        )?),
    };

    tracing::debug!(
        collector = %config.name,
        kind = %config.kind,
        source = %collector.source(),
        "registered collector"
    );

    Ok(collector)
}
