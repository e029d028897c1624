//! Source collector abstraction and the best-effort fan-in over all sources.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use trendscout_core::{Listing, RawListing, Source};

use crate::error::ScraperError;

/// One origin of raw listings (a marketplace, a social feed, a storefront).
///
/// Implementations may fail freely; [`collect_all`] turns a failure into an
/// empty contribution so one bad source never aborts the batch.
#[async_trait]
pub trait SourceCollector: Send + Sync {
    /// Stable identifier used in logs and run reports.
    fn name(&self) -> &str;

    /// Tag applied to listings that don't name their own source.
    fn source(&self) -> Source;

    async fn collect(&self) -> Result<Vec<RawListing>, ScraperError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorOutcome {
    Collected {
        /// Listings the collector returned.
        raw: usize,
        /// Listings that passed validation and deduplication.
        accepted: usize,
        /// Listings missing a title, image URL, or product URL.
        rejected: usize,
        /// Repeats of a product URL already seen from this collector.
        duplicates: usize,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone)]
pub struct CollectorReport {
    pub name: String,
    pub source: Source,
    pub outcome: CollectorOutcome,
}

/// Validated listings from every collector, concatenated in registration
/// order, plus a per-collector account of what happened.
#[derive(Debug, Default)]
pub struct CollectedBatch {
    pub listings: Vec<Listing>,
    pub reports: Vec<CollectorReport>,
}

impl CollectedBatch {
    #[must_use]
    pub fn failed_collectors(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, CollectorOutcome::Failed { .. }))
            .count()
    }
}

/// Run every collector concurrently and merge their output.
///
/// Never fails. Each collector runs on its own task, so an error or a panic
/// is logged and recorded as [`CollectorOutcome::Failed`] with no listings.
/// Output order follows the order of `collectors`, not completion order.
pub async fn collect_all(collectors: &[Arc<dyn SourceCollector>]) -> CollectedBatch {
    let handles = collectors.iter().map(|collector| {
        let collector = Arc::clone(collector);
        tokio::spawn(async move { collector.collect().await })
    });
    let results = join_all(handles).await;

    let mut batch = CollectedBatch::default();

    for (collector, joined) in collectors.iter().zip(results) {
        let name = collector.name().to_string();
        let source = collector.source();
        let result = joined.unwrap_or_else(|e| Err(ScraperError::CollectorTask(e.to_string())));

        let outcome = match result {
            Ok(raws) => {
                let raw = raws.len();
                let accepted = accept_listings(&name, &source, raws);
                let outcome = CollectorOutcome::Collected {
                    raw,
                    accepted: accepted.listings.len(),
                    rejected: accepted.rejected,
                    duplicates: accepted.duplicates,
                };
                tracing::info!(
                    collector = %name,
                    source = %source,
                    raw,
                    accepted = accepted.listings.len(),
                    rejected = accepted.rejected,
                    duplicates = accepted.duplicates,
                    "collector finished"
                );
                batch.listings.extend(accepted.listings);
                outcome
            }
            Err(e) => {
                tracing::warn!(
                    collector = %name,
                    source = %source,
                    error = %e,
                    "collector failed; contributing no listings"
                );
                CollectorOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        batch.reports.push(CollectorReport {
            name,
            source,
            outcome,
        });
    }

    batch
}

/// One source's output after validation and deduplication.
#[derive(Debug, Default)]
pub struct Accepted {
    pub listings: Vec<Listing>,
    pub rejected: usize,
    pub duplicates: usize,
}

/// Validate one source's output and collapse repeated product URLs,
/// keeping the first occurrence.
///
/// Duplicates are only collapsed within a single source; the same URL
/// reported by two collectors is cross-source evidence and is kept.
#[must_use]
pub fn accept_listings(name: &str, source: &Source, raws: Vec<RawListing>) -> Accepted {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut accepted = Accepted {
        listings: Vec::with_capacity(raws.len()),
        rejected: 0,
        duplicates: 0,
    };

    for raw in raws {
        match Listing::from_raw(raw, source) {
            Ok(listing) => {
                if seen_urls.insert(listing.product_url.clone()) {
                    accepted.listings.push(listing);
                } else {
                    accepted.duplicates += 1;
                }
            }
            Err(e) => {
                tracing::debug!(collector = name, error = %e, "discarding invalid listing");
                accepted.rejected += 1;
            }
        }
    }

    accepted
}
