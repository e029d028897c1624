//! One end-to-end recomputation: collect, score, rank, persist.

use std::sync::Arc;
use std::time::Instant;

use trendscout_core::Listing;
use trendscout_scraper::{collect_all, SourceCollector};

use crate::artifacts::ArtifactStore;
use crate::error::TrendError;
use crate::scorer::{rank, score_auto, DEFAULT_INDEXED_THRESHOLD};

pub struct Pipeline {
    collectors: Vec<Arc<dyn SourceCollector>>,
    artifacts: Option<ArtifactStore>,
    indexed_threshold: usize,
}

impl Pipeline {
    #[must_use]
    pub fn new(collectors: Vec<Arc<dyn SourceCollector>>) -> Self {
        Self {
            collectors,
            artifacts: None,
            indexed_threshold: DEFAULT_INDEXED_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_artifacts(mut self, store: Option<ArtifactStore>) -> Self {
        self.artifacts = store;
        self
    }

    #[must_use]
    pub fn with_indexed_threshold(mut self, threshold: usize) -> Self {
        self.indexed_threshold = threshold;
        self
    }

    #[must_use]
    pub fn collector_count(&self) -> usize {
        self.collectors.len()
    }

    /// Run every stage and return the ranked, scored listings.
    ///
    /// Collection itself cannot fail; a dead source contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TrendError`] when an artifact cannot be written.
    pub async fn run(&self) -> Result<Vec<Listing>, TrendError> {
        let started = Instant::now();

        let batch = collect_all(&self.collectors).await;
        tracing::info!(
            listings = batch.listings.len(),
            collectors = self.collectors.len(),
            failed_collectors = batch.failed_collectors(),
            "collection complete"
        );

        if let Some(store) = &self.artifacts {
            store.write_raw(&batch.listings).await?;
        }

        let ranked = rank(score_auto(batch.listings, self.indexed_threshold));

        if let Some(store) = &self.artifacts {
            store.write_trending(&ranked).await?;
        }

        tracing::info!(
            listings = ranked.len(),
            top_score = ranked.first().and_then(|l| l.trend_score).unwrap_or(0),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "pipeline complete"
        );

        Ok(ranked)
    }
}
