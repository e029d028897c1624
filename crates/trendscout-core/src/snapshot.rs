use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listings::Listing;

/// A published, ranked batch of scored listings.
///
/// Built once per successful run and never mutated afterwards; readers hold
/// it behind an `Arc` while the next run builds its replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Per-process run counter, starting at 1.
    pub run_id: u64,
    pub published_at: DateTime<Utc>,
    /// Sorted descending by trend score, ties in collection order.
    pub listings: Vec<Listing>,
}

impl Snapshot {
    #[must_use]
    pub fn new(run_id: u64, listings: Vec<Listing>) -> Self {
        Self {
            run_id,
            published_at: Utc::now(),
            listings,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
