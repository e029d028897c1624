//! Trend detection over scraped listings: title keywords, the similarity
//! relation, trend scoring, and the coordinator that publishes snapshots.

pub mod artifacts;
pub mod coordinator;
pub mod error;
pub mod keywords;
pub mod pipeline;
pub mod scorer;
pub mod similarity;

pub use artifacts::ArtifactStore;
pub use coordinator::{CoordinatorStatus, RunOutcome, SnapshotCoordinator, SnapshotView};
pub use error::TrendError;
pub use keywords::{normalize, KeywordSet};
pub use pipeline::Pipeline;
pub use scorer::{rank, score, score_auto, score_indexed};
pub use similarity::{are_similar, compare, Comparison};
