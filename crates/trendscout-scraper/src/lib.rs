pub mod collector;
pub mod error;
pub mod feed;
pub mod pagination;
pub mod registry;
pub mod shopify;

mod retry;

pub use collector::{
    accept_listings, collect_all, Accepted, CollectedBatch, CollectorOutcome, CollectorReport,
    SourceCollector,
};
pub use error::ScraperError;
pub use feed::JsonFeedCollector;
pub use registry::{build_collectors, HttpSettings};
pub use retry::RetryPolicy;
pub use shopify::ShopifyCollector;
