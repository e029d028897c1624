use thiserror::Error;

/// Run-level pipeline failures. Per-source and per-listing problems never
/// surface here; they are absorbed during collection.
#[derive(Debug, Error)]
pub enum TrendError {
    #[error("failed to write artifact {path}: {source}")]
    ArtifactIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
