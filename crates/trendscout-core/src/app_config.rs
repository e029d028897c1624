use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings shared by the server and the CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// YAML file listing the collectors to run.
    pub sources_path: PathBuf,
    /// Directory for raw batch / snapshot JSON artifacts. `None` disables
    /// persistence entirely.
    pub artifact_dir: Option<PathBuf>,
    /// Six-field cron expression (seconds first) for scheduled runs.
    pub run_schedule: String,
    pub run_on_start: bool,
    /// Batches larger than this use the inverted-index scorer.
    pub indexed_scoring_threshold: usize,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_inter_request_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
}
