mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "trendscout-cli")]
#[command(about = "Trending product aggregation from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect from every configured source, score, and print the ranking.
    Run {
        /// Write the snapshot JSON here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Score a JSON array of raw listings without collecting.
    Score {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the keyword set of each title.
    Keywords {
        #[arg(required = true)]
        titles: Vec<String>,
    },
    /// Show whether two titles would be treated as the same product.
    Similar { a: String, b: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let level = std::env::var("TRENDSCOUT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { out } => {
            let config = trendscout_core::load_app_config()?;
            commands::run_pipeline(&config, out.as_deref()).await
        }
        Commands::Score { input, out } => {
            let threshold = trendscout_core::load_app_config()?.indexed_scoring_threshold;
            commands::score_file(&input, out.as_deref(), threshold).await
        }
        Commands::Keywords { titles } => {
            print!("{}", commands::render_keywords(&titles));
            Ok(())
        }
        Commands::Similar { a, b } => {
            print!("{}", commands::render_similarity(&a, &b));
            Ok(())
        }
    }
}
