//! Command handlers for the CLI.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use trendscout_core::{AppConfig, Listing, Snapshot, Source};
use trendscout_scraper::{accept_listings, build_collectors, feed::parse_feed, HttpSettings};
use trendscout_trends::{compare, normalize, rank, score_auto, ArtifactStore, KeywordSet, Pipeline};

/// Collect from the configured sources once and emit the ranked snapshot.
///
/// # Errors
///
/// Returns an error if the sources file is invalid, a collector cannot be
/// built, an artifact cannot be written, or the output cannot be written.
pub(crate) async fn run_pipeline(config: &AppConfig, out: Option<&Path>) -> anyhow::Result<()> {
    let sources = trendscout_core::load_sources(&config.sources_path)
        .with_context(|| format!("loading sources from {}", config.sources_path.display()))?;
    let collectors = build_collectors(&sources.sources, &HttpSettings::from_app_config(config))?;

    let pipeline = Pipeline::new(collectors)
        .with_artifacts(config.artifact_dir.clone().map(ArtifactStore::new))
        .with_indexed_threshold(config.indexed_scoring_threshold);

    let listings = pipeline.run().await?;
    let snapshot = Snapshot::new(1, listings);
    eprintln!("scored {} listings", snapshot.len());

    write_json(&snapshot, out).await
}

/// Score a JSON array of raw listings offline.
///
/// The file is treated like one feed source: malformed items and listings
/// missing a title, image URL or product URL are skipped, and repeated
/// product URLs collapse to the first occurrence.
///
/// # Errors
///
/// Returns an error if the input cannot be read or is not a JSON array, or if
/// the output cannot be written.
pub(crate) async fn score_file(
    input: &Path,
    out: Option<&Path>,
    indexed_threshold: usize,
) -> anyhow::Result<()> {
    let body = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let listings = listings_from_feed(&input.display().to_string(), &body)?;
    let ranked = rank(score_auto(listings, indexed_threshold));

    write_json(&ranked, out).await
}

pub(crate) fn listings_from_feed(name: &str, body: &str) -> anyhow::Result<Vec<Listing>> {
    let fallback = Source::Other("file".to_string());
    let accepted = accept_listings(name, &fallback, parse_feed(name, body)?);

    if accepted.rejected > 0 || accepted.duplicates > 0 {
        eprintln!(
            "skipped {} invalid and {} duplicate listings",
            accepted.rejected, accepted.duplicates
        );
    }
    Ok(accepted.listings)
}

async fn write_json<T: Serialize + ?Sized>(value: &T, out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn join_keywords(set: &KeywordSet) -> String {
    if set.is_empty() {
        "(none)".to_string()
    } else {
        set.iter().collect::<Vec<_>>().join(", ")
    }
}

pub(crate) fn render_keywords(titles: &[String]) -> String {
    let mut out = String::new();
    for title in titles {
        let _ = writeln!(out, "{title}\n  keywords: {}", join_keywords(&normalize(title)));
    }
    out
}

pub(crate) fn render_similarity(a: &str, b: &str) -> String {
    let (ka, kb) = (normalize(a), normalize(b));
    let cmp = compare(&ka, &kb);

    let mut out = String::new();
    let _ = writeln!(out, "a: {}", join_keywords(&ka));
    let _ = writeln!(out, "b: {}", join_keywords(&kb));
    let shared = if cmp.shared.is_empty() {
        "(none)".to_string()
    } else {
        cmp.shared.join(", ")
    };
    let _ = writeln!(out, "shared: {shared} ({} of {} required)", cmp.shared.len(), cmp.required);
    let _ = writeln!(
        out,
        "verdict: {}",
        if cmp.similar { "similar" } else { "not similar" }
    );
    out
}
