//! On-disk copies of each run's intermediate and final output.

use std::path::{Path, PathBuf};

use serde::Serialize;
use trendscout_core::Listing;

use crate::error::TrendError;

pub const RAW_LISTINGS_FILE: &str = "raw_listings.json";
pub const TRENDING_LISTINGS_FILE: &str = "trending_listings.json";

/// Writes pretty-printed JSON artifacts into one directory, overwriting the
/// previous run's files.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// # Errors
    ///
    /// Returns [`TrendError`] if the directory cannot be created or the file
    /// cannot be written.
    pub async fn write_raw(&self, listings: &[Listing]) -> Result<PathBuf, TrendError> {
        self.write_json(RAW_LISTINGS_FILE, listings).await
    }

    /// # Errors
    ///
    /// Returns [`TrendError`] if the directory cannot be created or the file
    /// cannot be written.
    pub async fn write_trending(&self, listings: &[Listing]) -> Result<PathBuf, TrendError> {
        self.write_json(TRENDING_LISTINGS_FILE, listings).await
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, TrendError> {
        let body = serde_json::to_vec_pretty(value).map_err(|e| TrendError::Serialize {
            context: file_name.to_string(),
            source: e,
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| TrendError::ArtifactIo {
                path: self.dir.display().to_string(),
                source: e,
            })?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| TrendError::ArtifactIo {
                path: path.display().to_string(),
                source: e,
            })?;

        tracing::debug!(path = %path.display(), "wrote artifact");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendscout_core::Source;

    fn listing() -> Listing {
        Listing {
            title: "Ice Roller".to_string(),
            price: Some("$12.99".to_string()),
            image_url: "https://img.example.com/roller.jpg".to_string(),
            product_url: "https://shop.example.com/roller".to_string(),
            source: Source::Instagram,
            sold_count: None,
            rating: None,
            trend_score: Some(3),
        }
    }

    #[tokio::test]
    async fn writes_pretty_json_and_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().join("nested/artifacts"));

        let path = store.write_trending(&[listing()]).await.unwrap();
        assert_eq!(path.file_name().unwrap(), TRENDING_LISTINGS_FILE);

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains('\n'), "expected pretty-printed output");
        let parsed: Vec<Listing> = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, vec![listing()]);
        assert!(body.contains("\"trendScore\": 3"));
    }

    #[tokio::test]
    async fn overwrites_previous_run() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());

        store.write_raw(&[listing(), listing()]).await.unwrap();
        let path = store.write_raw(&[]).await.unwrap();

        let parsed: Vec<Listing> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert!(parsed.is_empty());
    }

    #[tokio::test]
    async fn directory_blocked_by_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("artifacts");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let store = ArtifactStore::new(&blocker);
        assert!(matches!(
            store.write_raw(&[listing()]).await,
            Err(TrendError::ArtifactIo { .. })
        ));
    }
}
