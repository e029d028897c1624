use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::listings::Source;
use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Storefront exposing the public `products.json` endpoint.
    Shopify,
    /// JSON array of raw listings at an HTTP(S) URL or a local path.
    JsonFeed,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Shopify => write!(f, "shopify"),
            SourceKind::JsonFeed => write!(f, "json_feed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub kind: SourceKind,
    pub url: String,
    /// Tag stamped on listings that don't carry their own.
    pub source: Option<Source>,
    /// Page size for paginated sources.
    pub limit: Option<u32>,
}

impl SourceConfig {
    /// Source tag for this collector, defaulting by kind.
    #[must_use]
    pub fn source_tag(&self) -> Source {
        self.source.clone().unwrap_or_else(|| match self.kind {
            SourceKind::Shopify => Source::Shopify,
            SourceKind::JsonFeed => Source::Other(self.name.clone()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

/// Load and validate the collector configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sources(&content)
}

fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    let file: SourcesFile = serde_yaml::from_str(content)?;
    validate_sources(&file)?;
    Ok(file)
}

fn validate_sources(file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for source in &file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if source.url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' has an empty url",
                source.name
            )));
        }

        if source.limit == Some(0) {
            return Err(ConfigError::Validation(format!(
                "source '{}' has limit 0; omit it or use a positive page size",
                source.name
            )));
        }

        if !seen.insert(source.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r"
sources:
  - name: cozy-home
    kind: shopify
    url: https://cozyhome.example.com
    limit: 100
  - name: marketplace-bestsellers
    kind: json_feed
    url: ./data/bestsellers.json
    source: amazon
";

    #[test]
    fn parses_valid_file() {
        let file = parse_sources(VALID).expect("valid sources file");
        assert_eq!(file.sources.len(), 2);
        assert_eq!(file.sources[0].kind, SourceKind::Shopify);
        assert_eq!(file.sources[0].limit, Some(100));
        assert_eq!(file.sources[1].kind, SourceKind::JsonFeed);
        assert_eq!(file.sources[1].source, Some(Source::Amazon));
    }

    #[test]
    fn source_tag_defaults_by_kind() {
        let file = parse_sources(VALID).unwrap();
        assert_eq!(file.sources[0].source_tag(), Source::Shopify);
        assert_eq!(file.sources[1].source_tag(), Source::Amazon);

        let feed = SourceConfig {
            name: "scraper-bridge".to_string(),
            kind: SourceKind::JsonFeed,
            url: "http://localhost:9000/listings".to_string(),
            source: None,
            limit: None,
        };
        let expected = Source::Other("scraper-bridge".to_string());
        assert_eq!(feed.source_tag(), expected);
    }

    #[test]
    fn rejects_duplicate_names_case_insensitively() {
        let yaml = r"
sources:
  - name: Feed
    kind: json_feed
    url: a.json
  - name: feed
    kind: json_feed
    url: b.json
";
        let err = parse_sources(yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")),
            "got: {err:?}"
        );
    }

    #[test]
    fn rejects_empty_url() {
        let yaml = r"
sources:
  - name: broken
    kind: shopify
    url: ''
";
        assert!(matches!(
            parse_sources(yaml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_zero_limit() {
        let yaml = r"
sources:
  - name: zero
    kind: shopify
    url: https://zero.example.com
    limit: 0
";
        assert!(matches!(
            parse_sources(yaml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_unknown_kind() {
        let yaml = r"
sources:
  - name: mystery
    kind: carrier_pigeon
    url: https://example.com
";
        assert!(matches!(
            parse_sources(yaml),
            Err(ConfigError::SourcesFileParse(_))
        ));
    }

    #[test]
    fn load_sources_reports_missing_file() {
        let err = load_sources(Path::new("/definitely/not/here/sources.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::SourcesFileIo { .. }));
    }
}
