use analytics::{ConfidenceLevel, Predicate};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub general: General,
    pub server: Server,
    #[serde(default)]
    pub analytics: Analytics,
    #[serde(default)]
    pub saved_filters: Vec<SavedFilterSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct General {
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Analytics {
    /// 0.90, 0.95 or 0.99.
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,
}

/// Saved filter loaded into the in-memory registry at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedFilterSeed {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub filters: Vec<Predicate>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.server.port > 0, "server.port must be > 0");
        anyhow::ensure!(
            self.server.max_body_bytes > 0,
            "server.max_body_bytes must be > 0"
        );
        for (i, seed) in self.saved_filters.iter().enumerate() {
            anyhow::ensure!(
                !seed.id.trim().is_empty(),
                "saved_filters[{i}].id must not be empty"
            );
            let dupes = self
                .saved_filters
                .iter()
                .filter(|other| other.id == seed.id)
                .count();
            anyhow::ensure!(dupes == 1, "duplicate saved filter id: {}", seed.id);
        }
        Ok(())
    }

    pub fn default_config_path() -> String {
        if let Ok(path) = std::env::var("BETSTATS_CONFIG") {
            return path;
        }

        let candidate = Path::new("config/default.toml");
        if candidate.exists() {
            return candidate.to_string_lossy().to_string();
        }

        // Running from a crate directory during development.
        let candidate = Path::new("../../config/default.toml");
        if candidate.exists() {
            return candidate.to_string_lossy().to_string();
        }

        "config/default.toml".to_string()
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_toml_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> &'static str {
        r#"
[general]
log_level = "info"

[server]
host = "127.0.0.1"
port = 8090

[analytics]
confidence_level = 0.99

[[saved_filters]]
id = "nfl-favourites"
name = "NFL favourites"
filters = [
  { kind = "sport", sport = "football" },
  { kind = "oddsRange", min = -200.0, max = 0.0 },
]

[[saved_filters]]
id = "fall-2024"
name = "Fall 2024"
description = "Sept through Nov"
filters = [
  { kind = "dateRange", start = "2024-09-01", end = "2024-11-30T23:59:59Z" },
]
"#
    }

    #[test]
    fn test_load_default_config() {
        let config = Config::from_toml_str(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config.general.log_level, "info");
        assert!(config.server.port > 0);
        assert_eq!(config.analytics.confidence_level, ConfidenceLevel::P95);
    }

    #[test]
    fn test_parse_sample_config() {
        let config: Config = sample_config().parse().unwrap();
        assert_eq!(config.server.port, 8090);
        assert!(config.server.api_key.is_none());
        assert_eq!(config.server.max_body_bytes, 4 * 1024 * 1024);
        assert_eq!(config.analytics.confidence_level, ConfidenceLevel::P99);
        assert_eq!(config.saved_filters.len(), 2);
        assert_eq!(config.saved_filters[0].filters.len(), 2);
        assert!(matches!(
            config.saved_filters[1].filters[0],
            Predicate::DateRange { .. }
        ));
    }

    #[test]
    fn test_analytics_section_optional() {
        let toml = r#"
[general]
log_level = "debug"

[server]
host = "0.0.0.0"
port = 8090
"#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.analytics.confidence_level, ConfidenceLevel::P95);
        assert!(config.saved_filters.is_empty());
    }

    #[test]
    fn test_rejects_unsupported_confidence_level() {
        let content = sample_config().replace("confidence_level = 0.99", "confidence_level = 0.8");
        assert!(Config::from_toml_str(&content).is_err());
    }

    #[test]
    fn test_rejects_duplicate_seed_ids() {
        let content = sample_config().replace("id = \"fall-2024\"", "id = \"nfl-favourites\"");
        let err = Config::from_toml_str(&content).unwrap_err();
        assert!(err.to_string().contains("duplicate saved filter id"));
    }

    #[test]
    fn test_rejects_unknown_filter_kind() {
        let content = sample_config().replace("kind = \"sport\"", "kind = \"weather\"");
        assert!(Config::from_toml_str(&content).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("does/not/exist.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("betstats.toml");
        std::fs::write(&path, sample_config()).unwrap();
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.saved_filters[1].description.as_deref(), Some("Sept through Nov"));
    }
}
