//! TOML configuration parsing and validation.
//!
//! ```toml
//! [store]
//! path = "./data/lostfound.json"
//!
//! [matching]
//! min_location = 20.0
//! min_description = 20.0
//! min_name = 20.0
//! invalid_dates = "reject"   # or "accept"
//!
//! [server]
//! bind = "127.0.0.1:7341"
//! ```
//!
//! Every section except `[store]` may be omitted.

use anyhow::{Context, Result};
use lostfound_core::matcher::{DatePolicy, MatchParams, DEFAULT_MIN_SIMILARITY};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// JSON file holding reports and notifications.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    #[serde(default = "default_min_similarity")]
    pub min_location: f64,
    #[serde(default = "default_min_similarity")]
    pub min_description: f64,
    #[serde(default = "default_min_similarity")]
    pub min_name: f64,
    #[serde(default)]
    pub invalid_dates: DatePolicy,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_location: DEFAULT_MIN_SIMILARITY,
            min_description: DEFAULT_MIN_SIMILARITY,
            min_name: DEFAULT_MIN_SIMILARITY,
            invalid_dates: DatePolicy::Reject,
        }
    }
}

impl MatchingConfig {
    pub fn params(&self) -> MatchParams {
        MatchParams {
            min_location: self.min_location,
            min_description: self.min_description,
            min_name: self.min_name,
            invalid_dates: self.invalid_dates,
        }
    }
}

fn default_min_similarity() -> f64 {
    DEFAULT_MIN_SIMILARITY
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.store.path.as_os_str().is_empty() {
        anyhow::bail!("store.path must not be empty");
    }

    let thresholds = [
        ("matching.min_location", config.matching.min_location),
        ("matching.min_description", config.matching.min_description),
        ("matching.min_name", config.matching.min_name),
    ];
    for (name, value) in thresholds {
        if !(0.0..=100.0).contains(&value) {
            anyhow::bail!("{} must be in [0.0, 100.0], got {}", name, value);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = parse_config("[store]\npath = \"data/lf.json\"\n").unwrap();
        assert_eq!(cfg.matching.min_location, 20.0);
        assert_eq!(cfg.matching.min_description, 20.0);
        assert_eq!(cfg.matching.min_name, 20.0);
        assert_eq!(cfg.matching.invalid_dates, DatePolicy::Reject);
        assert_eq!(cfg.server.bind, "127.0.0.1:7341");
    }

    #[test]
    fn test_overrides() {
        let cfg = parse_config(
            r#"
[store]
path = "x.json"

[matching]
min_name = 50
invalid_dates = "accept"

[server]
bind = "0.0.0.0:9000"
"#,
        )
        .unwrap();
        let params = cfg.matching.params();
        assert_eq!(params.min_name, 50.0);
        assert_eq!(params.min_location, 20.0);
        assert_eq!(params.invalid_dates, DatePolicy::Accept);
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_missing_store_is_error() {
        assert!(parse_config("[matching]\nmin_name = 10\n").is_err());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = parse_config("[store]\npath = \"x.json\"\n[matching]\nmin_location = 120\n")
            .unwrap_err();
        assert!(err.to_string().contains("matching.min_location"));
    }

    #[test]
    fn test_unknown_date_policy() {
        assert!(parse_config("[store]\npath = \"x.json\"\n[matching]\ninvalid_dates = \"maybe\"\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
