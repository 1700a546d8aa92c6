use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::{alert::AlertRule, model::Location};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// backend_url = "http://127.0.0.1:5000"
/// search_limit = 5
///
/// [default_location]
/// name = "New York"
/// lat = 40.7128
/// lon = -74.006
///
/// [[alerts]]
/// city = "Houston"
/// threshold = 150.0
/// level = "severe"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the dashboard backend serving `/api/*`.
    pub backend_url: String,
    /// Base URL of the Nominatim instance used for location search.
    pub geocoder_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub search_limit: usize,
    /// Coordinates used for the weather panel when none are given.
    pub default_location: Location,
    pub alerts: Vec<AlertRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("airq/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 10,
            search_limit: 5,
            default_location: Location::default(),
            alerts: AlertRule::defaults(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "airq", "airq-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        parse_base_url(&self.backend_url).context("backend_url")?;
        parse_base_url(&self.geocoder_url).context("geocoder_url")?;

        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be greater than zero"));
        }
        if self.search_limit == 0 {
            return Err(anyhow!("search_limit must be greater than zero"));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parse a base URL, requiring an http(s) scheme.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("'{raw}' is not a valid URL"))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!(
            "Unsupported URL scheme '{other}' in '{raw}'; expected http or https"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertLevel;

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            backend_url = "https://aq.example.org"

            [[alerts]]
            city = "Denver"
            threshold = 120.0
            level = "health"
            "#,
        )
        .expect("partial config must parse");

        assert_eq!(cfg.backend_url, "https://aq.example.org");
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.default_location.name, "New York");
        assert_eq!(cfg.alerts.len(), 1);
        assert_eq!(cfg.alerts[0].level, AlertLevel::Health);
    }

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().expect("default config must validate");
    }

    #[test]
    fn rejects_non_http_backend() {
        let cfg = Config { backend_url: "ftp://example.org".into(), ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported URL scheme"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let cfg = Config { request_timeout_secs: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.search_limit = 8;
        cfg.default_location = Location { name: "Houston".into(), lat: 29.76, lon: -95.37 };
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }
}
