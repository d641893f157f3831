use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "fruit-dashboard.json";

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "FRUIT_DASHBOARD_CONFIG";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub nutrition_path: PathBuf,
    pub assets_dir: PathBuf,
    /// Fixed seed for the seasonal trend simulation; random when unset
    pub trend_seed: Option<u64>,
    pub server_addr: String,
    pub display_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from("database/fruit.sqlite3"),
            nutrition_path: PathBuf::from("static/data.json"),
            assets_dir: PathBuf::from("assets/images"),
            trend_seed: None,
            server_addr: "0.0.0.0:3000".to_string(),
            display_limit: 6,
        }
    }
}

/// Read config from `path`. A missing file means defaults.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(AppConfig::default());
        }
        Err(e) => return Err(e.into()),
    };

    let config: AppConfig = serde_json::from_str(&content)?;
    info!(path = %path.display(), db = %config.db_path.display(), "loaded config");
    Ok(config)
}

/// Config path from the environment, or the default file name
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config(Path::new("/nonexistent/fruit-dashboard.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.display_limit, 6);
        assert!(config.trend_seed.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let path = std::env::temp_dir().join("fruit_dashboard_config_test.json");
        fs::write(&path, r#"{ "db_path": "/tmp/fruit.db", "trend_seed": 42 }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/fruit.db"));
        assert_eq!(config.trend_seed, Some(42));
        assert_eq!(config.assets_dir, PathBuf::from("assets/images"));
        assert_eq!(config.server_addr, "0.0.0.0:3000");

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let path = std::env::temp_dir().join("fruit_dashboard_config_bad.json");
        fs::write(&path, "db_path = 1").unwrap();

        assert!(load_config(&path).is_err());

        fs::remove_file(&path).ok();
    }
}
