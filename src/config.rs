use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

/// Where the watched-movies collection is kept between runs
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file under `data_dir`
    #[default]
    File,
    /// A key on a Redis server
    Redis,
    /// Process memory only; nothing survives a restart
    Memory,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// OMDb API key
    pub omdb_api_key: String,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Quiet period before a settled query switches to the results view
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Request timeout for catalog calls
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub storage_backend: StorageBackend,

    /// Directory for the file storage backend
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Redis connection URL for the redis storage backend
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".reelwatch")
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config: Config = envy::from_iter(vars(&[("OMDB_API_KEY", "f5e82cc2")])).unwrap();

        assert_eq!(config.omdb_api_key, "f5e82cc2");
        assert_eq!(config.omdb_api_url, "https://www.omdbapi.com");
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.data_dir, PathBuf::from(".reelwatch"));
    }

    #[test]
    fn test_overrides() {
        let config: Config = envy::from_iter(vars(&[
            ("OMDB_API_KEY", "key"),
            ("DEBOUNCE_MS", "250"),
            ("STORAGE_BACKEND", "redis"),
            ("REDIS_URL", "redis://cache:6379"),
        ]))
        .unwrap();

        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.storage_backend, StorageBackend::Redis);
        assert_eq!(config.redis_url, "redis://cache:6379");
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let result = envy::from_iter::<_, Config>(vars(&[("DEBOUNCE_MS", "250")]));
        assert!(result.is_err());
    }
}
