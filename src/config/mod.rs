//! Configuration loading.
//!
//! Mirrors the "write defaults on first run, otherwise read and parse"
//! pattern used throughout the pack: if `config.toml` (or the path named by
//! `CONFIG_FILE`) does not exist, a default configuration is written out and
//! returned; otherwise the file is parsed.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Registry capacity is a fixed design constant (spec.md SS3, SS4.D) but is
/// kept configurable for tests that want a smaller arena to exercise
/// eviction without allocating ten sessions.
pub const DEFAULT_REGISTRY_CAPACITY: usize = 10;

/// Sessions whose stored duration is below this are treated as
/// advertisements and are evictable before older long-form sessions
/// (spec.md SS3 invariants).
pub const DEFAULT_MIN_VIDEO_DURATION_SECONDS: f32 = 90.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub web: WebConfig,
    pub device: DeviceConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Fields reported verbatim by `GET /server-info` (spec.md SS4.F, SS6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub model: String,
    pub mac_address: String,
    pub source_version: String,
    pub vv: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub registry_capacity: usize,
    pub min_video_duration_seconds: f32,
    /// Operator's colon-separated preferred-language list, e.g. `"fr:en"`.
    pub lang: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 7100,
            },
            device: DeviceConfig {
                model: "AppleTV3,2".to_string(),
                mac_address: "00:00:00:00:00:00".to_string(),
                source_version: "220.68".to_string(),
                vv: "2".to_string(),
            },
            session: SessionConfig {
                registry_capacity: DEFAULT_REGISTRY_CAPACITY,
                min_video_duration_seconds: DEFAULT_MIN_VIDEO_DURATION_SECONDS,
                lang: "en".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.web.port, config.web.port);
        assert_eq!(parsed.session.registry_capacity, config.session.registry_capacity);
    }
}
