use crate::error::CardError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tracked identity (a public Discord user id)
    pub user_id: String,

    /// Which transport feeds the widget
    #[serde(default)]
    pub transport: TransportKind,

    /// Pull transport settings
    #[serde(default)]
    pub poll: PollConfig,

    /// Push transport settings
    #[serde(default)]
    pub socket: SocketConfig,

    /// Optional last-seen persistence
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Fixed-interval REST polling
    Poll,

    /// Persistent socket subscription
    #[default]
    Socket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// REST base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Poll period
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,

    /// Per-request timeout
    #[serde(default = "default_poll_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketConfig {
    /// Socket URL
    #[serde(default = "default_socket_url")]
    pub url: String,

    /// First reconnect delay
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Reconnect delay cap
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Remember last-seen across restarts (best effort)
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Cache file location; defaults to ~/.presence-card/last_seen.json
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://api.lanyard.rest".to_string()
}

fn default_poll_interval_ms() -> u64 {
    4000
}

fn default_poll_timeout_ms() -> u64 {
    8000
}

fn default_socket_url() -> String {
    "wss://api.lanyard.rest/socket".to_string()
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    30000
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            interval_ms: default_poll_interval_ms(),
            timeout_ms: default_poll_timeout_ms(),
        }
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            url: default_socket_url(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            path: None,
        }
    }
}

impl Config {
    /// Minimal config for a given identity, all defaults otherwise.
    pub fn with_user(user_id: String) -> Self {
        Config {
            user_id,
            transport: TransportKind::default(),
            poll: PollConfig::default(),
            socket: SocketConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    pub fn load(path: &Option<String>) -> Result<Self, CardError> {
        let config_path = if let Some(p) = path {
            PathBuf::from(p)
        } else {
            let default_paths = vec![
                dirs::home_dir().map(|h| h.join(".presence-card/config.yaml")),
                dirs::config_dir().map(|c| c.join("presence-card.yaml")),
                Some(PathBuf::from("./presence-card.yaml")),
            ];

            default_paths
                .into_iter()
                .flatten()
                .find(|p| p.exists())
                .ok_or_else(|| {
                    CardError::ConfigNotFound(
                        "no config file found; pass --user-id or create ~/.presence-card/config.yaml"
                            .to_string(),
                    )
                })?
        };

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| CardError::ConfigParseError(format!("read failed: {}", e)))?;

        let config: Config = serde_yml::from_str(&content)
            .map_err(|e| CardError::ConfigParseError(format!("parse failed: {}", e)))?;

        Ok(config)
    }

    pub fn save(&self, path: &PathBuf) -> Result<(), CardError> {
        let content = serde_yml::to_string(self)
            .map_err(|e| CardError::ConfigParseError(format!("serialize failed: {}", e)))?;

        std::fs::write(path, content).map_err(CardError::IoError)?;

        Ok(())
    }

    /// Generate a sample configuration
    pub fn sample() -> Self {
        Config::with_user("1319292111325106296".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = Config::sample();
        assert_eq!(config.transport, TransportKind::Socket);
        assert_eq!(config.poll.interval_ms, 4000);
        assert_eq!(config.poll.timeout_ms, 8000);
        assert_eq!(config.socket.initial_backoff_ms, 1000);
        assert_eq!(config.socket.max_backoff_ms, 30000);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_sparse_yaml_fills_defaults() {
        let config: Config =
            serde_yml::from_str("user_id: \"42\"\ntransport: poll\n").unwrap();
        assert_eq!(config.user_id, "42");
        assert_eq!(config.transport, TransportKind::Poll);
        assert_eq!(config.poll.base_url, "https://api.lanyard.rest");
        assert_eq!(config.socket.url, "wss://api.lanyard.rest/socket");
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::sample();
        let yaml = serde_yml::to_string(&config).unwrap();
        let back: Config = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(back.user_id, config.user_id);
        assert_eq!(back.transport, config.transport);
    }
}
