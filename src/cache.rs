// Last-Seen Cache
//
// Best-effort persistence of the last-active reference point, so "last
// seen N ago" survives a restart. Purely a convenience: every failure
// here is logged and swallowed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CacheConfig;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    last_active_ms: i64,
}

pub struct LastSeenCache {
    path: PathBuf,
}

impl LastSeenCache {
    /// Returns `None` when caching is disabled or no usable location
    /// exists.
    pub fn new(config: &CacheConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let path = match &config.path {
            Some(p) => p.clone(),
            None => dirs::home_dir()?.join(".presence-card/last_seen.json"),
        };
        Some(Self { path })
    }

    pub fn load(&self) -> Option<i64> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("last-seen cache not loaded: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<CacheFile>(&content) {
            Ok(file) => Some(file.last_active_ms),
            Err(e) => {
                debug!("last-seen cache unreadable: {}", e);
                None
            }
        }
    }

    pub fn store(&self, last_active_ms: i64) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                debug!("last-seen cache dir not created: {}", e);
                return;
            }
        }
        let file = CacheFile { last_active_ms };
        match serde_json::to_string(&file) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    debug!("last-seen cache not written: {}", e);
                }
            }
            Err(e) => debug!("last-seen cache not serialized: {}", e),
        }
    }
}
