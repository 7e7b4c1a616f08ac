use crate::model::Asset;
use std::fs;
use std::path::PathBuf;

/// File-backed soft cache for asset lists: read on startup before hitting
/// the network, overwritten whenever fresh data arrives. Not a correctness
/// resource; a missing, stale, or corrupt file only degrades offline
/// resilience, so every failure path collapses to a log line.
#[derive(Debug, Clone)]
pub struct AssetSoftCache {
    path: PathBuf,
}

impl AssetSoftCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Option<Vec<Asset>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!("asset soft cache not readable at {:?}: {}", self.path, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(assets) => Some(assets),
            Err(e) => {
                log::warn!("asset soft cache at {:?} is corrupt, ignoring: {}", self.path, e);
                None
            }
        }
    }

    pub fn store(&self, assets: &[Asset]) {
        let raw = match serde_json::to_string(assets) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("failed to serialize asset soft cache: {}", e);
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, raw) {
            log::warn!("failed to write asset soft cache at {:?}: {}", self.path, e);
        }
    }
}
