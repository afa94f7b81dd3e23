//! World configuration
//!
//! Session-level knobs the sim core reads. Loading tolerates missing fields
//! so callers can supply partial JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for config operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Serialization/deserialization failure
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Configuration for a [`crate::sim::World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Maximum number of players a world accepts
    #[serde(default = "default_max_players")]
    pub max_players: u32,
}

fn default_max_players() -> u32 {
    2
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_players: default_max_players(),
        }
    }
}

impl WorldConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
