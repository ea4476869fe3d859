use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::Seat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Configuration for a single match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub session_id: String,
    pub starting_coins: u32,
    /// Turn boundaries a revealed card stays face up.
    pub reveal_turns: u8,
    /// Seat whose claims are proven through the oracle.
    pub local_seat: Seat,
    pub first_turn: Seat,
    /// Seed for the deal, salt and court draws. Entropy when unset.
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            session_id: "demo-session".to_string(),
            starting_coins: 2,
            reveal_turns: 3,
            local_seat: Seat::P1,
            first_turn: Seat::P1,
            seed: None,
        }
    }
}

impl MatchConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reveal_turns == 0 {
            return Err(ConfigError::Invalid("reveal_turns must be at least 1"));
        }
        Ok(())
    }
}
