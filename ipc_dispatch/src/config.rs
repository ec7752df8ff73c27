//! Dispatcher configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pointer buffer size reported by the query control command.
pub const DEFAULT_POINTER_BUFFER_SIZE: u32 = 0x500;

/// What to do with request frames whose magic tag is not "SFCI"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagicPolicy {
    /// Decode the frame regardless of its tag
    #[default]
    Ignore,
    /// Fail the call with a malformed-frame error
    Reject,
}

/// Static dispatcher settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Host pointer buffer capacity, in bytes
    pub pointer_buffer_size: u32,
    pub magic_policy: MagicPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pointer_buffer_size: DEFAULT_POINTER_BUFFER_SIZE,
            magic_policy: MagicPolicy::Ignore,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid dispatcher configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl DispatchConfig {
    /// Parses a JSON document; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Sets the magic policy, builder style
    pub fn with_magic_policy(mut self, policy: MagicPolicy) -> Self {
        self.magic_policy = policy;
        self
    }

    /// Sets the reported pointer buffer size, builder style
    pub fn with_pointer_buffer_size(mut self, size: u32) -> Self {
        self.pointer_buffer_size = size;
        self
    }
}
