//! Event fanout configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Event fanout and live push configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Prefix of the Redis pub/sub channel for each topic
    #[serde(default = "default_channel_prefix")]
    pub channel_prefix: String,

    /// Messages buffered per room push channel before slow clients lag
    #[serde(default = "default_push_channel_capacity")]
    pub push_channel_capacity: usize,
}

impl EventsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.push_channel_capacity == 0 {
            return Err(ValidationError::InvalidChannelCapacity);
        }
        Ok(())
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_prefix: default_channel_prefix(),
            push_channel_capacity: default_push_channel_capacity(),
        }
    }
}

fn default_channel_prefix() -> String {
    "estimatex:events:".to_string()
}

fn default_push_channel_capacity() -> usize {
    64
}
