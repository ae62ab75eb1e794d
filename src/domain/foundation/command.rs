//! Command infrastructure shared by the use-case handlers.
//!
//! Every handler accepts a `CommandMetadata` so that correlation context
//! flows from the request boundary into emitted events and log lines.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata context for command handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Links the operations and events of a single request.
    correlation_id: String,

    /// Source of this command (e.g., "http", "test").
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    /// Creates metadata with a freshly generated correlation ID.
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            source: None,
        }
    }

    /// Builder: use an externally supplied correlation ID.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = id.into();
        self
    }

    /// Builder: Add source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl Default for CommandMetadata {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_distinct_correlation_ids() {
        assert_ne!(
            CommandMetadata::new().correlation_id(),
            CommandMetadata::new().correlation_id()
        );
    }

    #[test]
    fn builders_override_defaults() {
        let meta = CommandMetadata::new()
            .with_correlation_id("req-42")
            .with_source("http");
        assert_eq!(meta.correlation_id(), "req-42");
        assert_eq!(meta.source(), Some("http"));
    }
}
