//! Push notifier port - the real-time delivery side of the relay.
//!
//! Delivery is best-effort and fire-and-forget: a channel nobody listens
//! on swallows the message without error.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::foundation::DomainError;

/// Pushes a named event with a JSON payload to every listener of a channel.
#[async_trait]
pub trait PushNotifier: Send + Sync {
    /// # Errors
    ///
    /// - `PushError` if the push transport itself is broken
    async fn trigger(&self, channel: &str, event: &str, data: JsonValue)
        -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn PushNotifier) {}
    }
}
