use std::{
    fmt::{self, Display},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::{destination::Destination, region::RegionDestination};

/// Identifier of a message as assigned by its producer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh, lexicographically sortable id
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("ID:{}", Ulid::new()))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::generate()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a broker a message has been relayed through
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokerId(pub String);

impl Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An outbound message as seen on the producer's send path.
///
/// The message is owned by the broker; the policy only reads it and, at most,
/// writes [`Message::expiration`].
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub message_id: MessageId,
    /// Creation time in epoch milliseconds; `<= 0` when timestamping is disabled
    pub timestamp: i64,
    /// Absolute expiry in epoch milliseconds; `<= 0` when unset
    pub expiration: i64,
    pub destination: Option<Destination>,
    /// Brokers this message has crossed; empty for locally produced messages
    pub broker_path: Vec<BrokerId>,
    /// Where the message was originally sent, if it has since been redirected
    pub original_destination: Option<Destination>,
    pub region_destination: Option<Arc<dyn RegionDestination>>,
}

impl Message {
    /// A locally produced message, timestamped at `timestamp` with no expiration
    #[must_use]
    pub fn new(destination: Destination, timestamp: i64) -> Self {
        Self {
            timestamp,
            destination: Some(destination),
            ..Self::default()
        }
    }

    /// A message carrying only what a dead-letter strategy needs to place it.
    ///
    /// It has an empty id, so building one on the send path costs no id
    /// generation.
    #[must_use]
    pub fn for_dead_letter(original: Destination, region: Arc<dyn RegionDestination>) -> Self {
        Self {
            message_id: MessageId(String::new()),
            timestamp: 0,
            expiration: 0,
            destination: Some(original),
            broker_path: Vec::new(),
            original_destination: None,
            region_destination: Some(region),
        }
    }

    #[must_use]
    pub const fn is_timestamped(&self) -> bool {
        self.timestamp > 0
    }

    #[must_use]
    pub const fn has_expiration(&self) -> bool {
        self.expiration > 0
    }

    /// Whether the message arrived over a broker-to-broker link
    #[must_use]
    pub fn is_networked(&self) -> bool {
        !self.broker_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_is_local_and_unexpiring() {
        let message = Message::new(Destination::queue("a.b"), 1_000);

        assert!(message.is_timestamped());
        assert!(!message.has_expiration());
        assert!(!message.is_networked());
        assert_eq!(message.destination, Some(Destination::queue("a.b")));
    }

    #[test]
    fn test_default_message_is_not_timestamped() {
        let message = Message::default();
        assert!(!message.is_timestamped());
        assert!(message.destination.is_none());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = MessageId::generate();
        let b = MessageId::generate();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("ID:"));
    }

    #[test]
    fn test_dead_letter_message_carries_no_generated_id() {
        #[derive(Debug)]
        struct Region(Destination);

        impl RegionDestination for Region {
            fn destination(&self) -> &Destination {
                &self.0
            }

            fn dead_letter_strategy(&self) -> Option<&dyn crate::DeadLetterStrategy> {
                None
            }
        }

        let region: Arc<dyn RegionDestination> = Arc::new(Region(Destination::queue("a")));
        let first = Message::for_dead_letter(Destination::queue("a"), Arc::clone(&region));
        let second = Message::for_dead_letter(Destination::queue("a"), region);

        assert_eq!(first.message_id, second.message_id);
        assert_eq!(first.message_id.to_string(), "");
        assert_eq!(first.destination, Some(Destination::queue("a")));
        assert!(first.region_destination.is_some());
        assert!(!first.is_timestamped());
        assert!(first.original_destination.is_none());
    }

    #[test]
    fn test_networked_message() {
        let mut message = Message::new(Destination::queue("a"), 1);
        message.broker_path.push(BrokerId("broker-b".to_string()));
        assert!(message.is_networked());
    }
}
