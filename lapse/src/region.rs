//! Static region: resolved destinations and their dead-letter strategies.
//!
//! Dead-letter placement belongs to the broker. These stand-ins give the
//! in-memory host the same two placements brokers commonly offer, so the
//! dead-letter guard can be exercised end to end:
//!
//! - [`SharedDeadLetterStrategy`]: every destination shares one queue
//! - [`IndividualDeadLetterStrategy`]: one dead-letter destination per
//!   destination, named by prefixing the original name
//!
//! ```ron
//! regions: [
//!     (destination: "queue://zocalo.transient.work"),
//!     (
//!         destination: "topic://zocalo.transient.events",
//!         dead_letter: Individual((topic_prefix: "DLQ.Topic.")),
//!     ),
//!     (destination: "queue://scratch", dead_letter: Disabled),
//! ]
//! ```

use std::{collections::HashMap, sync::Arc};

use lapse_common::{
    DeadLetterStrategy, Destination, DestinationKind, Message, RegionDestination, Subscription,
};
use serde::{Deserialize, Serialize};

use crate::error::LapseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedDeadLetterStrategy {
    queue: Destination,
}

impl SharedDeadLetterStrategy {
    #[must_use]
    pub fn new(queue: impl Into<String>) -> Self {
        Self {
            queue: Destination::queue(queue),
        }
    }
}

impl DeadLetterStrategy for SharedDeadLetterStrategy {
    fn dead_letter_queue_for(
        &self,
        _message: &Message,
        _subscription: Option<&Subscription>,
    ) -> Option<Destination> {
        Some(self.queue.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualDeadLetterStrategy {
    #[serde(default = "defaults::queue_prefix")]
    pub queue_prefix: String,

    #[serde(default = "defaults::topic_prefix")]
    pub topic_prefix: String,

    /// Dead-letter queue messages into a queue rather than a topic
    #[serde(default = "defaults::enabled")]
    pub use_queue_for_queue_messages: bool,

    /// Dead-letter topic messages into a queue rather than a topic
    #[serde(default = "defaults::enabled")]
    pub use_queue_for_topic_messages: bool,
}

impl Default for IndividualDeadLetterStrategy {
    fn default() -> Self {
        Self {
            queue_prefix: defaults::queue_prefix(),
            topic_prefix: defaults::topic_prefix(),
            use_queue_for_queue_messages: defaults::enabled(),
            use_queue_for_topic_messages: defaults::enabled(),
        }
    }
}

impl DeadLetterStrategy for IndividualDeadLetterStrategy {
    fn dead_letter_queue_for(
        &self,
        message: &Message,
        _subscription: Option<&Subscription>,
    ) -> Option<Destination> {
        let destination = message.destination.as_ref()?;

        let (prefix, use_queue) = if destination.kind().is_queue() {
            (&self.queue_prefix, self.use_queue_for_queue_messages)
        } else {
            (&self.topic_prefix, self.use_queue_for_topic_messages)
        };

        let kind = if use_queue {
            DestinationKind::Queue
        } else {
            DestinationKind::Topic
        };

        Some(Destination::new(kind, format!("{prefix}{}", destination.name())))
    }
}

/// Which dead-letter strategy a region destination exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadLetterConfig {
    Shared {
        #[serde(default = "defaults::shared_queue")]
        queue: String,
    },
    Individual(IndividualDeadLetterStrategy),
    /// No strategy; messages here are never considered dead-letter bound
    Disabled,
}

impl Default for DeadLetterConfig {
    fn default() -> Self {
        Self::Shared {
            queue: defaults::shared_queue(),
        }
    }
}

impl DeadLetterConfig {
    fn into_strategy(self) -> Option<Box<dyn DeadLetterStrategy>> {
        match self {
            Self::Shared { queue } => Some(Box::new(SharedDeadLetterStrategy::new(queue))),
            Self::Individual(strategy) => Some(Box::new(strategy)),
            Self::Disabled => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub destination: Destination,

    #[serde(default)]
    pub dead_letter: DeadLetterConfig,
}

#[derive(Debug)]
pub struct StaticRegion {
    destination: Destination,
    strategy: Option<Box<dyn DeadLetterStrategy>>,
}

impl StaticRegion {
    #[must_use]
    pub fn new(destination: Destination, strategy: Option<Box<dyn DeadLetterStrategy>>) -> Self {
        Self {
            destination,
            strategy,
        }
    }
}

impl From<RegionConfig> for StaticRegion {
    fn from(config: RegionConfig) -> Self {
        Self::new(config.destination, config.dead_letter.into_strategy())
    }
}

impl RegionDestination for StaticRegion {
    fn destination(&self) -> &Destination {
        &self.destination
    }

    fn dead_letter_strategy(&self) -> Option<&dyn DeadLetterStrategy> {
        self.strategy.as_deref()
    }
}

/// Region destinations by destination
#[derive(Debug, Clone, Default)]
pub struct Regions {
    regions: HashMap<Destination, Arc<dyn RegionDestination>>,
}

impl Regions {
    /// # Errors
    /// Fails with [`LapseError::DuplicateRegion`] when a destination is
    /// configured twice.
    pub fn from_config(configs: Vec<RegionConfig>) -> Result<Self, LapseError> {
        let mut regions = HashMap::with_capacity(configs.len());

        for config in configs {
            let destination = config.destination.clone();
            if regions.contains_key(&destination) {
                return Err(LapseError::DuplicateRegion(destination));
            }
            let region: Arc<dyn RegionDestination> = Arc::new(StaticRegion::from(config));
            regions.insert(destination, region);
        }

        Ok(Self { regions })
    }

    #[must_use]
    pub fn get(&self, destination: &Destination) -> Option<Arc<dyn RegionDestination>> {
        self.regions.get(destination).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.regions.len()
    }
}

mod defaults {
    pub fn shared_queue() -> String {
        "ActiveMQ.DLQ".to_string()
    }

    pub fn queue_prefix() -> String {
        "ActiveMQ.DLQ.Queue.".to_string()
    }

    pub fn topic_prefix() -> String {
        "ActiveMQ.DLQ.Topic.".to_string()
    }

    pub const fn enabled() -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn placing(destination: Destination) -> Message {
        Message {
            destination: Some(destination),
            ..Message::default()
        }
    }

    #[test]
    fn test_shared_strategy_ignores_destination() {
        let strategy = SharedDeadLetterStrategy::new("ActiveMQ.DLQ");

        assert_eq!(
            strategy.dead_letter_queue_for(&placing(Destination::topic("a")), None),
            Some(Destination::queue("ActiveMQ.DLQ"))
        );
        assert_eq!(
            strategy.dead_letter_queue_for(&Message::default(), None),
            Some(Destination::queue("ActiveMQ.DLQ"))
        );
    }

    #[test]
    fn test_individual_strategy_prefixes_by_kind() {
        let strategy = IndividualDeadLetterStrategy::default();

        assert_eq!(
            strategy.dead_letter_queue_for(&placing(Destination::queue("zocalo.transient.a")), None),
            Some(Destination::queue("ActiveMQ.DLQ.Queue.zocalo.transient.a"))
        );
        assert_eq!(
            strategy.dead_letter_queue_for(&placing(Destination::topic("events")), None),
            Some(Destination::queue("ActiveMQ.DLQ.Topic.events"))
        );
        assert_eq!(strategy.dead_letter_queue_for(&Message::default(), None), None);
    }

    #[test]
    fn test_individual_strategy_can_keep_topics() {
        let strategy = IndividualDeadLetterStrategy {
            use_queue_for_topic_messages: false,
            ..IndividualDeadLetterStrategy::default()
        };

        assert_eq!(
            strategy.dead_letter_queue_for(&placing(Destination::topic("events")), None),
            Some(Destination::topic("ActiveMQ.DLQ.Topic.events"))
        );
    }

    #[test]
    fn test_region_config_from_ron() {
        let configs: Vec<RegionConfig> = ron::from_str(
            r#"[
                (destination: "queue://a"),
                (destination: "queue://b", dead_letter: Shared(queue: "DEAD")),
                (destination: "topic://c", dead_letter: Individual((topic_prefix: "DLQ."))),
                (destination: "queue://d", dead_letter: Disabled),
            ]"#,
        )
        .expect("valid regions");

        assert_eq!(configs[0].dead_letter, DeadLetterConfig::default());
        assert_eq!(
            configs[1].dead_letter,
            DeadLetterConfig::Shared {
                queue: "DEAD".to_string()
            }
        );
        assert_eq!(
            configs[2].dead_letter,
            DeadLetterConfig::Individual(IndividualDeadLetterStrategy {
                topic_prefix: "DLQ.".to_string(),
                ..IndividualDeadLetterStrategy::default()
            })
        );
        assert_eq!(configs[3].dead_letter, DeadLetterConfig::Disabled);
    }

    #[test]
    fn test_regions_lookup() {
        let regions = Regions::from_config(vec![
            RegionConfig {
                destination: Destination::queue("a"),
                dead_letter: DeadLetterConfig::default(),
            },
            RegionConfig {
                destination: Destination::queue("b"),
                dead_letter: DeadLetterConfig::Disabled,
            },
        ])
        .expect("distinct regions");

        assert_eq!(regions.len(), 2);

        let a = regions.get(&Destination::queue("a")).expect("region a");
        assert_eq!(a.destination(), &Destination::queue("a"));
        assert!(a.dead_letter_strategy().is_some());

        let b = regions.get(&Destination::queue("b")).expect("region b");
        assert!(b.dead_letter_strategy().is_none());

        assert!(regions.get(&Destination::topic("a")).is_none());
    }

    #[test]
    fn test_duplicate_region_is_rejected() {
        let config = RegionConfig {
            destination: Destination::queue("a"),
            dead_letter: DeadLetterConfig::default(),
        };

        let result = Regions::from_config(vec![config.clone(), config]);

        assert!(matches!(
            result,
            Err(LapseError::DuplicateRegion(d)) if d == Destination::queue("a")
        ));
    }
}
