//! The per-message expiration decision.
//!
//! A message is given `now + zero_expiration_override` as its expiration when
//! all of the following hold, checked in this order:
//!
//! 1. it was timestamped (`timestamp > 0`)
//! 2. it has no expiration yet (`expiration <= 0`)
//! 3. it is not already sitting in its dead-letter destination
//! 4. it was produced locally, or network messages are being processed
//! 5. its destination matches one of the configured filters
//!
//! Anything else leaves the message untouched. Missing context (no region, no
//! dead-letter strategy, no destination) means the rule does not apply; it is
//! never an error.

use std::{
    fmt::{self, Display},
    sync::Arc,
};

use lapse_common::{Clock, Destination, Message, internal};

use crate::{config::PolicyConfig, error::PolicyError, filter::DestinationFilter};

/// Why a message was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    TimestampDisabled,
    ExpirationPresent,
    DeadLetterBound,
    NetworkMessage,
    NoDestination,
    UnmatchedDestination,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TimestampDisabled => "timestamp disabled",
            Self::ExpirationPresent => "expiration already set",
            Self::DeadLetterBound => "dead-letter bound",
            Self::NetworkMessage => "arrived over the network",
            Self::NoDestination => "no destination",
            Self::UnmatchedDestination => "destination not matched",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Set the message's expiration to this absolute time
    Stamp { expiration: i64 },
    Skip(SkipReason),
}

impl Decision {
    #[must_use]
    pub const fn is_stamp(&self) -> bool {
        matches!(self, Self::Stamp { .. })
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stamp { expiration } => write!(f, "stamp expiration={expiration}"),
            Self::Skip(reason) => write!(f, "skip ({reason})"),
        }
    }
}

/// Compiled expiration policy.
///
/// Immutable once built; share it freely between threads.
#[derive(Debug, Clone)]
pub struct ExpirationPolicy {
    config: PolicyConfig,
    filters: Vec<DestinationFilter>,
    clock: Arc<dyn Clock>,
}

impl ExpirationPolicy {
    /// Build a policy reading the given clock
    ///
    /// # Errors
    /// Returns [`PolicyError::InvalidPattern`] if a configured destination
    /// pattern cannot be compiled.
    pub fn with_clock(config: PolicyConfig, clock: Arc<dyn Clock>) -> Result<Self, PolicyError> {
        let filters = config
            .destinations
            .iter()
            .map(DestinationFilter::parse)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(ceiling) = config.ttl_ceiling() {
            internal!(
                level = WARN,
                "ttl_ceiling_ms ({ceiling:?}) is accepted but not enforced"
            );
        }

        if config.future_only {
            internal!(level = WARN, "future_only is accepted but not enforced");
        }

        Ok(Self {
            config,
            filters,
            clock,
        })
    }

    #[must_use]
    pub fn filters(&self) -> &[DestinationFilter] {
        &self.filters
    }

    /// Whether the destination falls under any configured filter
    #[must_use]
    pub fn matches(&self, destination: &Destination) -> bool {
        self.filters.iter().any(|filter| filter.matches(destination))
    }

    /// The first guard `message` fails, or `None` if it should be stamped
    #[must_use]
    pub fn skip_reason(&self, message: &Message) -> Option<SkipReason> {
        if !message.is_timestamped() {
            return Some(SkipReason::TimestampDisabled);
        }

        if message.has_expiration() {
            return Some(SkipReason::ExpirationPresent);
        }

        if is_destination_dlq(message) {
            return Some(SkipReason::DeadLetterBound);
        }

        if !self.config.process_network_messages && message.is_networked() {
            return Some(SkipReason::NetworkMessage);
        }

        let Some(destination) = message.destination.as_ref() else {
            return Some(SkipReason::NoDestination);
        };

        (!self.matches(destination)).then_some(SkipReason::UnmatchedDestination)
    }

    /// Decide what to do with `message` at time `now` (epoch milliseconds)
    #[must_use]
    pub fn decide(&self, message: &Message, now: i64) -> Decision {
        if let Some(reason) = self.skip_reason(message) {
            return Decision::Skip(reason);
        }

        let ttl = i64::try_from(self.config.zero_expiration_override_ms).unwrap_or(i64::MAX);

        Decision::Stamp {
            expiration: now.saturating_add(ttl),
        }
    }

    /// Decide against the policy's clock and write the expiration if stamping
    #[tracing::instrument(level = "trace", skip_all, fields(id = %message.message_id))]
    pub fn apply(&self, message: &mut Message) -> Decision {
        let decision = self.decide(message, self.clock.now_millis());

        match decision {
            Decision::Stamp { expiration } => {
                message.expiration = expiration;
                internal!(
                    level = DEBUG,
                    "Set message {} expiration to {}",
                    message.message_id,
                    expiration
                );
            }
            Decision::Skip(reason) => internal!("Left message {} alone: {reason}", message.message_id),
        }

        decision
    }
}

/// Whether `message` is already in the destination its dead-letter strategy
/// would send it to.
///
/// Asks the region's strategy where a message sent to the original
/// destination would be dead-lettered, and compares that to where this one
/// is going.
#[must_use]
pub fn is_destination_dlq(message: &Message) -> bool {
    let (Some(region), Some(original)) = (
        message.region_destination.as_ref(),
        message.original_destination.as_ref(),
    ) else {
        return false;
    };

    let Some(strategy) = region.dead_letter_strategy() else {
        return false;
    };

    let placed = Message::for_dead_letter(original.clone(), Arc::clone(region));

    strategy
        .dead_letter_queue_for(&placed, None)
        .is_some_and(|dead_letter| message.destination.as_ref() == Some(&dead_letter))
}
