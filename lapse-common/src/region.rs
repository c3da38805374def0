//! Capabilities the hosting broker exposes for a resolved destination.
//!
//! The broker owns routing and dead-letter placement. These traits describe
//! the small read-only surface the expiration policy needs from it.

use std::fmt::Debug;

use crate::{destination::Destination, message::Message};

/// A durable subscriber identity, used by strategies that place dead letters
/// per subscriber
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub client_id: String,
    pub subscription_name: String,
}

/// Computes where a message would be placed once it is dead-lettered
pub trait DeadLetterStrategy: Send + Sync + Debug {
    /// Returns `None` when the strategy has no dead-letter destination for
    /// this message
    fn dead_letter_queue_for(
        &self,
        message: &Message,
        subscription: Option<&Subscription>,
    ) -> Option<Destination>;
}

/// The broker's resolved view of a destination
pub trait RegionDestination: Send + Sync + Debug {
    fn destination(&self) -> &Destination;

    fn dead_letter_strategy(&self) -> Option<&dyn DeadLetterStrategy>;
}
