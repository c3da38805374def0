use std::sync::Arc;

use async_trait::async_trait;
use lapse_common::Message;
use serde::{Deserialize, Serialize};

use crate::error::BrokerError;

/// The producer connection a send call arrived on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerExchange {
    pub connection_id: String,
    pub producer_id: String,
}

/// One stage of the broker's send path
#[async_trait]
pub trait Broker: Send + Sync {
    /// Accept `message` from the producer behind `exchange`
    ///
    /// # Errors
    /// Whatever the broker fails with; callers earlier in the chain must
    /// propagate it unchanged.
    async fn send(
        &self,
        exchange: &ProducerExchange,
        message: &mut Message,
    ) -> Result<(), BrokerError>;
}

/// Something that can wrap the rest of a send chain
pub trait BrokerPlugin: Send {
    fn install(self: Box<Self>, next: Arc<dyn Broker>) -> Arc<dyn Broker>;
}

/// Install `plugins` in front of `terminal`.
///
/// The first plugin listed sees each message first.
#[must_use]
pub fn chain(plugins: Vec<Box<dyn BrokerPlugin>>, terminal: Arc<dyn Broker>) -> Arc<dyn Broker> {
    plugins
        .into_iter()
        .rev()
        .fold(terminal, |next, plugin| plugin.install(next))
}
