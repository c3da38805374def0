use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use lapse_common::{Destination, Message, forwarded};
use parking_lot::Mutex;

use crate::{
    broker::{Broker, ProducerExchange},
    error::BrokerError,
};

/// Terminal broker that keeps every message it accepts.
///
/// Stands in for routing and storage when running the chain without a real
/// broker. Destinations listed as rejected fail with
/// [`BrokerError::Rejected`] and are not recorded.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    sent: Arc<Mutex<Vec<Message>>>,
    rejected: Arc<HashSet<Destination>>,
}

impl MemoryBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rejecting(destinations: impl IntoIterator<Item = Destination>) -> Self {
        Self {
            sent: Arc::default(),
            rejected: Arc::new(destinations.into_iter().collect()),
        }
    }

    /// A snapshot of accepted messages, in arrival order
    #[must_use]
    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn send(
        &self,
        _exchange: &ProducerExchange,
        message: &mut Message,
    ) -> Result<(), BrokerError> {
        let Some(destination) = message.destination.as_ref() else {
            return Err(BrokerError::NoDestination(message.message_id.to_string()));
        };

        if self.rejected.contains(destination) {
            return Err(BrokerError::Rejected {
                destination: destination.clone(),
                reason: "destination is not accepting messages".to_string(),
            });
        }

        forwarded!(level = DEBUG, "Stored {} on {destination}", message.message_id);

        self.sent.lock().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_order() {
        let broker = MemoryBroker::new();
        let exchange = ProducerExchange::default();

        for name in ["a", "b", "c"] {
            let mut message = Message::new(Destination::queue(name), 1);
            broker.send(&exchange, &mut message).await.expect("accepted");
        }

        let names = broker
            .sent()
            .iter()
            .filter_map(|m| m.destination.as_ref().map(|d| d.name().to_string()))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_missing_destination_fails() {
        let broker = MemoryBroker::new();
        let mut message = Message::default();

        let result = broker.send(&ProducerExchange::default(), &mut message).await;

        assert!(matches!(result, Err(BrokerError::NoDestination(_))));
        assert!(broker.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_destination_is_not_recorded() {
        let broker = MemoryBroker::rejecting([Destination::queue("full")]);
        let mut message = Message::new(Destination::queue("full"), 1);

        let result = broker.send(&ProducerExchange::default(), &mut message).await;

        assert!(matches!(result, Err(BrokerError::Rejected { .. })));
        assert_eq!(broker.len(), 0);
    }
}
