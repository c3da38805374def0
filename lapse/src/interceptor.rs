use std::{cell::Cell, sync::Arc};

use async_trait::async_trait;
use lapse_common::{Message, forwarded};
use lapse_policy::{Decision, ExpirationPolicy};

use crate::{
    broker::{Broker, BrokerPlugin, ProducerExchange},
    error::BrokerError,
};

/// Plugin that gives transient messages an expiration before they are routed
#[derive(Debug, Clone)]
pub struct ForceExpiration {
    policy: Arc<ExpirationPolicy>,
}

impl ForceExpiration {
    #[must_use]
    pub const fn from_policy(policy: Arc<ExpirationPolicy>) -> Self {
        Self { policy }
    }
}

impl BrokerPlugin for ForceExpiration {
    fn install(self: Box<Self>, next: Arc<dyn Broker>) -> Arc<dyn Broker> {
        Arc::new(ExpirationInterceptor {
            policy: self.policy,
            next,
        })
    }
}

tokio::task_local! {
    static APPLIED: Cell<Option<Decision>>;
}

/// Await `send` and return its output with the decision an
/// [`ExpirationInterceptor`] applied while it ran.
///
/// With several interceptors on the chain, the innermost one's decision is
/// returned. `None` means no interceptor saw the message.
pub async fn with_decision<F: Future>(send: F) -> (F::Output, Option<Decision>) {
    APPLIED
        .scope(Cell::new(None), async move {
            let output = send.await;
            (output, APPLIED.with(Cell::take))
        })
        .await
}

/// The installed form of [`ForceExpiration`].
///
/// Every message is forwarded exactly once, and the next broker's result is
/// returned as-is.
pub struct ExpirationInterceptor {
    policy: Arc<ExpirationPolicy>,
    next: Arc<dyn Broker>,
}

#[async_trait]
impl Broker for ExpirationInterceptor {
    #[tracing::instrument(level = "trace", skip_all, fields(id = %message.message_id))]
    async fn send(
        &self,
        exchange: &ProducerExchange,
        message: &mut Message,
    ) -> Result<(), BrokerError> {
        let decision = self.policy.apply(message);

        // Only recorded when the caller asked for it through `with_decision`
        let _ = APPLIED.try_with(|applied| applied.set(Some(decision)));

        forwarded!(
            "{} from producer {} ({decision})",
            message.message_id,
            exchange.producer_id
        );

        self.next.send(exchange, message).await
    }
}
