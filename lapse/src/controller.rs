use std::{
    fmt::{self, Display},
    sync::Arc,
};

use lapse_common::{BrokerId, Clock, Destination, Message, MessageId, SystemClock, internal};
use lapse_policy::{Decision, ExpirationPolicy, PolicyConfig, SkipReason};
use serde::Deserialize;

use crate::{
    broker::{Broker, BrokerPlugin, ProducerExchange, chain},
    error::{BrokerError, LapseError},
    interceptor::{ForceExpiration, with_decision},
    memory::MemoryBroker,
    region::{RegionConfig, Regions},
};

/// Top-level configuration, read from `lapse.config.ron`
///
/// ```ron
/// Lapse (
///     policy: (
///         zero_expiration_override_ms: 600000,
///     ),
///     regions: [
///         (destination: "queue://zocalo.transient.work"),
///     ],
///     reject: ["queue://zocalo.transient.full"],
/// )
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Lapse {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
    /// Destinations the in-memory broker refuses
    #[serde(default)]
    pub reject: Vec<Destination>,
}

impl Lapse {
    /// Build the send chain reading the system clock
    ///
    /// # Errors
    /// Fails on an invalid destination pattern or a duplicated region.
    pub fn build(self) -> Result<Host, LapseError> {
        self.build_with_clock(Arc::new(SystemClock))
    }

    /// Build the send chain reading `clock`
    ///
    /// # Errors
    /// Fails on an invalid destination pattern or a duplicated region.
    #[tracing::instrument(level = "trace", skip_all, err)]
    pub fn build_with_clock(self, clock: Arc<dyn Clock>) -> Result<Host, LapseError> {
        internal!(level = INFO, "Initialising host ...");

        let policy = Arc::new(ExpirationPolicy::with_clock(
            self.policy,
            Arc::clone(&clock),
        )?);
        let regions = Regions::from_config(self.regions)?;
        let store = MemoryBroker::rejecting(self.reject);

        let plugins: Vec<Box<dyn BrokerPlugin>> =
            vec![Box::new(ForceExpiration::from_policy(Arc::clone(&policy)))];
        let broker = chain(plugins, Arc::new(store.clone()));

        internal!(
            level = INFO,
            "Host initialised: {} filters, {} regions",
            policy.filters().len(),
            regions.len()
        );

        Ok(Host {
            regions,
            store,
            broker,
            clock,
        })
    }
}

/// A message as described in a batch file
///
/// ```ron
/// [
///     (destination: Some("queue://zocalo.transient.work")),
///     (
///         destination: Some("queue://ActiveMQ.DLQ"),
///         original_destination: Some("queue://zocalo.transient.work"),
///     ),
///     (destination: Some("queue://zocalo.transient.work"), broker_path: ["broker-b"]),
/// ]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageSpec {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub destination: Option<Destination>,
    /// Defaults to the time the batch is run
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub expiration: i64,
    #[serde(default)]
    pub broker_path: Vec<String>,
    #[serde(default)]
    pub original_destination: Option<Destination>,
    /// Region to resolve; defaults to the original destination, then the destination
    #[serde(default)]
    pub region: Option<Destination>,
}

/// Outcome of sending one message through the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub id: MessageId,
    pub destination: Option<Destination>,
    /// What the expiration interceptor did; `None` if it never saw the message
    pub decision: Option<Decision>,
    /// Expiration after the chain ran
    pub expiration: i64,
    pub result: Result<(), BrokerError>,
}

impl Report {
    #[must_use]
    pub const fn skipped(&self) -> Option<SkipReason> {
        match self.decision {
            Some(Decision::Skip(reason)) => Some(reason),
            _ => None,
        }
    }

    #[must_use]
    pub fn stamped(&self) -> bool {
        self.decision.is_some_and(|decision| decision.is_stamp())
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let destination = self
            .destination
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);

        write!(f, "{} {destination} ", self.id)?;

        match self.decision {
            Some(Decision::Stamp { .. }) => f.write_str("stamped")?,
            Some(Decision::Skip(reason)) => write!(f, "skipped ({reason})")?,
            None => f.write_str("not evaluated")?,
        }

        write!(f, " expiration={}", self.expiration)?;

        match &self.result {
            Ok(()) => f.write_str(" ok"),
            Err(err) => write!(f, " error: {err}"),
        }
    }
}

/// A running send chain over the in-memory broker
pub struct Host {
    regions: Regions,
    store: MemoryBroker,
    broker: Arc<dyn Broker>,
    clock: Arc<dyn Clock>,
}

impl Host {
    #[must_use]
    pub const fn store(&self) -> &MemoryBroker {
        &self.store
    }

    #[must_use]
    pub fn broker(&self) -> Arc<dyn Broker> {
        Arc::clone(&self.broker)
    }

    /// Turn a description into a message, resolving its region
    #[must_use]
    pub fn message(&self, spec: MessageSpec) -> Message {
        let region = spec
            .region
            .as_ref()
            .or(spec.original_destination.as_ref())
            .or(spec.destination.as_ref())
            .and_then(|destination| self.regions.get(destination));

        Message {
            message_id: spec.id.map_or_else(MessageId::generate, MessageId::new),
            timestamp: spec.timestamp.unwrap_or_else(|| self.clock.now_millis()),
            expiration: spec.expiration,
            destination: spec.destination,
            broker_path: spec.broker_path.into_iter().map(BrokerId).collect(),
            original_destination: spec.original_destination,
            region_destination: region,
        }
    }

    pub async fn send(&self, exchange: &ProducerExchange, spec: MessageSpec) -> Report {
        let mut message = self.message(spec);

        let (result, decision) = with_decision(self.broker.send(exchange, &mut message)).await;

        Report {
            id: message.message_id,
            destination: message.destination,
            decision,
            expiration: message.expiration,
            result,
        }
    }

    /// Send a batch in order, one report per message
    pub async fn check(&self, specs: Vec<MessageSpec>) -> Vec<Report> {
        let exchange = ProducerExchange {
            connection_id: "lapse".to_string(),
            producer_id: "lapse-check".to_string(),
        };

        let mut reports = Vec::with_capacity(specs.len());
        for spec in specs {
            reports.push(self.send(&exchange, spec).await);
        }

        reports
    }
}
