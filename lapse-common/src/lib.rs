pub mod clock;
pub mod destination;
pub mod error;
pub mod logging;
pub mod message;
pub mod region;

pub use tracing;

pub use clock::{Clock, FixedClock, SystemClock};
pub use destination::{Destination, DestinationKind};
pub use error::DestinationError;
pub use message::{BrokerId, Message, MessageId};
pub use region::{DeadLetterStrategy, RegionDestination, Subscription};
