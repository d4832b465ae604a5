//! Shared primitives for the order store.
//!
//! Holds the order identifier type and the two collaborators the store
//! consumes but does not own: identifier generation and the wall clock.

pub mod clock;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use types::{IdGenerator, OrderId, RandomIdGenerator};
