//! In-process order store.
//!
//! This crate provides:
//! - Order model with derived totals and a status state machine
//! - Execution contexts carrying cancellation and deadlines
//! - The `OrderService` contract and its in-memory implementation with
//!   idempotent creation, optimistic status transitions and paginated listing

pub mod context;
pub mod error;
pub mod memory;
pub mod order;
pub mod query;
pub mod store;

pub use common::{Clock, IdGenerator, OrderId, RandomIdGenerator, SystemClock};
pub use context::Context;
pub use error::{Cancellation, OrderStoreError, Result};
pub use memory::InMemoryOrderStore;
pub use order::{NewOrder, NewOrderLine, Order, OrderLine, OrderStatus, Version};
pub use query::{ListOptions, ListResult};
pub use store::{Created, OrderService};
