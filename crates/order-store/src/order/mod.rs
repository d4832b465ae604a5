//! Order aggregate, its lines, and the status state machine.

mod model;
mod status;

pub use model::{NewOrder, NewOrderLine, Order, OrderLine, Version};
pub use status::OrderStatus;
