use async_trait::async_trait;

use crate::{
    Context, ListOptions, ListResult, NewOrder, Order, OrderId, OrderStatus, Result, Version,
};

/// Outcome of an idempotent create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    /// The stored order, either freshly inserted or previously created
    /// under the same idempotency key.
    pub order: Order,

    /// True if the idempotency key was already bound and no new order was made.
    pub reused: bool,
}

/// Core contract of an order store.
///
/// Every operation checks its context before doing any work and returns
/// owned copies; callers can never reach the store's internal state through
/// a returned value. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Creates an order, or returns the one already created under
    /// `idempotency_key`. An empty key is the same as no key.
    async fn create(
        &self,
        ctx: &Context,
        order: NewOrder,
        idempotency_key: Option<&str>,
    ) -> Result<Created>;

    /// Fetches an order by ID. Soft-deleted orders are `NotFound` unless
    /// `include_deleted` is set.
    async fn get(&self, ctx: &Context, id: &OrderId, include_deleted: bool) -> Result<Order>;

    /// Lists live orders matching `options`, newest first.
    async fn list(&self, ctx: &Context, options: ListOptions) -> Result<ListResult<Order>>;

    /// Moves an order to `new_status`.
    ///
    /// If `expected_version` is set and differs from the stored version the
    /// call fails with `Conflict` and nothing changes.
    async fn update_status(
        &self,
        ctx: &Context,
        id: &OrderId,
        new_status: OrderStatus,
        expected_version: Option<Version>,
    ) -> Result<Order>;

    /// Soft-deletes an order.
    async fn delete(&self, ctx: &Context, id: &OrderId) -> Result<()>;
}
