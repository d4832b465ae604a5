use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Clock, Context, Created, IdGenerator, ListOptions, ListResult, NewOrder, Order, OrderId,
    OrderService, OrderStatus, OrderStoreError, RandomIdGenerator, Result, SystemClock, Version,
};

/// Primary table and idempotency index. Both live behind one lock so they
/// are never observed out of step with each other.
#[derive(Default)]
struct Tables {
    orders: HashMap<OrderId, Order>,
    idempotency: HashMap<String, OrderId>,
}

impl Tables {
    /// Resolves an idempotency key to a copy of its order.
    ///
    /// A key bound to an order missing from the table is a consistency
    /// fault, never an ordinary miss.
    fn resolve_key(&self, key: &str) -> Result<Option<Order>> {
        let Some(order_id) = self.idempotency.get(key) else {
            return Ok(None);
        };
        match self.orders.get(order_id) {
            Some(order) => Ok(Some(order.clone())),
            None => {
                metrics::counter!("order_store_consistency_faults_total").increment(1);
                tracing::error!(key, %order_id, "idempotency key points to a missing order");
                Err(OrderStoreError::IdempotencyInconsistency {
                    key: key.to_string(),
                    order_id: order_id.clone(),
                })
            }
        }
    }

    fn live_mut(&mut self, id: &OrderId) -> Result<&mut Order> {
        self.orders
            .get_mut(id)
            .filter(|order| !order.is_deleted())
            .ok_or_else(|| OrderStoreError::NotFound { id: id.clone() })
    }
}

/// In-memory order store.
///
/// A cheap-to-clone handle; clones share the same tables. Reads take the
/// lock in shared mode and may run in parallel; every mutation holds it
/// exclusively for its whole check-then-commit sequence. Nothing survives
/// a process restart.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore<I = RandomIdGenerator, C = SystemClock> {
    tables: Arc<RwLock<Tables>>,
    ids: I,
    clock: C,
}

impl InMemoryOrderStore {
    /// Creates an empty store with random IDs and the system clock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I: IdGenerator, C: Clock> InMemoryOrderStore<I, C> {
    /// Creates an empty store with the given ID source and clock.
    pub fn with_collaborators(ids: I, clock: C) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            ids,
            clock,
        }
    }

    /// Returns the number of stored orders, tombstones included.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    /// Returns the number of bound idempotency keys.
    pub async fn idempotency_key_count(&self) -> usize {
        self.tables.read().await.idempotency.len()
    }

    fn replayed(order: Order) -> Created {
        metrics::counter!("orders_idempotent_replays_total").increment(1);
        tracing::debug!(
            order_id = %order.id,
            "idempotency key already bound, returning existing order"
        );
        Created {
            order,
            reused: true,
        }
    }
}

#[async_trait]
impl<I: IdGenerator, C: Clock> OrderService for InMemoryOrderStore<I, C> {
    #[tracing::instrument(skip(self, ctx, order), fields(customer_id = %order.customer_id))]
    async fn create(
        &self,
        ctx: &Context,
        order: NewOrder,
        idempotency_key: Option<&str>,
    ) -> Result<Created> {
        ctx.check()?;
        let key = idempotency_key.filter(|k| !k.is_empty());

        // Fast path: a retried request only needs the shared lock.
        if let Some(key) = key {
            let existing = self.tables.read().await.resolve_key(key)?;
            if let Some(existing) = existing {
                return Ok(Self::replayed(existing));
            }
        }

        // Validated and priced outside the lock.
        let candidate = Order::from_new(order, self.ids.next_id(), self.clock.now())?;

        let mut tables = self.tables.write().await;

        // A concurrent request with the same key may have committed since
        // the fast-path check.
        if let Some(key) = key
            && let Some(existing) = tables.resolve_key(key)?
        {
            return Ok(Self::replayed(existing));
        }

        tables
            .orders
            .insert(candidate.id.clone(), candidate.clone());
        if let Some(key) = key {
            tables
                .idempotency
                .insert(key.to_string(), candidate.id.clone());
        }
        drop(tables);

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %candidate.id,
            total_cents = candidate.total_cents,
            "order created"
        );

        Ok(Created {
            order: candidate,
            reused: false,
        })
    }

    #[tracing::instrument(skip(self, ctx))]
    async fn get(&self, ctx: &Context, id: &OrderId, include_deleted: bool) -> Result<Order> {
        ctx.check()?;

        let tables = self.tables.read().await;
        tables
            .orders
            .get(id)
            .filter(|order| order.is_visible(include_deleted))
            .cloned()
            .ok_or_else(|| OrderStoreError::NotFound { id: id.clone() })
    }

    #[tracing::instrument(skip(self, ctx))]
    async fn list(&self, ctx: &Context, options: ListOptions) -> Result<ListResult<Order>> {
        ctx.check()?;
        let (page, page_size) = options.normalized_paging();

        let tables = self.tables.read().await;
        let mut matched: Vec<&Order> = tables
            .orders
            .values()
            .filter(|order| options.matches(order))
            .collect();

        // Newest first; created_at is not unique, so ties fall back to ID.
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(ListResult::paginate(matched, page, page_size).map(Order::clone))
    }

    #[tracing::instrument(skip(self, ctx))]
    async fn update_status(
        &self,
        ctx: &Context,
        id: &OrderId,
        new_status: OrderStatus,
        expected_version: Option<Version>,
    ) -> Result<Order> {
        ctx.check()?;

        let mut tables = self.tables.write().await;
        let order = tables.live_mut(id)?;

        if let Some(expected) = expected_version
            && expected != order.version
        {
            metrics::counter!("order_version_conflicts_total").increment(1);
            return Err(OrderStoreError::Conflict {
                id: id.clone(),
                expected,
                actual: order.version,
            });
        }

        let from = order.status;
        if !from.can_transition_to(new_status) {
            return Err(OrderStoreError::InvalidState {
                id: id.clone(),
                from,
                to: new_status,
            });
        }

        order.status = new_status;
        order.version = order.version.next();
        order.updated_at = self.clock.now();
        let updated = order.clone();
        drop(tables);

        metrics::counter!("order_status_transitions_total", "to" => new_status.as_str())
            .increment(1);
        tracing::info!(
            %id,
            %from,
            to = %new_status,
            version = %updated.version,
            "order status changed"
        );

        Ok(updated)
    }

    #[tracing::instrument(skip(self, ctx))]
    async fn delete(&self, ctx: &Context, id: &OrderId) -> Result<()> {
        ctx.check()?;

        let mut tables = self.tables.write().await;
        let order = tables.live_mut(id)?;
        order.deleted_at = Some(self.clock.now());
        drop(tables);

        metrics::counter!("orders_deleted_total").increment(1);
        tracing::info!(%id, "order soft-deleted");
        Ok(())
    }
}
