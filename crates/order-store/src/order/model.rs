//! Order records and caller-supplied order skeletons.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OrderStoreError, Result};
use crate::{OrderId, OrderStatus};

/// Version number of an order, used for optimistic concurrency control.
///
/// Starts at 1 when the order is created and increments by 1 on every
/// accepted status transition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the version assigned at creation (1).
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version. Saturates at `i64::MAX`.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A line of an order as supplied by the caller. Carries no total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl NewOrderLine {
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price_cents: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price_cents,
        }
    }
}

/// A stored order line with its derived total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Always `quantity * unit_price_cents`; never taken from input.
    pub line_total_cents: i64,
}

impl OrderLine {
    fn price(line: NewOrderLine) -> Result<Self> {
        let line_total_cents = line
            .quantity
            .checked_mul(line.unit_price_cents)
            .ok_or_else(|| {
                OrderStoreError::invalid_input(format!(
                    "line total overflows for product '{}'",
                    line.product_id
                ))
            })?;
        Ok(Self {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            line_total_cents,
        })
    }
}

/// Skeleton of an order to create.
///
/// Identity, status, version, totals and timestamps are assigned by the
/// store; anything the caller might put there is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: String,
    pub currency: String,
    pub lines: Vec<NewOrderLine>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl NewOrder {
    pub fn new(customer_id: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            currency: currency.into(),
            lines: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    /// Appends a line.
    pub fn line(
        mut self,
        product_id: impl Into<String>,
        quantity: i64,
        unit_price_cents: i64,
    ) -> Self {
        self.lines
            .push(NewOrderLine::new(product_id, quantity, unit_price_cents));
        self
    }

    /// Sets an attribute.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Checks the skeleton, reporting the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.customer_id.is_empty() {
            return Err(OrderStoreError::invalid_input("customer_id is required"));
        }
        if self.currency.is_empty() {
            return Err(OrderStoreError::invalid_input("currency is required"));
        }
        if self.lines.is_empty() {
            return Err(OrderStoreError::invalid_input(
                "order must contain at least one line",
            ));
        }
        for (index, line) in self.lines.iter().enumerate() {
            if line.quantity <= 0 {
                return Err(OrderStoreError::invalid_input(format!(
                    "line {index}: quantity must be greater than 0, got {}",
                    line.quantity
                )));
            }
            if line.unit_price_cents < 0 {
                return Err(OrderStoreError::invalid_input(format!(
                    "line {index}: unit price must not be negative, got {}",
                    line.unit_price_cents
                )));
            }
        }
        Ok(())
    }
}

/// An order held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: String,
    pub currency: String,
    pub lines: Vec<OrderLine>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
    /// Sum of every line total.
    pub total_cents: i64,
    pub status: OrderStatus,
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the order has been soft-deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Builds a fresh PENDING order at version 1 from a validated skeleton.
    pub fn from_new(new: NewOrder, id: OrderId, now: DateTime<Utc>) -> Result<Self> {
        new.validate()?;

        let lines = new
            .lines
            .into_iter()
            .map(OrderLine::price)
            .collect::<Result<Vec<_>>>()?;
        let total_cents = lines
            .iter()
            .try_fold(0i64, |acc, line| acc.checked_add(line.line_total_cents))
            .ok_or_else(|| OrderStoreError::invalid_input("order total overflows"))?;

        Ok(Self {
            id,
            customer_id: new.customer_id,
            currency: new.currency,
            lines,
            attributes: new.attributes,
            total_cents,
            status: OrderStatus::Pending,
            version: Version::first(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if the order is visible to reads that exclude tombstones.
    pub fn is_visible(&self, include_deleted: bool) -> bool {
        include_deleted || !self.is_deleted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_version_first_and_next() {
        assert_eq!(Version::first().as_i64(), 1);
        assert_eq!(Version::first().next(), Version::new(2));
        assert!(Version::new(1) < Version::new(2));
    }

    #[test]
    fn test_version_next_does_not_overflow() {
        assert_eq!(Version::new(i64::MAX).next(), Version::new(i64::MAX));
    }

    #[test]
    fn test_from_new_derives_totals() {
        let new = NewOrder::new("c1", "USD")
            .line("p1", 2, 500)
            .line("p2", 3, 125);
        let order = Order::from_new(new, OrderId::new("o-1"), now()).unwrap();

        assert_eq!(order.lines[0].line_total_cents, 1000);
        assert_eq!(order.lines[1].line_total_cents, 375);
        assert_eq!(order.total_cents, 1375);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.version, Version::first());
        assert_eq!(order.created_at, order.updated_at);
        assert!(order.deleted_at.is_none());
    }

    #[test]
    fn test_from_new_keeps_line_order() {
        let new = NewOrder::new("c1", "USD")
            .line("b", 1, 1)
            .line("a", 1, 1)
            .line("c", 1, 1);
        let order = Order::from_new(new, OrderId::new("o-1"), now()).unwrap();
        let products: Vec<_> = order.lines.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(products, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_zero_price_line_is_allowed() {
        let new = NewOrder::new("c1", "USD").line("gift", 1, 0);
        let order = Order::from_new(new, OrderId::new("o-1"), now()).unwrap();
        assert_eq!(order.total_cents, 0);
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let cases = vec![
            NewOrder::new("", "USD").line("p1", 1, 100),
            NewOrder::new("c1", "").line("p1", 1, 100),
            NewOrder::new("c1", "USD"),
            NewOrder::new("c1", "USD").line("p1", 0, 100),
            NewOrder::new("c1", "USD").line("p1", -1, 100),
            NewOrder::new("c1", "USD").line("p1", 1, -1),
        ];
        for case in cases {
            assert!(
                matches!(case.validate(), Err(OrderStoreError::InvalidInput(_))),
                "expected rejection for {case:?}"
            );
        }
    }

    #[test]
    fn test_from_new_rejects_invalid_skeleton() {
        let new = NewOrder::new("c1", "USD").line("p1", 0, 100);
        let err = Order::from_new(new, OrderId::new("o-1"), now()).unwrap_err();
        assert!(matches!(err, OrderStoreError::InvalidInput(_)));
    }

    #[test]
    fn test_overflowing_total_is_invalid_input() {
        let new = NewOrder::new("c1", "USD").line("p1", i64::MAX, 2);
        let err = Order::from_new(new, OrderId::new("o-1"), now()).unwrap_err();
        assert!(matches!(err, OrderStoreError::InvalidInput(_)));

        let new = NewOrder::new("c1", "USD")
            .line("p1", 1, i64::MAX)
            .line("p2", 1, 1);
        let err = Order::from_new(new, OrderId::new("o-1"), now()).unwrap_err();
        assert!(matches!(err, OrderStoreError::InvalidInput(_)));
    }

    #[test]
    fn test_order_serialization_omits_empty_optionals() {
        let new = NewOrder::new("c1", "USD").line("p1", 1, 100);
        let order = Order::from_new(new, OrderId::new("o-1"), now()).unwrap();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["version"], 1);
        assert!(json.get("deleted_at").is_none());
        assert!(json.get("attributes").is_none());
    }
}
