use thiserror::Error;

use crate::{OrderId, OrderStatus, Version};

/// Why an execution context stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    /// The caller cancelled the context.
    Cancelled,
    /// The context deadline passed.
    DeadlineExceeded,
}

impl std::fmt::Display for Cancellation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cancellation::Cancelled => write!(f, "context cancelled"),
            Cancellation::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// The order does not exist, or is soft-deleted and was not asked for.
    #[error("Order not found: {id}")]
    NotFound { id: OrderId },

    /// The expected version did not match the stored version.
    #[error("Version conflict for order {id}: expected version {expected}, found {actual}")]
    Conflict {
        id: OrderId,
        expected: Version,
        actual: Version,
    },

    /// The request payload is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested status transition is not allowed by the state machine.
    #[error("Invalid state transition for order {id}: cannot move from {from} to {to}")]
    InvalidState {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The caller's context ended before the operation started.
    #[error("Operation aborted: {0}")]
    Cancelled(Cancellation),

    /// An idempotency key resolved to an order that is not in the table.
    /// The index and the table have diverged; this is a store defect.
    #[error("Idempotency index inconsistent: key {key} points to missing order {order_id}")]
    IdempotencyInconsistency { key: String, order_id: OrderId },
}

impl OrderStoreError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        OrderStoreError::InvalidInput(reason.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, OrderStoreError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, OrderStoreError::Conflict { .. })
    }

    /// Returns true for faults that indicate the store corrupted itself.
    pub fn is_internal(&self) -> bool {
        matches!(self, OrderStoreError::IdempotencyInconsistency { .. })
    }
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, OrderStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_both_versions() {
        let err = OrderStoreError::Conflict {
            id: OrderId::new("o-1"),
            expected: Version::new(1),
            actual: Version::new(3),
        };
        assert_eq!(
            err.to_string(),
            "Version conflict for order o-1: expected version 1, found 3"
        );
        assert!(err.is_conflict());
        assert!(!err.is_internal());
    }

    #[test]
    fn consistency_fault_is_distinct_from_not_found() {
        let fault = OrderStoreError::IdempotencyInconsistency {
            key: "k".to_string(),
            order_id: OrderId::new("o-1"),
        };
        assert!(fault.is_internal());
        assert!(!fault.is_not_found());
    }

    #[test]
    fn cancellation_display() {
        let err = OrderStoreError::Cancelled(Cancellation::DeadlineExceeded);
        assert_eq!(err.to_string(), "Operation aborted: context deadline exceeded");
    }
}
