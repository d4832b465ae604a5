use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of an order.
///
/// Assigned once by an [`IdGenerator`] when the order is created and never
/// changed afterwards. The store makes no assumption about its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates an order ID from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of fresh order identifiers.
///
/// Implementations must return collision-resistant values; the store never
/// checks a generated ID against existing ones.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> OrderId;
}

impl<T: IdGenerator + ?Sized> IdGenerator for Arc<T> {
    fn next_id(&self) -> OrderId {
        (**self).next_id()
    }
}

/// Generates 128 random bits rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> OrderId {
        OrderId(Uuid::new_v4().simple().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_unique() {
        let generator = RandomIdGenerator::new();
        let id1 = generator.next_id();
        let id2 = generator.next_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn random_ids_are_lowercase_hex() {
        let id = RandomIdGenerator::new().next_id();
        assert_eq!(id.as_str().len(), 32);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn order_id_string_conversion() {
        let id = OrderId::new("ord-1");
        assert_eq!(id.as_str(), "ord-1");
        assert_eq!(id.to_string(), "ord-1");

        let id2: OrderId = "ord-2".into();
        assert_eq!(id2.as_ref(), "ord-2");
    }

    #[test]
    fn order_id_serializes_as_plain_string() {
        let id = OrderId::new("abc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc123\"");
        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn arc_generator_delegates() {
        let generator: Arc<dyn IdGenerator> = Arc::new(RandomIdGenerator);
        assert_eq!(generator.next_id().as_str().len(), 32);
    }
}
