//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use order_store::{Cancellation, OrderStoreError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client, rejected before reaching the store.
    BadRequest(String),
    /// Error returned by the order store.
    Store(OrderStoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(err) => store_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn store_error_to_response(err: OrderStoreError) -> (StatusCode, String) {
    let status = match &err {
        OrderStoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        OrderStoreError::Conflict { .. } => StatusCode::CONFLICT,
        OrderStoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        OrderStoreError::InvalidState { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        OrderStoreError::Cancelled(Cancellation::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
        OrderStoreError::Cancelled(Cancellation::DeadlineExceeded) => StatusCode::GATEWAY_TIMEOUT,
        OrderStoreError::IdempotencyInconsistency { .. } => {
            tracing::error!(error = %err, "order store consistency fault");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<OrderStoreError> for ApiError {
    fn from(err: OrderStoreError) -> Self {
        ApiError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use order_store::{OrderId, OrderStatus, Version};

    use super::*;

    fn status_of(err: OrderStoreError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn store_errors_map_to_distinct_statuses() {
        let id = OrderId::new("o-1");
        assert_eq!(
            status_of(OrderStoreError::NotFound { id: id.clone() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(OrderStoreError::Conflict {
                id: id.clone(),
                expected: Version::new(1),
                actual: Version::new(2),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(OrderStoreError::InvalidState {
                id: id.clone(),
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(OrderStoreError::IdempotencyInconsistency {
                key: "k".to_string(),
                order_id: id,
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(OrderStoreError::Cancelled(Cancellation::DeadlineExceeded)),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
