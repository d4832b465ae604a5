//! Order endpoints.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use order_store::{
    Context, ListOptions, ListResult, NewOrder, NewOrderLine, Order, OrderId, OrderService,
    OrderStatus, Version,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;

/// Request header carrying the client's idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Response header set when a create was answered from an earlier request.
pub const IDEMPOTENT_REPLAYED_HEADER: &str = "idempotent-replayed";

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderService> {
    pub store: S,
    pub request_timeout: Duration,
    pub shutdown: CancellationToken,
}

impl<S: OrderService> AppState<S> {
    pub fn new(store: S, request_timeout: Duration) -> Self {
        Self {
            store,
            request_timeout,
            shutdown: CancellationToken::new(),
        }
    }

    /// Context for one request: cancelled on shutdown, bounded by the
    /// configured timeout.
    fn request_context(&self) -> Context {
        Context::with_token(self.shutdown.child_token()).child_with_timeout(self.request_timeout)
    }
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub lines: Vec<OrderLineRequest>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(req: CreateOrderRequest) -> Self {
        NewOrder {
            customer_id: req.customer_id,
            currency: req.currency,
            lines: req
                .lines
                .into_iter()
                .map(|line| {
                    NewOrderLine::new(line.product_id, line.quantity, line.unit_price_cents)
                })
                .collect(),
            attributes: req.attributes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetOrderParams {
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub status: Option<String>,
    pub customer_id: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl TryFrom<ListOrdersParams> for ListOptions {
    type Error = ApiError;

    fn try_from(params: ListOrdersParams) -> Result<Self, Self::Error> {
        Ok(ListOptions {
            status: params
                .status
                .as_deref()
                .map(str::parse::<OrderStatus>)
                .transpose()?,
            customer_id: params.customer_id,
            created_from: params.created_from,
            created_to: params.created_to,
            page: params.page.unwrap_or_default(),
            page_size: params.page_size.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub expected_version: Option<i64>,
}

// -- Handlers --

/// POST /orders: create an order, honoring the `Idempotency-Key` header.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: OrderService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Response, ApiError> {
    let key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .map(|value| value.to_str())
        .transpose()
        .map_err(|_| ApiError::BadRequest("Idempotency-Key must be visible ASCII".to_string()))?;

    let created = state
        .store
        .create(&state.request_context(), req.into(), key)
        .await?;

    if created.reused {
        let mut response = (StatusCode::OK, Json(created.order)).into_response();
        response.headers_mut().insert(
            IDEMPOTENT_REPLAYED_HEADER,
            HeaderValue::from_static("true"),
        );
        Ok(response)
    } else {
        Ok((StatusCode::CREATED, Json(created.order)).into_response())
    }
}

/// GET /orders/{id}: fetch one order.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Query(params): Query<GetOrderParams>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .store
        .get(
            &state.request_context(),
            &OrderId::from(id),
            params.include_deleted,
        )
        .await?;
    Ok(Json(order))
}

/// GET /orders: list live orders, newest first.
#[tracing::instrument(skip(state, params))]
pub async fn list<S: OrderService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<ListResult<Order>>, ApiError> {
    let options = ListOptions::try_from(params)?;
    let page = state.store.list(&state.request_context(), options).await?;
    Ok(Json(page))
}

/// POST /orders/{id}/status: transition an order's status.
///
/// A missing order is reported as 404 even when the requested status is
/// also unrecognized.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: OrderService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let ctx = state.request_context();
    let id = OrderId::from(id);
    let new_status = match req.status.parse::<OrderStatus>() {
        Ok(status) => status,
        Err(err) => {
            state.store.get(&ctx, &id, false).await?;
            return Err(err.into());
        }
    };
    let order = state
        .store
        .update_status(&ctx, &id, new_status, req.expected_version.map(Version::new))
        .await?;
    Ok(Json(order))
}

/// DELETE /orders/{id}: soft-delete an order.
#[tracing::instrument(skip(state))]
pub async fn delete<S: OrderService + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete(&state.request_context(), &OrderId::from(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
