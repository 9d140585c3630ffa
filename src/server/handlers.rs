//! HTTP handlers for order operations
//!
//! Handlers are thin: they parse the request, call the store and shape the
//! response. Degradation rules live in the store.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::error::{RequestError, SheetsError};
use crate::core::query::{OrderFilter, filter_orders};
use crate::core::record::{DeliveryStatus, Order, OrderMeasurements};
use crate::store::{SheetStore, SheetUpdate, StoreMode};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SheetStore>,
}

impl AppState {
    pub fn new(store: Arc<SheetStore>) -> Self {
        Self { store }
    }
}

/// Response for the health endpoints
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Whether the store can serve data
    pub ready: bool,
    pub mode: StoreMode,
    pub version: String,
}

/// Response for list orders endpoint
#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    pub orders: Vec<Order>,
    pub count: usize,
}

/// Request body for a status change
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Response for a status change
#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub order_id: String,
    pub status: String,
    pub sheets: Vec<SheetUpdate>,
}

/// Health check
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        ready: state.store.is_initialized(),
        mode: state.store.mode(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List orders, optionally filtered
///
/// GET /api/orders?status=...&garment_type=...&search=...
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<ListOrdersResponse>, SheetsError> {
    let orders = filter_orders(state.store.try_fetch_orders().await?, &filter);

    Ok(Json(ListOrdersResponse {
        count: orders.len(),
        orders,
    }))
}

/// Get a single order
///
/// GET /api/orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, SheetsError> {
    match state.store.fetch_order(&order_id).await? {
        Some(order) => Ok(Json(order)),
        None => Err(RequestError::NotFound {
            resource: "Order".to_string(),
            id: order_id,
        }
        .into()),
    }
}

/// Get the measurements recorded for an order
///
/// GET /api/orders/{order_id}/measurements
pub async fn get_measurements(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Json<OrderMeasurements> {
    Json(state.store.fetch_measurements(&order_id).await)
}

/// Change the delivery status of an order
///
/// PUT /api/orders/{order_id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<(StatusCode, Json<StatusUpdateResponse>), SheetsError> {
    let status: DeliveryStatus = payload
        .status
        .parse()
        .map_err(|_| RequestError::InvalidStatus {
            value: payload.status.clone(),
        })?;

    let report = state
        .store
        .update_status_report(&order_id, status.as_str())
        .await;

    let success = report.updated();
    let code = if success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    Ok((
        code,
        Json(StatusUpdateResponse {
            success,
            order_id: report.order_id,
            status: report.status,
            sheets: report.sheets,
        }),
    ))
}
