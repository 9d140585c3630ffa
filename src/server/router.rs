//! Route table

use crate::server::handlers::{
    AppState, get_measurements, get_order, health_check, list_orders, update_status,
};
use axum::{
    Router,
    routing::{get, put},
};

/// Build health check routes
///
/// - GET /health
/// - GET /healthz
pub fn build_health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .with_state(state)
}

/// Build order routes
///
/// - GET /api/orders - List orders (query: status, garment_type, search)
/// - GET /api/orders/{order_id} - Get one order
/// - GET /api/orders/{order_id}/measurements - Get an order's measurements
/// - PUT /api/orders/{order_id}/status - Change the delivery status
pub fn build_order_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/orders", get(list_orders))
        .route("/api/orders/{order_id}", get(get_order))
        .route(
            "/api/orders/{order_id}/measurements",
            get(get_measurements),
        )
        .route("/api/orders/{order_id}/status", put(update_status))
        .with_state(state)
}
