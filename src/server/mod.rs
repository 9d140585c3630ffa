//! HTTP exposure of the sheet store
//!
//! This module provides a `ServerBuilder` that registers:
//! - Health routes reporting the store's connection state
//! - Order routes for listing, lookup, measurements and status changes

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
