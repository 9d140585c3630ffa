//! # tailor-sheets
//!
//! Order and measurement data layer for a tailoring shop, using a Google
//! Sheets spreadsheet as the system of record.
//!
//! ## Features
//!
//! - **Typed Records**: spreadsheet rows become `Order` and `Measurement` values,
//!   with defaults for missing or malformed cells
//! - **Mock Mode**: an in-memory fixture for running without credentials
//! - **Filtering**: status, garment type and free-text search over orders
//! - **Status Propagation**: one delivery-status change written to every sheet
//!   holding the order, re-authenticating once on expired credentials
//! - **REST Exposure**: an axum router over the store
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tailor_sheets::prelude::*;
//!
//! let store = SheetStore::from_config(SheetsConfig::from_env()?).await;
//!
//! let ready = filter_orders(
//!     store.fetch_orders().await,
//!     &OrderFilter::new().with_status("Ready"),
//! );
//!
//! store.update_status("ORD-17", DeliveryStatus::Delivered.as_str()).await;
//! ```

pub mod config;
pub mod core;
pub mod logging;
pub mod server;
pub mod storage;
pub mod store;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Records ===
    pub use crate::core::{
        field::{CellValue, Row},
        record::{
            DeliveryStatus, GarmentKind, GarmentSizes, Measurement, Order, OrderMeasurements,
            PantSizes, Sheet, ShirtSizes,
        },
    };

    // === Queries ===
    pub use crate::core::query::{OrderFilter, OrderPredicate, filter_orders};

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, RequestError, RowError, SheetsError, StoreError, StoreResult,
    };

    // === Backends ===
    pub use crate::core::service::{SheetsClient, SheetsConnector};
    pub use crate::storage::{GoogleSheetsConnector, MockSheets};

    // === Store ===
    pub use crate::store::{SheetOutcome, SheetStore, StatusUpdateReport, StoreMode};

    // === Config ===
    pub use crate::config::{ServiceAccountKey, SheetsConfig};

    // === Server ===
    pub use crate::server::ServerBuilder;

    // === External dependencies ===
    pub use async_trait::async_trait;
}
