//! Core module containing the record types, row mapping and backend traits

pub mod error;
pub mod field;
pub mod mapper;
pub mod query;
pub mod record;
pub mod service;

pub use error::{ConfigError, RequestError, RowError, SheetsError, StoreError, StoreResult};
pub use field::{CellValue, Row};
pub use query::{OrderFilter, OrderPredicate, filter_orders};
pub use record::{
    DeliveryStatus, GarmentKind, GarmentSizes, Measurement, Order, OrderMeasurements, PantSizes,
    Sheet, ShirtSizes,
};
pub use service::{SheetsClient, SheetsConnector};
