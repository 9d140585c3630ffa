//! Storage implementations for different backends

pub mod google;
pub mod in_memory;

pub use google::{GoogleSheetsClient, GoogleSheetsConnector};
pub use in_memory::{MOCK_ORDER_ID, MockSheets};
