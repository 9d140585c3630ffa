//! Backend traits for spreadsheet access

use crate::config::ServiceAccountKey;
use crate::core::error::StoreResult;
use crate::core::field::Row;
use async_trait::async_trait;
use std::sync::Arc;

/// An open spreadsheet
///
/// Implementations are agnostic to what the rows mean; they only move cells
/// in and out of named sheets.
#[async_trait]
pub trait SheetsClient: Send + Sync {
    /// Read every data row of a sheet
    ///
    /// The first sheet row supplies the column headers. Returned rows keep
    /// their sheet order, blank rows included, so that index `i` is always
    /// sheet row `i + 2`.
    async fn read_rows(&self, sheet: &str) -> StoreResult<Vec<Row>>;

    /// Overwrite a single cell (1-based row and column)
    async fn update_cell(
        &self,
        sheet: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> StoreResult<()>;
}

/// Performs the handshake that yields a [`SheetsClient`]
#[async_trait]
pub trait SheetsConnector: Send + Sync {
    /// Authenticate with the given key and open the spreadsheet by identifier
    async fn connect(
        &self,
        key: &ServiceAccountKey,
        spreadsheet_id: &str,
    ) -> StoreResult<Arc<dyn SheetsClient>>;
}
