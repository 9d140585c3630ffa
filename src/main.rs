//! tailor-sheets server
//!
//! Reads its settings from the environment (`MOCK_SHEETS`, `GOOGLE_SHEETS_ID`,
//! `GOOGLE_SERVICE_ACCOUNT_FILE`, `HOST`, `PORT`) and serves the order API.

use anyhow::Result;
use std::sync::Arc;
use tailor_sheets::config::SheetsConfig;
use tailor_sheets::logging;
use tailor_sheets::server::ServerBuilder;
use tailor_sheets::store::SheetStore;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = SheetsConfig::from_env()?;
    let addr = config.server.address();

    let store = Arc::new(SheetStore::from_config(config).await);
    tracing::info!(mode = ?store.mode(), ready = store.is_initialized(), "Sheet store ready");

    ServerBuilder::new(store).serve(&addr).await
}
