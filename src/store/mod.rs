//! The sheet store: one entry point over the mock and live backends
//!
//! The backend is chosen when the store is built:
//!
//! - `MOCK_SHEETS` set: the in-memory fixture, unconditionally
//! - no spreadsheet id: nothing is connected and every read is empty
//! - otherwise: the service-account key is validated and the connector
//!   opens the spreadsheet; any failure leaves the store unavailable
//!
//! A connected store that fails to reconnect keeps its current client.
//!
//! No operation here ever fails the caller outright. Reads degrade to empty
//! results and writes report which sheets were updated.

pub mod propagate;

pub use propagate::{SheetOutcome, SheetUpdate, StatusUpdateReport};

use crate::config::{ServiceAccountKey, SheetsConfig};
use crate::core::error::{ConfigError, StoreError, StoreResult};
use crate::core::mapper;
use crate::core::query::{OrderFilter, filter_orders};
use crate::core::record::{GarmentKind, Measurement, Order, OrderMeasurements, Sheet};
use crate::core::service::{SheetsClient, SheetsConnector};
use crate::storage::{GoogleSheetsConnector, MockSheets};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

/// Connection state of a [`SheetStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    /// No initialization was attempted (no spreadsheet configured)
    Uninitialized,
    /// Serving the in-memory fixture
    Mock,
    /// Connected to the live spreadsheet
    LiveConnected,
    /// Initialization was attempted and failed
    LiveUnavailable,
}

#[derive(Clone)]
enum Backend {
    Uninitialized,
    Mock,
    Live(Arc<dyn SheetsClient>),
    Unavailable,
}

impl Backend {
    fn mode(&self) -> StoreMode {
        match self {
            Backend::Uninitialized => StoreMode::Uninitialized,
            Backend::Mock => StoreMode::Mock,
            Backend::Live(_) => StoreMode::LiveConnected,
            Backend::Unavailable => StoreMode::LiveUnavailable,
        }
    }
}

/// Spreadsheet-backed order store
///
/// Build it once at startup and share it as `Arc<SheetStore>`.
pub struct SheetStore {
    config: SheetsConfig,
    connector: Arc<dyn SheetsConnector>,
    mock: MockSheets,
    backend: RwLock<Backend>,
}

impl SheetStore {
    /// Build a store and run initialization with the given connector
    pub async fn connect(config: SheetsConfig, connector: Arc<dyn SheetsConnector>) -> Self {
        Self::connect_with_mock(config, connector, MockSheets::new()).await
    }

    /// Like [`connect`](Self::connect), with custom fixture data for mock mode
    pub async fn connect_with_mock(
        config: SheetsConfig,
        connector: Arc<dyn SheetsConnector>,
        mock: MockSheets,
    ) -> Self {
        let store = Self {
            config,
            connector,
            mock,
            backend: RwLock::new(Backend::Uninitialized),
        };

        if store.config.mock || store.config.spreadsheet_id().is_some() {
            store.initialize().await;
        } else {
            tracing::warn!(
                "GOOGLE_SHEETS_ID is not set; spreadsheet access disabled. Set GOOGLE_SHEETS_ID and \
                 GOOGLE_SERVICE_ACCOUNT_FILE, or enable MOCK_SHEETS=1 for development"
            );
        }

        store
    }

    /// Build a store backed by Google Sheets
    pub async fn from_config(config: SheetsConfig) -> Self {
        Self::connect(config, Arc::new(GoogleSheetsConnector::new())).await
    }

    /// Build a store serving the given fixture data
    pub async fn mock(mock: MockSheets) -> Self {
        Self::connect_with_mock(
            SheetsConfig::mock(),
            Arc::new(GoogleSheetsConnector::new()),
            mock,
        )
        .await
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    /// Current connection state
    pub fn mode(&self) -> StoreMode {
        self.backend().mode()
    }

    /// Whether reads can reach data (mock or live-connected)
    pub fn is_initialized(&self) -> bool {
        matches!(self.mode(), StoreMode::Mock | StoreMode::LiveConnected)
    }

    fn backend(&self) -> Backend {
        self.backend
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_backend(&self, backend: Backend) {
        *self
            .backend
            .write()
            .unwrap_or_else(PoisonError::into_inner) = backend;
    }

    /// Run the initialization procedure again
    ///
    /// Returns whether a fresh client was established. When it fails, a
    /// previously connected client stays in place so later requests can
    /// still reach the spreadsheet.
    pub async fn reinitialize(&self) -> bool {
        tracing::info!("Reinitializing spreadsheet client");
        self.initialize().await
    }

    async fn initialize(&self) -> bool {
        let backend = self.establish().await;
        let ready = matches!(backend, Backend::Mock | Backend::Live(_));

        if !ready && matches!(self.backend(), Backend::Live(_)) {
            tracing::warn!("Reinitialization failed; keeping the previous spreadsheet client");
            return false;
        }

        self.set_backend(backend);
        ready
    }

    async fn establish(&self) -> Backend {
        if self.config.mock {
            tracing::info!("MOCK_SHEETS enabled: using in-memory mock data");
            return Backend::Mock;
        }

        let Some(spreadsheet_id) = self.config.spreadsheet_id() else {
            tracing::error!("Cannot open spreadsheet: no spreadsheet id configured");
            return Backend::Unavailable;
        };

        let key = match ServiceAccountKey::from_file(&self.config.credentials_file) {
            Ok(key) => key,
            Err(ConfigError::FileNotFound { path }) => {
                tracing::warn!(
                    path = %path,
                    "Service account file not found. Set MOCK_SHEETS=1 to run without Google Sheets"
                );
                return Backend::Unavailable;
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected service account credentials");
                return Backend::Unavailable;
            }
        };

        match self.connector.connect(&key, spreadsheet_id).await {
            Ok(client) => {
                tracing::info!(spreadsheet_id, "Spreadsheet client initialized");
                Backend::Live(client)
            }
            Err(e) => {
                tracing::error!(spreadsheet_id, error = %e, "Failed to initialize spreadsheet client");
                Backend::Unavailable
            }
        }
    }

    /// Fetch all orders, surfacing read failures
    ///
    /// A failed read of the Orders sheet triggers one reinitialization before
    /// the error is returned. An unconnected store yields an empty list.
    pub async fn try_fetch_orders(&self) -> StoreResult<Vec<Order>> {
        match self.backend() {
            Backend::Mock => self.mock.orders(),
            Backend::Live(client) => match client.read_rows(Sheet::Orders.name()).await {
                Ok(rows) => {
                    tracing::info!(records = rows.len(), "Retrieved order rows");
                    Ok(mapper::map_rows(&rows, Sheet::Orders, mapper::map_order))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Error accessing Orders sheet");
                    if !self.reinitialize().await {
                        tracing::error!("Failed to reinitialize spreadsheet client");
                    }
                    Err(e)
                }
            },
            Backend::Uninitialized | Backend::Unavailable => {
                tracing::warn!("No active spreadsheet connection");
                Ok(Vec::new())
            }
        }
    }

    /// Fetch all orders in sheet order, empty on any failure
    pub async fn fetch_orders(&self) -> Vec<Order> {
        self.try_fetch_orders().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Returning no orders");
            Vec::new()
        })
    }

    /// Fetch the first order with the given identifier
    ///
    /// Read failures are returned rather than reported as a missing order.
    pub async fn fetch_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        Ok(self
            .try_fetch_orders()
            .await?
            .into_iter()
            .find(|order| order.order_id == order_id))
    }

    /// Fetch orders and narrow them with a filter
    pub async fn find_orders(&self, filter: &OrderFilter) -> Vec<Order> {
        filter_orders(self.fetch_orders().await, filter)
    }

    /// Fetch the shirt, pants and other measurements of an order
    ///
    /// Each sheet is read independently; a sheet that fails leaves its slot
    /// empty without affecting the others.
    pub async fn fetch_measurements(&self, order_id: &str) -> OrderMeasurements {
        let client = match self.backend() {
            Backend::Mock => {
                return self.mock.measurements(order_id).unwrap_or_else(|e| {
                    tracing::error!(order_id, error = %e, "Failed to read mock measurements");
                    OrderMeasurements::default()
                });
            }
            Backend::Live(client) => client,
            Backend::Uninitialized | Backend::Unavailable => {
                tracing::warn!(order_id, "No active spreadsheet connection");
                return OrderMeasurements::default();
            }
        };

        let mut measurements = OrderMeasurements::default();
        for kind in GarmentKind::ALL {
            match find_measurement(client.as_ref(), kind, order_id).await {
                Ok(Some(measurement)) => {
                    tracing::debug!(order_id, sheet = %kind.sheet(), "Found measurements");
                    measurements.set(kind, Some(measurement));
                }
                Ok(None) => {
                    tracing::debug!(order_id, sheet = %kind.sheet(), "No measurements found");
                }
                Err(e) => {
                    tracing::error!(
                        order_id,
                        sheet = %kind.sheet(),
                        error = %e,
                        "Error fetching measurements"
                    );
                }
            }
        }

        measurements
    }
}

/// First row of the garment's sheet belonging to the order
async fn find_measurement(
    client: &dyn SheetsClient,
    kind: GarmentKind,
    order_id: &str,
) -> StoreResult<Option<Measurement>> {
    let rows = client.read_rows(kind.sheet().name()).await?;

    let Some(row) = rows
        .iter()
        .find(|row| mapper::row_matches_order(row, order_id))
    else {
        return Ok(None);
    };

    mapper::map_measurement(kind, row)
        .map(Some)
        .map_err(|e| StoreError::InvalidResponse {
            message: format!("malformed {} row for order {}: {}", kind.sheet(), order_id, e),
        })
}
