//! Delivery-status propagation across the order sheets
//!
//! A status change is written to the Orders, Shirts, Pants and Others sheets
//! independently. There is no atomicity across sheets: each one reports its
//! own outcome and a failure in one never stops the others.

use super::{Backend, SheetStore};
use crate::core::error::{StoreError, StoreResult};
use crate::core::mapper;
use crate::core::record::{FIRST_DATA_ROW, Sheet};
use crate::core::service::SheetsClient;
use serde::Serialize;

/// What happened to one sheet during a status update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SheetOutcome {
    /// The status cell of this 1-based row was overwritten
    Updated { row: usize },
    /// No row in the sheet carries the order identifier
    NotFound,
    /// Reading or writing the sheet failed
    Failed { error: String },
}

/// Outcome for a single sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetUpdate {
    pub sheet: Sheet,
    #[serde(flatten)]
    pub outcome: SheetOutcome,
    /// Whether the write was retried after re-authenticating
    pub retried: bool,
}

impl SheetUpdate {
    fn new(sheet: Sheet, outcome: SheetOutcome, retried: bool) -> Self {
        Self {
            sheet,
            outcome,
            retried,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self.outcome, SheetOutcome::Updated { .. })
    }
}

/// Aggregated result of a status update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdateReport {
    pub order_id: String,
    pub status: String,
    pub sheets: Vec<SheetUpdate>,
}

impl StatusUpdateReport {
    fn new(order_id: &str, status: &str) -> Self {
        Self {
            order_id: order_id.to_string(),
            status: status.to_string(),
            sheets: Vec::new(),
        }
    }

    /// True when at least one sheet was updated
    pub fn updated(&self) -> bool {
        self.sheets.iter().any(SheetUpdate::is_updated)
    }

    /// The outcome recorded for a sheet, if it was attempted
    pub fn outcome(&self, sheet: Sheet) -> Option<&SheetOutcome> {
        self.sheets
            .iter()
            .find(|update| update.sheet == sheet)
            .map(|update| &update.outcome)
    }
}

impl From<StoreResult<Option<usize>>> for SheetOutcome {
    fn from(result: StoreResult<Option<usize>>) -> Self {
        match result {
            Ok(Some(row)) => SheetOutcome::Updated { row },
            Ok(None) => SheetOutcome::NotFound,
            Err(e) => SheetOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

impl SheetStore {
    /// Set the delivery status of an order in every sheet that holds it
    ///
    /// Returns whether at least one sheet was updated. The status value is
    /// written as given; validating it is up to the caller.
    pub async fn update_status(&self, order_id: &str, status: &str) -> bool {
        self.update_status_report(order_id, status).await.updated()
    }

    /// Like [`update_status`](Self::update_status), with per-sheet outcomes
    pub async fn update_status_report(&self, order_id: &str, status: &str) -> StatusUpdateReport {
        tracing::info!(order_id, status, "Updating delivery status");
        let mut report = StatusUpdateReport::new(order_id, status);

        match self.backend() {
            Backend::Mock => {
                let outcome = SheetOutcome::from(self.mock.set_delivery_status(order_id, status));
                report
                    .sheets
                    .push(SheetUpdate::new(Sheet::Orders, outcome, false));
            }
            Backend::Live(_) => {
                for sheet in Sheet::ALL {
                    let update = self.propagate_to(sheet, order_id, status).await;
                    match &update.outcome {
                        SheetOutcome::Updated { row } => {
                            tracing::info!(order_id, sheet = %sheet, row, "Updated status");
                        }
                        SheetOutcome::NotFound => {
                            tracing::info!(order_id, sheet = %sheet, "No matching record");
                        }
                        SheetOutcome::Failed { error } => {
                            tracing::error!(order_id, sheet = %sheet, error = %error, "Status update failed");
                        }
                    }
                    report.sheets.push(update);
                }
            }
            Backend::Uninitialized | Backend::Unavailable => {
                tracing::error!(order_id, "No active spreadsheet connection");
                return report;
            }
        }

        if report.updated() {
            tracing::info!(order_id, "Updated one or more sheets");
        } else {
            tracing::warn!(order_id, "No sheets were updated");
        }

        report
    }

    /// Write to one sheet, re-authenticating and retrying once on a
    /// credential failure
    async fn propagate_to(&self, sheet: Sheet, order_id: &str, status: &str) -> SheetUpdate {
        let err = match self.write_current(sheet, order_id, status).await {
            Err(e) if e.is_auth_failure() => e,
            result => return SheetUpdate::new(sheet, result.into(), false),
        };

        tracing::warn!(sheet = %sheet, error = %err, "Credential failure, reinitializing client");
        if !self.reinitialize().await {
            tracing::error!(sheet = %sheet, "Failed to reinitialize spreadsheet client");
            let outcome = SheetOutcome::Failed {
                error: format!("reinitialization failed after: {}", err),
            };
            return SheetUpdate::new(sheet, outcome, true);
        }

        tracing::info!(sheet = %sheet, "Retrying status update after reinitialization");
        let result = self.write_current(sheet, order_id, status).await;
        SheetUpdate::new(sheet, result.into(), true)
    }

    /// Write through whichever client is current, so a retry picks up the
    /// client built by the reinitialization
    async fn write_current(
        &self,
        sheet: Sheet,
        order_id: &str,
        status: &str,
    ) -> StoreResult<Option<usize>> {
        match self.backend() {
            Backend::Live(client) => write_status(client.as_ref(), sheet, order_id, status).await,
            _ => Err(StoreError::Unavailable {
                reason: "no active spreadsheet connection".to_string(),
            }),
        }
    }
}

/// Overwrite the status cell of the first row carrying the order identifier
///
/// Returns the 1-based row written, or `None` when the order is absent.
async fn write_status(
    client: &dyn SheetsClient,
    sheet: Sheet,
    order_id: &str,
    status: &str,
) -> StoreResult<Option<usize>> {
    let rows = client.read_rows(sheet.name()).await?;

    let Some(index) = rows
        .iter()
        .position(|row| mapper::row_matches_order(row, order_id))
    else {
        return Ok(None);
    };

    let row = index + FIRST_DATA_ROW;
    client
        .update_cell(sheet.name(), row, sheet.status_column(), status)
        .await?;

    Ok(Some(row))
}
