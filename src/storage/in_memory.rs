//! In-memory fixture backend for development without credentials

use crate::core::error::{StoreError, StoreResult};
use crate::core::record::{FIRST_DATA_ROW, Order, OrderMeasurements};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Identifier of the single fixture order
pub const MOCK_ORDER_ID: &str = "MOCK001";

/// The fixture order served in mock mode
pub fn fixture_order() -> Order {
    Order {
        order_id: MOCK_ORDER_ID.to_string(),
        customer_name: "Test Customer".to_string(),
        contact_info: "0000000000".to_string(),
        address: "123 Demo St".to_string(),
        customer_type: "regular".to_string(),
        garment_types: "Shirt, Pants".to_string(),
        delivery_status: "Pending".to_string(),
        price: 0.0,
        payment_status: "Unpaid".to_string(),
        ..Default::default()
    }
}

/// In-memory stand-in for the spreadsheet
///
/// There is a single source of truth here, so status updates touch the order
/// record directly instead of fanning out across sheets. Uses RwLock for
/// thread-safe access.
#[derive(Clone)]
pub struct MockSheets {
    orders: Arc<RwLock<Vec<Order>>>,
    measurements: Arc<RwLock<HashMap<String, OrderMeasurements>>>,
}

impl MockSheets {
    /// Create the fixture: one order with no measurements
    pub fn new() -> Self {
        let mut measurements = HashMap::new();
        measurements.insert(MOCK_ORDER_ID.to_string(), OrderMeasurements::default());
        Self::with_data(vec![fixture_order()], measurements)
    }

    /// Create a mock backend serving the given records
    pub fn with_data(orders: Vec<Order>, measurements: HashMap<String, OrderMeasurements>) -> Self {
        Self {
            orders: Arc::new(RwLock::new(orders)),
            measurements: Arc::new(RwLock::new(measurements)),
        }
    }

    pub fn orders(&self) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().map_err(|e| StoreError::Lock {
            message: e.to_string(),
        })?;

        Ok(orders.clone())
    }

    pub fn measurements(&self, order_id: &str) -> StoreResult<OrderMeasurements> {
        let measurements = self.measurements.read().map_err(|e| StoreError::Lock {
            message: e.to_string(),
        })?;

        Ok(measurements.get(order_id).cloned().unwrap_or_default())
    }

    /// Set the delivery status of every order with the given identifier
    ///
    /// Returns the row the first match would occupy in a sheet, or `None`
    /// when nothing matched.
    pub fn set_delivery_status(&self, order_id: &str, status: &str) -> StoreResult<Option<usize>> {
        let mut orders = self.orders.write().map_err(|e| StoreError::Lock {
            message: e.to_string(),
        })?;

        let mut first = None;
        for (index, order) in orders.iter_mut().enumerate() {
            if order.order_id == order_id {
                order.delivery_status = status.to_string();
                first.get_or_insert(index + FIRST_DATA_ROW);
            }
        }

        Ok(first)
    }
}

impl Default for MockSheets {
    fn default() -> Self {
        Self::new()
    }
}
