//! Order filtering
//!
//! Filters are plain predicates combined with AND. Each one is independent of
//! the others, so the order in which they are applied never changes the result.

use crate::core::record::Order;
use serde::{Deserialize, Serialize};

/// Filter value meaning "do not filter on this field"
pub const ALL_SENTINEL: &str = "all";

/// Filter parameters for listing orders
///
/// Extracted from URL query strings by the REST layer. Every field is
/// optional; an absent, empty or `"all"` value bypasses the filter.
///
/// # Example
/// ```text
/// GET /api/orders?status=pending&garment_type=shirt&search=asha
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderFilter {
    /// Exact, case-insensitive match against the delivery status
    pub status: Option<String>,

    /// Case-insensitive substring match against the garment list
    pub garment_type: Option<String>,

    /// Case-insensitive substring match against customer name, address or order ID
    pub search: Option<String>,
}

impl OrderFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_garment_type(mut self, garment_type: impl Into<String>) -> Self {
        self.garment_type = Some(garment_type.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// The active predicates, with bypass values removed
    pub fn predicates(&self) -> Vec<OrderPredicate> {
        let mut predicates = Vec::new();

        if let Some(status) = selective(self.status.as_deref(), true) {
            predicates.push(OrderPredicate::Status(status));
        }
        if let Some(garment) = selective(self.garment_type.as_deref(), true) {
            predicates.push(OrderPredicate::GarmentType(garment));
        }
        if let Some(term) = selective(self.search.as_deref(), false) {
            predicates.push(OrderPredicate::Search(term));
        }

        predicates
    }

    /// Whether every active predicate bypasses
    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// Whether a single order passes every active predicate
    pub fn matches(&self, order: &Order) -> bool {
        self.predicates().iter().all(|p| p.matches(order))
    }

    /// Keep the orders that pass, preserving their relative order
    pub fn apply(&self, orders: Vec<Order>) -> Vec<Order> {
        apply_predicates(orders, &self.predicates())
    }
}

/// Lowercased filter value, or `None` when it should bypass
fn selective(value: Option<&str>, honours_all: bool) -> Option<String> {
    let value = value?;
    if value.is_empty() || (honours_all && value.eq_ignore_ascii_case(ALL_SENTINEL)) {
        return None;
    }
    Some(value.to_lowercase())
}

/// A single order predicate holding an already-lowercased needle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderPredicate {
    Status(String),
    GarmentType(String),
    Search(String),
}

impl OrderPredicate {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderPredicate::Status(status) => order.delivery_status.to_lowercase() == *status,
            OrderPredicate::GarmentType(garment) => {
                order.garment_types.to_lowercase().contains(garment.as_str())
            }
            OrderPredicate::Search(term) => {
                order.customer_name.to_lowercase().contains(term.as_str())
                    || order.address.to_lowercase().contains(term.as_str())
                    || order.order_id.to_lowercase().contains(term.as_str())
            }
        }
    }
}

/// Apply predicates one after another
pub fn apply_predicates(orders: Vec<Order>, predicates: &[OrderPredicate]) -> Vec<Order> {
    let mut remaining = orders;
    for predicate in predicates {
        remaining.retain(|order| predicate.matches(order));
        tracing::debug!(?predicate, remaining = remaining.len(), "Applied order filter");
    }
    remaining
}

/// Filter a list of orders
pub fn filter_orders(orders: Vec<Order>, filter: &OrderFilter) -> Vec<Order> {
    let initial = orders.len();
    let filtered = filter.apply(orders);
    tracing::info!(
        initial,
        returned = filtered.len(),
        ?filter,
        "Filtered orders"
    );
    filtered
}
