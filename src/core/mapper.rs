//! Row-to-record mapping
//!
//! Spreadsheet data is edited by hand, so every field is coerced rather than
//! validated: missing text becomes `""`, missing or non-numeric numbers become
//! `0` (quantity becomes `1`). A row is only rejected when it has no order
//! identifier or when a numeric cell holds a negative or non-finite value.
//! Rejected rows are logged and skipped by [`map_rows`]; they never abort the
//! rest of the batch. Blank rows are skipped quietly.

use crate::core::field::{CellValue, Row};
use crate::core::record::{
    FIRST_DATA_ROW, GarmentKind, GarmentSizes, Measurement, Order, PantSizes, ShirtSizes, Sheet,
    columns,
};
use thiserror::Error;

/// Why a single row could not be turned into a record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("invalid number '{value}' in field '{field}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Text value of a column, `""` when absent
pub fn text(row: &Row, column: &str) -> String {
    row.get(column).map(CellValue::to_text).unwrap_or_default()
}

/// Non-negative decimal value of a column
///
/// Absent, blank or non-numeric cells yield `0.0`.
pub fn decimal(row: &Row, column: &'static str) -> Result<f64, RowError> {
    let Some(cell) = row.get(column) else {
        return Ok(0.0);
    };
    match cell.as_number() {
        None => Ok(0.0),
        Some(value) if !value.is_finite() || value < 0.0 => Err(RowError::InvalidNumber {
            field: column,
            value: cell.to_text(),
        }),
        Some(value) => Ok(value),
    }
}

/// Positive integer quantity, `1` when absent, blank, non-numeric or zero
pub fn quantity(row: &Row) -> Result<u32, RowError> {
    let Some(cell) = row.get(columns::QUANTITY) else {
        return Ok(1);
    };
    match cell.as_number() {
        None => Ok(1),
        Some(value) if !value.is_finite() || value < 0.0 => Err(RowError::InvalidNumber {
            field: columns::QUANTITY,
            value: cell.to_text(),
        }),
        Some(value) => Ok((value.trunc().min(u32::MAX as f64) as u32).max(1)),
    }
}

fn order_id(row: &Row) -> Result<String, RowError> {
    let id = text(row, columns::ORDER_ID);
    if id.trim().is_empty() {
        return Err(RowError::MissingField {
            field: columns::ORDER_ID,
        });
    }
    Ok(id)
}

/// Whether the row's `Order ID` cell equals `order_id` exactly
pub fn row_matches_order(row: &Row, order_id: &str) -> bool {
    row.get(columns::ORDER_ID)
        .is_some_and(|cell| cell.to_text() == order_id)
}

/// Map an Orders row
pub fn map_order(row: &Row) -> Result<Order, RowError> {
    Ok(Order {
        order_id: order_id(row)?,
        customer_name: text(row, columns::CUSTOMER_NAME),
        contact_info: text(row, columns::CONTACT_INFO),
        address: text(row, columns::ADDRESS),
        customer_type: text(row, columns::CUSTOMER_TYPE),
        garment_types: text(row, columns::GARMENT_TYPES),
        order_date: text(row, columns::ORDER_DATE),
        delivery_date: text(row, columns::DELIVERY_DATE),
        delivery_status: text(row, columns::DELIVERY_STATUS),
        price: decimal(row, columns::PRICE)?,
        payment_status: text(row, columns::PAYMENT_STATUS),
        season: text(row, columns::SEASON),
        festival: text(row, columns::FESTIVAL),
        notes: text(row, columns::NOTES),
        created_at: text(row, columns::CREATED_AT),
    })
}

/// Map a measurement row from the sheet of the given garment kind
pub fn map_measurement(kind: GarmentKind, row: &Row) -> Result<Measurement, RowError> {
    let sizes = match kind {
        GarmentKind::Shirt => GarmentSizes::Shirt(ShirtSizes {
            chest: decimal(row, columns::CHEST)?,
            shoulder: decimal(row, columns::SHOULDER)?,
            sleeve_length: decimal(row, columns::SLEEVE_LENGTH)?,
            shirt_length: decimal(row, columns::SHIRT_LENGTH)?,
            neck: decimal(row, columns::NECK)?,
            bicep: decimal(row, columns::BICEP)?,
            bajoo: decimal(row, columns::BAJOO)?,
        }),
        GarmentKind::Pants => GarmentSizes::Pants(PantSizes {
            waist: decimal(row, columns::WAIST)?,
            hip: decimal(row, columns::HIP)?,
            inseam: decimal(row, columns::INSEAM)?,
            outseam: decimal(row, columns::OUTSEAM)?,
            thigh: decimal(row, columns::THIGH)?,
            knee: decimal(row, columns::KNEE)?,
            bottom: decimal(row, columns::BOTTOM)?,
        }),
        GarmentKind::Other => GarmentSizes::Other,
    };

    Ok(Measurement {
        order_id: order_id(row)?,
        customer_name: text(row, columns::CUSTOMER_NAME),
        address: text(row, columns::ADDRESS),
        order_date: text(row, columns::ORDER_DATE),
        delivery_date: text(row, columns::DELIVERY_DATE),
        quantity: quantity(row)?,
        fabric_meters: decimal(row, columns::FABRIC_METERS)?,
        price: decimal(row, columns::PRICE)?,
        status: text(row, columns::STATUS),
        notes: text(row, columns::NOTES),
        created_at: text(row, columns::CREATED_AT),
        sizes,
    })
}

/// Whether every cell of the row is empty or whitespace
pub fn is_blank_row(row: &Row) -> bool {
    row.values().all(CellValue::is_blank)
}

/// Map every row of a sheet, skipping the ones that fail
///
/// Blank rows are gaps left in the sheet, not data; they are skipped
/// without reaching `map`.
pub fn map_rows<T, F>(rows: &[Row], sheet: Sheet, map: F) -> Vec<T>
where
    F: Fn(&Row) -> Result<T, RowError>,
{
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if is_blank_row(row) {
            tracing::debug!(sheet = %sheet, row = index + FIRST_DATA_ROW, "Skipping blank row");
            continue;
        }

        match map(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    sheet = %sheet,
                    row = index + FIRST_DATA_ROW,
                    error = %e,
                    "Skipping malformed row"
                );
            }
        }
    }

    tracing::debug!(
        sheet = %sheet,
        rows = rows.len(),
        mapped = records.len(),
        "Mapped sheet rows"
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, CellValue)]) -> Row {
        cells
            .iter()
            .map(|(header, value)| (header.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_map_order_full_row() {
        let order = map_order(&row(&[
            ("Order ID", "ORD-7".into()),
            ("Customer Name", "Asha".into()),
            ("Contact Info", CellValue::Integer(9876543210)),
            ("Garment Types", "Shirt, Pants".into()),
            ("Delivery Status", "Pending".into()),
            ("Price", CellValue::Float(1250.5)),
        ]))
        .unwrap();

        assert_eq!(order.order_id, "ORD-7");
        assert_eq!(order.customer_name, "Asha");
        assert_eq!(order.contact_info, "9876543210");
        assert_eq!(order.garment_types, "Shirt, Pants");
        assert_eq!(order.price, 1250.5);
        assert_eq!(order.address, "");
        assert_eq!(order.festival, "");
    }

    #[test]
    fn test_numeric_identifier_renders_as_text() {
        let order = map_order(&row(&[("Order ID", CellValue::Float(1001.0))])).unwrap();
        assert_eq!(order.order_id, "1001");
    }

    #[test]
    fn test_non_numeric_price_defaults_to_zero() {
        let order = map_order(&row(&[
            ("Order ID", "A".into()),
            ("Price", "call me".into()),
        ]))
        .unwrap();
        assert_eq!(order.price, 0.0);

        let order = map_order(&row(&[("Order ID", "A".into()), ("Price", "".into())])).unwrap();
        assert_eq!(order.price, 0.0);
    }

    #[test]
    fn test_negative_price_rejects_row() {
        let err = map_order(&row(&[
            ("Order ID", "A".into()),
            ("Price", CellValue::Integer(-5)),
        ]))
        .unwrap_err();

        assert_eq!(
            err,
            RowError::InvalidNumber {
                field: "Price",
                value: "-5".to_string()
            }
        );
    }

    #[test]
    fn test_missing_identifier_rejects_row() {
        let err = map_order(&row(&[("Customer Name", "Ravi".into())])).unwrap_err();
        assert_eq!(err, RowError::MissingField { field: "Order ID" });

        let err = map_order(&row(&[("Order ID", "  ".into())])).unwrap_err();
        assert_eq!(err, RowError::MissingField { field: "Order ID" });
    }

    #[test]
    fn test_quantity_defaults() {
        assert_eq!(quantity(&row(&[])), Ok(1));
        assert_eq!(quantity(&row(&[("Quantity", "".into())])), Ok(1));
        assert_eq!(quantity(&row(&[("Quantity", "two".into())])), Ok(1));
        assert_eq!(quantity(&row(&[("Quantity", CellValue::Integer(0))])), Ok(1));
        assert_eq!(quantity(&row(&[("Quantity", CellValue::Float(3.7))])), Ok(3));
        assert_eq!(quantity(&row(&[("Quantity", "4".into())])), Ok(4));
        assert!(quantity(&row(&[("Quantity", CellValue::Integer(-1))])).is_err());
    }

    #[test]
    fn test_map_shirt_measurement() {
        let measurement = map_measurement(
            GarmentKind::Shirt,
            &row(&[
                ("Order ID", "ORD-1".into()),
                ("Quantity", CellValue::Integer(2)),
                ("Fabric Meters", CellValue::Float(3.25)),
                ("Chest", CellValue::Integer(40)),
                ("Bajoo", "15.5".into()),
                ("Neck", "n/a".into()),
                ("Status", "Pending".into()),
            ]),
        )
        .unwrap();

        assert_eq!(measurement.kind(), GarmentKind::Shirt);
        assert_eq!(measurement.quantity, 2);
        assert_eq!(measurement.fabric_meters, 3.25);
        assert_eq!(measurement.status, "Pending");

        let sizes = measurement.shirt().unwrap();
        assert_eq!(sizes.chest, 40.0);
        assert_eq!(sizes.bajoo, 15.5);
        assert_eq!(sizes.neck, 0.0);
        assert_eq!(sizes.shoulder, 0.0);
    }

    #[test]
    fn test_map_pant_and_other_measurements() {
        let pants = map_measurement(
            GarmentKind::Pants,
            &row(&[("Order ID", "P".into()), ("Waist", CellValue::Integer(32))]),
        )
        .unwrap();
        assert_eq!(pants.pants().unwrap().waist, 32.0);

        let other = map_measurement(GarmentKind::Other, &row(&[("Order ID", "O".into())])).unwrap();
        assert_eq!(other.sizes, GarmentSizes::Other);
        assert_eq!(other.quantity, 1);
    }

    #[test]
    fn test_map_rows_skips_bad_rows() {
        let rows = vec![
            row(&[("Order ID", "A".into()), ("Price", CellValue::Integer(10))]),
            row(&[("Order ID", "".into())]),
            row(&[("Order ID", "B".into()), ("Price", CellValue::Integer(-1))]),
            row(&[("Order ID", "C".into())]),
        ];

        let orders = map_rows(&rows, Sheet::Orders, map_order);
        let ids: Vec<_> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[test]
    fn test_map_rows_skips_blank_rows_before_mapping() {
        let rows = vec![
            row(&[("Order ID", "A".into()), ("Customer Name", "Asha".into())]),
            row(&[("Order ID", "".into()), ("Customer Name", "  ".into())]),
            row(&[("Order ID", CellValue::Empty), ("Notes", CellValue::Empty)]),
            row(&[]),
            row(&[("Order ID", "B".into())]),
        ];

        let calls = std::cell::Cell::new(0);
        let orders = map_rows(&rows, Sheet::Orders, |r| {
            calls.set(calls.get() + 1);
            map_order(r)
        });

        let ids: Vec<_> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_blank_row_detection() {
        assert!(is_blank_row(&row(&[])));
        assert!(is_blank_row(&row(&[("Order ID", " ".into()), ("Price", CellValue::Empty)])));
        assert!(!is_blank_row(&row(&[("Order ID", "".into()), ("Price", CellValue::Integer(0))])));
        assert!(!is_blank_row(&row(&[("Notes", "x".into())])));
    }

    #[test]
    fn test_row_matching_is_exact() {
        let r = row(&[("Order ID", "ORD-1".into())]);
        assert!(row_matches_order(&r, "ORD-1"));
        assert!(!row_matches_order(&r, "ord-1"));
        assert!(!row_matches_order(&r, "ORD-1 "));
        assert!(!row_matches_order(&row(&[]), "ORD-1"));
    }
}
