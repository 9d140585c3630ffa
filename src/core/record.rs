//! Typed order and measurement records
//!
//! These are the shapes the rest of the application works with. Rows coming
//! from the spreadsheet are converted into them by [`crate::core::mapper`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spreadsheet column headers
pub mod columns {
    pub const ORDER_ID: &str = "Order ID";
    pub const CUSTOMER_NAME: &str = "Customer Name";
    pub const CONTACT_INFO: &str = "Contact Info";
    pub const ADDRESS: &str = "Address";
    pub const CUSTOMER_TYPE: &str = "Customer Type";
    pub const GARMENT_TYPES: &str = "Garment Types";
    pub const ORDER_DATE: &str = "Order Date";
    pub const DELIVERY_DATE: &str = "Delivery Date";
    pub const DELIVERY_STATUS: &str = "Delivery Status";
    pub const PRICE: &str = "Price";
    pub const PAYMENT_STATUS: &str = "Payment Status";
    pub const SEASON: &str = "Season";
    pub const FESTIVAL: &str = "Festival";
    pub const NOTES: &str = "Notes";
    pub const CREATED_AT: &str = "Created At";

    pub const QUANTITY: &str = "Quantity";
    pub const FABRIC_METERS: &str = "Fabric Meters";
    pub const STATUS: &str = "Status";

    pub const CHEST: &str = "Chest";
    pub const SHOULDER: &str = "Shoulder";
    pub const SLEEVE_LENGTH: &str = "Sleeve Length";
    pub const SHIRT_LENGTH: &str = "Shirt Length";
    pub const NECK: &str = "Neck";
    pub const BICEP: &str = "Bicep";
    pub const BAJOO: &str = "Bajoo";

    pub const WAIST: &str = "Waist";
    pub const HIP: &str = "Hip";
    pub const INSEAM: &str = "Inseam";
    pub const OUTSEAM: &str = "Outseam";
    pub const THIGH: &str = "Thigh";
    pub const KNEE: &str = "Knee";
    pub const BOTTOM: &str = "Bottom";
}

/// Spreadsheet row number of the first data row (row 1 holds the headers)
pub const FIRST_DATA_ROW: usize = 2;

/// A named sheet of the backing spreadsheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sheet {
    Orders,
    Shirts,
    Pants,
    Others,
}

impl Sheet {
    /// Every sheet that carries a status column, in propagation order
    pub const ALL: [Sheet; 4] = [Sheet::Orders, Sheet::Shirts, Sheet::Pants, Sheet::Others];

    /// Tab name inside the spreadsheet
    pub fn name(&self) -> &'static str {
        match self {
            Sheet::Orders => "Orders",
            Sheet::Shirts => "Shirts",
            Sheet::Pants => "Pants",
            Sheet::Others => "Others",
        }
    }

    /// 1-based column holding the status this sheet tracks
    ///
    /// Orders: column I (Delivery Status). Shirts/Pants: column P (Status).
    /// Others: column J (Status).
    pub fn status_column(&self) -> usize {
        match self {
            Sheet::Orders => 9,
            Sheet::Shirts | Sheet::Pants => 16,
            Sheet::Others => 10,
        }
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Delivery status vocabulary accepted for updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Pending,
    #[serde(rename = "In Process")]
    InProcess,
    Ready,
    Delivered,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 4] = [
        DeliveryStatus::Pending,
        DeliveryStatus::InProcess,
        DeliveryStatus::Ready,
        DeliveryStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::InProcess => "In Process",
            DeliveryStatus::Ready => "Ready",
            DeliveryStatus::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown delivery status '{}'", s))
    }
}

/// A customer's garment commission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub customer_name: String,
    pub contact_info: String,
    pub address: String,
    pub customer_type: String,
    /// Comma-joined garment list, e.g. `"Shirt, Pants"`
    pub garment_types: String,
    pub order_date: String,
    pub delivery_date: String,
    pub delivery_status: String,
    pub price: f64,
    pub payment_status: String,
    pub season: String,
    pub festival: String,
    pub notes: String,
    pub created_at: String,
}

/// Garment kind of a measurement record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarmentKind {
    Shirt,
    Pants,
    Other,
}

impl GarmentKind {
    pub const ALL: [GarmentKind; 3] = [GarmentKind::Shirt, GarmentKind::Pants, GarmentKind::Other];

    /// Sheet holding measurements of this kind
    pub fn sheet(&self) -> Sheet {
        match self {
            GarmentKind::Shirt => Sheet::Shirts,
            GarmentKind::Pants => Sheet::Pants,
            GarmentKind::Other => Sheet::Others,
        }
    }
}

/// Shirt-specific sizes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShirtSizes {
    pub chest: f64,
    pub shoulder: f64,
    pub sleeve_length: f64,
    pub shirt_length: f64,
    pub neck: f64,
    pub bicep: f64,
    pub bajoo: f64,
}

/// Pant-specific sizes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PantSizes {
    pub waist: f64,
    pub hip: f64,
    pub inseam: f64,
    pub outseam: f64,
    pub thigh: f64,
    pub knee: f64,
    pub bottom: f64,
}

/// Garment-specific part of a measurement, discriminated by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GarmentSizes {
    Shirt(ShirtSizes),
    Pants(PantSizes),
    Other,
}

impl GarmentSizes {
    pub fn kind(&self) -> GarmentKind {
        match self {
            GarmentSizes::Shirt(_) => GarmentKind::Shirt,
            GarmentSizes::Pants(_) => GarmentKind::Pants,
            GarmentSizes::Other => GarmentKind::Other,
        }
    }
}

/// Sizing data for one garment of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Order this row belongs to (matched by value, not enforced)
    pub order_id: String,
    pub customer_name: String,
    pub address: String,
    pub order_date: String,
    pub delivery_date: String,
    pub quantity: u32,
    pub fabric_meters: f64,
    pub price: f64,
    pub status: String,
    pub notes: String,
    pub created_at: String,
    #[serde(flatten)]
    pub sizes: GarmentSizes,
}

impl Measurement {
    pub fn kind(&self) -> GarmentKind {
        self.sizes.kind()
    }

    pub fn shirt(&self) -> Option<&ShirtSizes> {
        match &self.sizes {
            GarmentSizes::Shirt(sizes) => Some(sizes),
            _ => None,
        }
    }

    pub fn pants(&self) -> Option<&PantSizes> {
        match &self.sizes {
            GarmentSizes::Pants(sizes) => Some(sizes),
            _ => None,
        }
    }
}

/// All measurements recorded for one order, at most one per garment kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderMeasurements {
    pub shirt: Option<Measurement>,
    pub pants: Option<Measurement>,
    pub others: Option<Measurement>,
}

impl OrderMeasurements {
    pub fn get(&self, kind: GarmentKind) -> Option<&Measurement> {
        match kind {
            GarmentKind::Shirt => self.shirt.as_ref(),
            GarmentKind::Pants => self.pants.as_ref(),
            GarmentKind::Other => self.others.as_ref(),
        }
    }

    pub fn set(&mut self, kind: GarmentKind, measurement: Option<Measurement>) {
        match kind {
            GarmentKind::Shirt => self.shirt = measurement,
            GarmentKind::Pants => self.pants = measurement,
            GarmentKind::Other => self.others = measurement,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shirt.is_none() && self.pants.is_none() && self.others.is_none()
    }
}
