//! Typed error handling for the sheet store
//!
//! Errors are grouped by where they originate so that callers can tell a
//! missing configuration apart from a failing spreadsheet API.
//!
//! # Error Categories
//!
//! - [`StoreError`]: Errors raised by a spreadsheet backend
//! - [`ConfigError`]: Errors related to settings and credentials
//! - [`RowError`]: A single row could not be mapped to a record
//! - [`RequestError`]: Errors in an incoming HTTP request
//!
//! # Example
//!
//! ```rust,ignore
//! match store.try_fetch_orders().await {
//!     Ok(orders) => println!("{} orders", orders.len()),
//!     Err(e) if e.is_auth_failure() => eprintln!("credentials rejected: {}", e),
//!     Err(e) => eprintln!("store error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

pub use crate::core::mapper::RowError;

/// The main error type for the crate
#[derive(Debug)]
pub enum SheetsError {
    /// Spreadsheet backend errors
    Store(StoreError),

    /// Configuration errors
    Config(ConfigError),

    /// Row mapping errors
    Row(RowError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for SheetsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetsError::Store(e) => write!(f, "{}", e),
            SheetsError::Config(e) => write!(f, "{}", e),
            SheetsError::Row(e) => write!(f, "{}", e),
            SheetsError::Request(e) => write!(f, "{}", e),
            SheetsError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for SheetsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SheetsError::Store(e) => Some(e),
            SheetsError::Config(e) => Some(e),
            SheetsError::Row(e) => Some(e),
            SheetsError::Request(e) => Some(e),
            SheetsError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl SheetsError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SheetsError::Store(e) => e.status_code(),
            SheetsError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SheetsError::Row(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SheetsError::Request(e) => e.status_code(),
            SheetsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SheetsError::Store(e) => e.error_code(),
            SheetsError::Config(_) => "CONFIG_ERROR",
            SheetsError::Row(_) => "ROW_ERROR",
            SheetsError::Request(e) => e.error_code(),
            SheetsError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for SheetsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors raised by a spreadsheet backend
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No backend is connected
    Unavailable { reason: String },

    /// Credentials were rejected or have expired
    Unauthenticated { message: String },

    /// The named sheet does not exist in the spreadsheet
    SheetNotFound { sheet: String },

    /// The request never produced a response
    Transport { message: String },

    /// The API answered with an error status
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The API answered with a body that could not be understood
    InvalidResponse { message: String },

    /// An internal lock was poisoned
    Lock { message: String },
}

/// Error message fragments that indicate a credential problem
const AUTH_FAILURE_MARKERS: [&str; 4] = [
    "invalid credentials",
    "invalid_grant",
    "unauthenticated",
    "invalid authentication credentials",
];

impl StoreError {
    /// Whether re-authenticating could fix this error
    ///
    /// Structured variants are checked first; the message is only inspected
    /// for errors that carry no status code.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            StoreError::Unauthenticated { .. } => true,
            StoreError::Api { status: 401, .. } => true,
            StoreError::Api {
                code: Some(code), ..
            } if code == "UNAUTHENTICATED" => true,
            StoreError::Api { .. } => false,
            other => {
                let message = other.to_string().to_ascii_lowercase();
                AUTH_FAILURE_MARKERS
                    .iter()
                    .any(|marker| message.contains(marker))
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Lock { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Unavailable { .. } => "STORE_UNAVAILABLE",
            StoreError::Unauthenticated { .. } => "STORE_UNAUTHENTICATED",
            StoreError::SheetNotFound { .. } => "SHEET_NOT_FOUND",
            StoreError::Transport { .. } => "STORE_TRANSPORT_ERROR",
            StoreError::Api { .. } => "STORE_API_ERROR",
            StoreError::InvalidResponse { .. } => "STORE_INVALID_RESPONSE",
            StoreError::Lock { .. } => "STORE_LOCK_ERROR",
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable { reason } => {
                write!(f, "Spreadsheet store is unavailable: {}", reason)
            }
            StoreError::Unauthenticated { message } => {
                write!(f, "Invalid credentials: {}", message)
            }
            StoreError::SheetNotFound { sheet } => {
                write!(f, "Sheet '{}' not found", sheet)
            }
            StoreError::Transport { message } => {
                write!(f, "Spreadsheet request failed: {}", message)
            }
            StoreError::Api {
                status,
                code,
                message,
            } => match code {
                Some(code) => write!(f, "Spreadsheet API error {} ({}): {}", status, code, message),
                None => write!(f, "Spreadsheet API error {}: {}", status, message),
            },
            StoreError::InvalidResponse { message } => {
                write!(f, "Unexpected spreadsheet response: {}", message)
            }
            StoreError::Lock { message } => {
                write!(f, "Failed to acquire lock: {}", message)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for SheetsError {
    fn from(err: StoreError) -> Self {
        SheetsError::Store(err)
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors related to configuration and credentials
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A referenced file does not exist
    FileNotFound { path: String },

    /// Failed to parse a configuration or credentials file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// The credentials file is not a service-account key
    InvalidCredentials {
        file: Option<String>,
        message: String,
    },

    /// Invalid configuration value
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound { path } => {
                write!(f, "File not found: {}", path)
            }
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse configuration: {}", message)
                }
            }
            ConfigError::InvalidCredentials { file, message } => {
                if let Some(file) = file {
                    write!(f, "Invalid service account key '{}': {}", file, message)
                } else {
                    write!(f, "Invalid service account key: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(f, "Invalid value '{}' for '{}': {}", value, field, message)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for SheetsError {
    fn from(err: ConfigError) -> Self {
        SheetsError::Config(err)
    }
}

impl From<RowError> for SheetsError {
    fn from(err: RowError) -> Self {
        SheetsError::Row(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Clone, PartialEq)]
pub enum RequestError {
    /// Status outside the delivery status vocabulary
    InvalidStatus { value: String },

    /// The requested resource does not exist
    NotFound { resource: String, id: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidStatus { value } => {
                write!(
                    f,
                    "Invalid status '{}': expected one of Pending, In Process, Ready, Delivered",
                    value
                )
            }
            RequestError::NotFound { resource, id } => {
                write!(f, "{} '{}' not found", resource, id)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidStatus { .. } => StatusCode::BAD_REQUEST,
            RequestError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidStatus { .. } => "INVALID_STATUS",
            RequestError::NotFound { .. } => "NOT_FOUND",
        }
    }
}

impl From<RequestError> for SheetsError {
    fn from(err: RequestError) -> Self {
        SheetsError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            StoreError::Transport {
                message: err.to_string(),
            }
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Tests
// =============================================================================
