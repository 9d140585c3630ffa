//! Google Sheets implementation of SheetsConnector and SheetsClient
//!
//! Authentication uses the service-account JWT bearer grant: a signed
//! assertion is exchanged for an access token once per connection. When the
//! token expires, the API answers 401 and the store reconnects.

use crate::config::ServiceAccountKey;
use crate::core::error::{StoreError, StoreResult};
use crate::core::field::{CellValue, Row};
use crate::core::service::{SheetsClient, SheetsConnector};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Connects to Google Sheets with a service-account key
#[derive(Clone)]
pub struct GoogleSheetsConnector {
    http: Client,
    api_base: String,
}

impl GoogleSheetsConnector {
    pub fn new() -> Self {
        Self::with_api_base(SHEETS_API_BASE)
    }

    /// Point the connector at another API root (e.g. a local emulator)
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn access_token(&self, key: &ServiceAccountKey) -> StoreResult<String> {
        let assertion = sign_assertion(key, Utc::now().timestamp())?;

        let response = self
            .http
            .post(&key.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_token_error(status.as_u16(), &body));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

impl Default for GoogleSheetsConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SheetsConnector for GoogleSheetsConnector {
    async fn connect(
        &self,
        key: &ServiceAccountKey,
        spreadsheet_id: &str,
    ) -> StoreResult<Arc<dyn SheetsClient>> {
        let token = self.access_token(key).await?;

        let client = GoogleSheetsClient {
            http: self.http.clone(),
            api_base: self.api_base.clone(),
            spreadsheet_id: spreadsheet_id.to_string(),
            token,
        };

        let metadata = client.metadata().await?;
        tracing::info!(
            spreadsheet_id,
            title = %metadata.title(),
            sheets = ?metadata.sheet_titles(),
            "Opened spreadsheet"
        );

        Ok(Arc::new(client))
    }
}

/// An authenticated handle on one spreadsheet
pub struct GoogleSheetsClient {
    http: Client,
    api_base: String,
    spreadsheet_id: String,
    token: String,
}

impl GoogleSheetsClient {
    fn url(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = Url::parse(&self.api_base).map_err(|e| StoreError::Transport {
            message: format!("invalid API base URL '{}': {}", self.api_base, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| StoreError::Transport {
                message: format!("API base URL '{}' cannot carry a path", self.api_base),
            })?
            .push(&self.spreadsheet_id)
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.bearer_auth(&self.token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_api_error(status.as_u16(), &body))
    }

    async fn metadata(&self) -> StoreResult<SpreadsheetMetadata> {
        let request = self.http.get(self.url(&[])?).query(&[(
            "fields",
            "spreadsheetId,properties.title,sheets.properties.title",
        )]);

        Ok(self.send(request).await?.json().await?)
    }
}

#[async_trait]
impl SheetsClient for GoogleSheetsClient {
    async fn read_rows(&self, sheet: &str) -> StoreResult<Vec<Row>> {
        let range = quote_sheet(sheet);
        let request = self
            .http
            .get(self.url(&["values", range.as_str()])?)
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("dateTimeRenderOption", "FORMATTED_STRING"),
            ]);

        let response = self
            .send(request)
            .await
            .map_err(|e| missing_sheet(e, sheet))?;
        let values: ValueRange = response.json().await?;

        Ok(values_to_rows(values.values))
    }

    async fn update_cell(
        &self,
        sheet: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> StoreResult<()> {
        let range = format!("{}!{}{}", quote_sheet(sheet), column_letters(column), row);
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[value]],
        });

        let request = self
            .http
            .put(self.url(&["values", range.as_str()])?)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body);

        self.send(request)
            .await
            .map_err(|e| missing_sheet(e, sheet))?;

        tracing::debug!(sheet, range = %range, "Updated cell");
        Ok(())
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    properties: Option<TitledProperties>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: TitledProperties,
}

#[derive(Deserialize)]
struct TitledProperties {
    #[serde(default)]
    title: String,
}

impl SpreadsheetMetadata {
    fn title(&self) -> &str {
        self.properties
            .as_ref()
            .map(|p| p.title.as_str())
            .unwrap_or_default()
    }

    fn sheet_titles(&self) -> Vec<&str> {
        self.sheets
            .iter()
            .map(|s| s.properties.title.as_str())
            .collect()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn sign_assertion(key: &ServiceAccountKey, now: i64) -> StoreResult<String> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let signing_key =
        EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            StoreError::Unauthenticated {
                message: format!("unusable private key: {}", e),
            }
        })?;

    jsonwebtoken::encode(&header, &claims, &signing_key).map_err(|e| {
        StoreError::Unauthenticated {
            message: format!("failed to sign assertion: {}", e),
        }
    })
}

/// Classify a failed token exchange
fn classify_token_error(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<TokenErrorBody>(body) {
        Ok(err) if status == 400 || status == 401 => StoreError::Unauthenticated {
            message: match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
        },
        _ if status == 401 => StoreError::Unauthenticated {
            message: body.to_string(),
        },
        _ => StoreError::Api {
            status,
            code: None,
            message: body.to_string(),
        },
    }
}

/// Classify a failed Sheets API call from its status and JSON error envelope
pub(crate) fn classify_api_error(status: u16, body: &str) -> StoreError {
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.status, envelope.error.message),
        Err(_) => (None, body.to_string()),
    };

    if status == StatusCode::UNAUTHORIZED.as_u16() || code.as_deref() == Some("UNAUTHENTICATED") {
        return StoreError::Unauthenticated { message };
    }

    StoreError::Api {
        status,
        code,
        message,
    }
}

/// The API reports an unknown tab as an unparsable range
fn missing_sheet(err: StoreError, sheet: &str) -> StoreError {
    let unknown_range = matches!(
        &err,
        StoreError::Api { status: 400, message, .. } if message.contains("Unable to parse range")
    );

    if unknown_range {
        StoreError::SheetNotFound {
            sheet: sheet.to_string(),
        }
    } else {
        err
    }
}

fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// A1-notation letters for a 1-based column index
pub fn column_letters(column: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = column;
    while remaining > 0 {
        let offset = (remaining - 1) % 26;
        letters.push((b'A' + offset as u8) as char);
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Convert a JSON cell from an unformatted value range
pub fn cell_from_json(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Boolean(b),
        Value::Number(n) => n
            .as_i64()
            .map(CellValue::Integer)
            .or_else(|| n.as_f64().map(CellValue::Float))
            .unwrap_or(CellValue::Empty),
        Value::String(s) => CellValue::Text(s),
        other => CellValue::Text(other.to_string()),
    }
}

/// Turn a row-major value range into header-keyed rows
///
/// The first row is the header. Short rows are padded with empty text and
/// columns with a blank header are dropped. Blank rows are kept so that
/// positions stay aligned with sheet row numbers.
pub fn values_to_rows(values: Vec<Vec<Value>>) -> Vec<Row> {
    let mut rows = values.into_iter();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };

    let headers: Vec<String> = header_row
        .into_iter()
        .map(|cell| cell_from_json(cell).to_text().trim().to_string())
        .collect();

    rows.map(|cells| {
        let mut cells = cells.into_iter();
        headers
            .iter()
            .map(|header| (header, cells.next()))
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| {
                let value = cell
                    .map(cell_from_json)
                    .unwrap_or_else(|| CellValue::Text(String::new()));
                (header.clone(), value)
            })
            .collect()
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(9), "I");
        assert_eq!(column_letters(10), "J");
        assert_eq!(column_letters(16), "P");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(52), "AZ");
    }

    #[test]
    fn test_quote_sheet() {
        assert_eq!(quote_sheet("Orders"), "'Orders'");
        assert_eq!(quote_sheet("Tailor's"), "'Tailor''s'");
    }

    #[test]
    fn test_values_to_rows() {
        let rows = values_to_rows(vec![
            vec![json!("Order ID"), json!("Price"), json!(""), json!("Notes")],
            vec![json!("A1"), json!(120), json!("ignored"), json!("rush")],
            vec![],
            vec![json!(1002), json!(99.5)],
        ]);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Order ID"], CellValue::Text("A1".to_string()));
        assert_eq!(rows[0]["Price"], CellValue::Integer(120));
        assert_eq!(rows[0]["Notes"], CellValue::Text("rush".to_string()));
        assert_eq!(rows[0].len(), 3);

        assert_eq!(rows[1]["Order ID"], CellValue::Text(String::new()));

        assert_eq!(rows[2]["Order ID"], CellValue::Integer(1002));
        assert_eq!(rows[2]["Price"], CellValue::Float(99.5));
        assert_eq!(rows[2]["Notes"], CellValue::Text(String::new()));
    }

    #[test]
    fn test_values_to_rows_empty_sheet() {
        assert!(values_to_rows(vec![]).is_empty());
        assert!(values_to_rows(vec![vec![json!("Order ID")]]).is_empty());
    }

    #[test]
    fn test_classify_api_error() {
        let body = r#"{"error": {"code": 401, "message": "Request had invalid authentication credentials.", "status": "UNAUTHENTICATED"}}"#;
        assert!(matches!(
            classify_api_error(401, body),
            StoreError::Unauthenticated { .. }
        ));

        let body = r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#;
        let err = classify_api_error(403, body);
        assert_eq!(
            err,
            StoreError::Api {
                status: 403,
                code: Some("PERMISSION_DENIED".to_string()),
                message: "The caller does not have permission".to_string(),
            }
        );
        assert!(!err.is_auth_failure());

        let err = classify_api_error(502, "<html>bad gateway</html>");
        assert!(matches!(err, StoreError::Api { status: 502, code: None, .. }));
    }

    #[test]
    fn test_missing_sheet_detection() {
        let err = classify_api_error(
            400,
            r#"{"error": {"code": 400, "message": "Unable to parse range: 'Shirts'", "status": "INVALID_ARGUMENT"}}"#,
        );
        assert_eq!(
            missing_sheet(err, "Shirts"),
            StoreError::SheetNotFound {
                sheet: "Shirts".to_string()
            }
        );
    }

    #[test]
    fn test_classify_token_error() {
        let err = classify_token_error(
            400,
            r#"{"error": "invalid_grant", "error_description": "Invalid JWT Signature."}"#,
        );
        assert!(err.is_auth_failure());
        assert!(err.to_string().contains("invalid_grant"));

        let err = classify_token_error(503, "unavailable");
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_unusable_private_key() {
        let key = ServiceAccountKey::from_json_str(
            r#"{"client_email": "svc@proj.iam.gserviceaccount.com", "private_key": "not a pem"}"#,
        )
        .unwrap();

        let err = sign_assertion(&key, 0).unwrap_err();
        assert!(err.is_auth_failure());
    }
}
