//! Configuration loading and management

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable enabling the in-memory fixture backend
pub const ENV_MOCK: &str = "MOCK_SHEETS";
/// Environment variable holding the spreadsheet identifier
pub const ENV_SPREADSHEET_ID: &str = "GOOGLE_SHEETS_ID";
/// Environment variable holding the service-account key path
pub const ENV_CREDENTIALS_FILE: &str = "GOOGLE_SERVICE_ACCOUNT_FILE";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_CREDENTIALS_FILE: &str = "service-account.json";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Settings for the sheet store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Serve fixture data instead of reaching the spreadsheet
    #[serde(default)]
    pub mock: bool,

    /// Identifier of the target spreadsheet
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// Path to the service-account key
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Listen address for the HTTP exposure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from(DEFAULT_CREDENTIALS_FILE)
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            mock: false,
            spreadsheet_id: None,
            credentials_file: default_credentials_file(),
            server: ServerConfig::default(),
        }
    }
}

/// Interpret a boolean toggle the way the deployment scripts set it
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl SheetsConfig {
    /// Configuration that serves the in-memory fixture
    pub fn mock() -> Self {
        Self {
            mock: true,
            ..Self::default()
        }
    }

    /// Configuration for a live spreadsheet
    pub fn live(spreadsheet_id: impl Into<String>, credentials_file: impl Into<PathBuf>) -> Self {
        Self {
            spreadsheet_id: Some(spreadsheet_id.into()),
            credentials_file: credentials_file.into(),
            ..Self::default()
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Lets callers (and tests) supply variables without touching the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            mock: lookup(ENV_MOCK).is_some_and(|v| parse_flag(&v)),
            spreadsheet_id: lookup(ENV_SPREADSHEET_ID),
            ..Self::default()
        };

        if let Some(path) = lookup(ENV_CREDENTIALS_FILE) {
            config.credentials_file = PathBuf::from(path);
        }
        if let Some(host) = lookup(ENV_HOST) {
            config.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_PORT.to_string(),
                value: port.clone(),
                message: "expected a TCP port number".to_string(),
            })?;
        }

        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => e.into(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The spreadsheet identifier, if one is set and non-blank
    pub fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// A Google service-account key
///
/// Only the fields needed to mint an access token are kept.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Read and validate a key file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = path.display().to_string();

        if !path.exists() {
            return Err(ConfigError::FileNotFound { path: file });
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, Some(file))
    }

    /// Validate a key held in memory
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::parse(json, None)
    }

    fn parse(json: &str, file: Option<String>) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError {
                file: file.clone(),
                message: e.to_string(),
            })?;

        for field in ["client_email", "private_key"] {
            let present = value
                .get(field)
                .and_then(|v| v.as_str())
                .is_some_and(|v| !v.trim().is_empty());
            if !present {
                return Err(ConfigError::InvalidCredentials {
                    file,
                    message: format!("missing '{}'", field),
                });
            }
        }

        serde_json::from_value(value).map_err(|e| ConfigError::InvalidCredentials {
            file,
            message: e.to_string(),
        })
    }
}
