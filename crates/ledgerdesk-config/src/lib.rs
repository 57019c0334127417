//! Configuration management for ledgerdesk
//!
//! Loads the console configuration from a YAML file: backend location,
//! credential lookup, pagination defaults, logging, and per-resource
//! definitions that extend or replace the built-in master-data catalog.

pub mod error;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Backend service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL every resource endpoint is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://thrive-be.app-dev.altru.id/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Bearer credential lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Literal token (discouraged; prefer the environment variable)
    #[serde(default)]
    pub token: Option<String>,
    /// Environment variable consulted before `token`
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: default_token_env(),
        }
    }
}

fn default_token_env() -> String {
    "LEDGERDESK_TOKEN".to_string()
}

impl AuthConfig {
    /// Resolve the bearer token: environment first, then the literal value.
    /// Blank values count as absent.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.token.clone().filter(|t| !t.trim().is_empty()))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Rows per rendered page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// `limit` sent to the server when fetching a collection
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            fetch_limit: default_fetch_limit(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_fetch_limit() -> usize {
    20
}

/// HTTP verb used for updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMethod {
    Put,
    Patch,
}

impl Default for UpdateMethod {
    fn default() -> Self {
        UpdateMethod::Put
    }
}

impl std::str::FromStr for UpdateMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "put" => Ok(UpdateMethod::Put),
            "patch" => Ok(UpdateMethod::Patch),
            _ => Err(format!("Invalid update method: {}", s)),
        }
    }
}

impl std::fmt::Display for UpdateMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateMethod::Put => write!(f, "PUT"),
            UpdateMethod::Patch => write!(f, "PATCH"),
        }
    }
}

/// How the local collection catches up after a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteSync {
    /// Merge the server's returned record into the collection
    Merge,
    /// Re-issue the last page request
    Refetch,
}

impl Default for WriteSync {
    fn default() -> Self {
        WriteSync::Merge
    }
}

impl std::str::FromStr for WriteSync {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" => Ok(WriteSync::Merge),
            "refetch" => Ok(WriteSync::Refetch),
            _ => Err(format!("Invalid write sync policy: {}", s)),
        }
    }
}

impl std::fmt::Display for WriteSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteSync::Merge => write!(f, "merge"),
            WriteSync::Refetch => write!(f, "refetch"),
        }
    }
}

/// One master-data resource as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Catalog key, e.g. "divisions"
    pub name: String,
    /// Display label
    #[serde(default)]
    pub label: Option<String>,
    /// Endpoint path relative to the base URL (defaults to `name`)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Identifier field used for edit/delete targeting
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Fields that must be non-empty before submit
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Initial values of a create draft
    #[serde(default)]
    pub defaults: serde_json::Map<String, serde_json::Value>,
    /// Columns rendered in the list view
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub update_method: UpdateMethod,
    #[serde(default)]
    pub write_sync: WriteSync,
}

fn default_id_field() -> String {
    "id".to_string()
}

impl ResourceDefinition {
    /// Endpoint path, falling back to the resource name
    pub fn endpoint_path(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(&self.name)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Additional or overriding resource definitions
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound { path: path.display().to_string() }
            } else {
                ConfigError::IoError { message: e.to_string() }
            }
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        let base_url = self.server.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "server.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.server.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.pagination.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if self.pagination.fetch_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.fetch_limit".to_string(),
                reason: "Fetch limit must be greater than 0".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        let mut seen = HashSet::new();
        for (index, resource) in self.resources.iter().enumerate() {
            if resource.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("resources[{}].name", index),
                    reason: "Resource name must not be empty".to_string(),
                });
            }
            if resource.id_field.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("resources[{}].id_field", index),
                    reason: "Identifier field must not be empty".to_string(),
                });
            }
            let endpoint = resource.endpoint_path();
            if endpoint.trim().is_empty() || endpoint.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue {
                    field: format!("resources[{}].endpoint", index),
                    reason: "Endpoint must be a non-empty path without whitespace".to_string(),
                });
            }
            if !seen.insert(resource.name.as_str()) {
                return Err(ConfigError::DuplicateResource { name: resource.name.clone() });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Find a configured resource definition by name
    pub fn resource(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.name == name)
    }
}

// ==================== Tests ====================
