//! Configuration module for IdSync.
//!
//! Typed configuration structs mapped to the YAML configuration file, with
//! loading, validation, defaults and a builder for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for IdSync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub directory: DirectoryConfig,
    pub sync: SyncConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Remote SCIM directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Base URL of the SCIM service, e.g. `https://tenant.example.com/scim`.
    pub base_url: String,
    /// Client id used as the Basic auth user name.
    pub client_id: Option<String>,
    /// Client secret used as the Basic auth password.
    pub client_secret: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Number of resources requested per list page.
    pub page_size: u32,
}

/// Reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between two reconciliation passes.
    pub interval_secs: u64,
    /// Skip local updates whose remote value equals the stored one.
    pub skip_unchanged: bool,
}

/// Local store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the SQLite database file.
    pub database_path: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/idsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("idsync")
            .join("config.yaml")
    }
}

impl DirectoryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            client_id: None,
            client_secret: None,
            request_timeout_secs: 30,
            page_size: 100,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            skip_unchanged: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("idsync")
                .join("idsync.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.interval_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `directory.page_size`.
const MAX_PAGE_SIZE: u32 = 1000;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- directory ---
        if self.directory.base_url.trim().is_empty() {
            errors.push(ValidationError {
                field: "directory.base_url".into(),
                message: "must be set".into(),
            });
        } else {
            match url::Url::parse(&self.directory.base_url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => errors.push(ValidationError {
                    field: "directory.base_url".into(),
                    message: format!("unsupported scheme '{}', expected http or https", parsed.scheme()),
                }),
                Err(e) => errors.push(ValidationError {
                    field: "directory.base_url".into(),
                    message: format!("not a valid URL: {e}"),
                }),
            }
        }
        if self.directory.client_id.is_some() && self.directory.client_secret.is_none() {
            errors.push(ValidationError {
                field: "directory.client_secret".into(),
                message: "must be set when client_id is set".into(),
            });
        }
        if self.directory.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "directory.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.directory.page_size == 0 {
            errors.push(ValidationError {
                field: "directory.page_size".into(),
                message: "must be greater than 0".into(),
            });
        } else if self.directory.page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError {
                field: "directory.page_size".into(),
                message: format!("must not exceed {MAX_PAGE_SIZE}"),
            });
        }

        // --- sync ---
        if self.sync.interval_secs == 0 {
            errors.push(ValidationError {
                field: "sync.interval_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- store ---
        if self.store.database_path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "store.database_path".into(),
                message: "must be set".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}', expected one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use idsync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .directory_base_url("https://tenant.example.com/scim")
///     .sync_interval_secs(120)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- directory ---

    pub fn directory_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.directory.base_url = url.into();
        self
    }

    pub fn directory_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.config.directory.client_id = Some(client_id.into());
        self.config.directory.client_secret = Some(client_secret.into());
        self
    }

    pub fn directory_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.directory.request_timeout_secs = seconds;
        self
    }

    pub fn directory_page_size(mut self, size: u32) -> Self {
        self.config.directory.page_size = size;
        self
    }

    // --- sync ---

    pub fn sync_interval_secs(mut self, seconds: u64) -> Self {
        self.config.sync.interval_secs = seconds;
        self
    }

    pub fn sync_skip_unchanged(mut self, skip: bool) -> Self {
        self.config.sync.skip_unchanged = skip;
        self
    }

    // --- store ---

    pub fn store_database_path(mut self, path: PathBuf) -> Self {
        self.config.store.database_path = path;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
