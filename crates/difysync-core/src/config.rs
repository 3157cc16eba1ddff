//! Configuration module for difysync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, discovery, validation, defaults, and a builder pattern for
//! programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for difysync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dify: DifyConfig,
    pub watch: WatchConfig,
    pub logging: LoggingConfig,
}

/// Knowledge-base service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifyConfig {
    /// Base URL of the Dify deployment, without the `/v1` suffix.
    pub base_url: String,
    /// Dataset API key, sent as a bearer token.
    pub api_key: String,
    /// Permission for newly created datasets: `only_me`, `all_team_members`, or `partial_members`.
    pub dataset_permission: String,
    /// Indexing technique for new documents: `high_quality` or `economy`.
    pub indexing_technique: String,
    /// Page size used when listing datasets and documents.
    pub page_limit: u32,
}

/// Watched folder and trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Root of the local tree mirrored to the knowledge base.
    pub folder: PathBuf,
    /// Seconds between periodic passes.
    pub interval: u64,
    /// Seconds a changed path must stay quiet before it triggers a pass.
    pub debounce_delay: u64,
    /// Whether filesystem notifications trigger passes.
    pub notify: bool,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Default for DifyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            api_key: String::new(),
            dataset_permission: "only_me".to_string(),
            indexing_technique: "high_quality".to_string(),
            page_limit: 20,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::new(),
            interval: 300,
            debounce_delay: 2,
            notify: true,
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
// Loading and discovery
// ---------------------------------------------------------------------------

/// Locations checked by [`Config::discover`] before the per-user default.
const WELL_KNOWN_PATHS: &[&str] = &["config.yaml", "/app/config.yaml"];

impl Config {
    /// Load configuration from a YAML file at `path`.
    ///
    /// Missing sections and keys take their default values.
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
    /// Typically `$XDG_CONFIG_HOME/difysync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("difysync")
            .join("config.yaml")
    }

    /// Returns the first existing configuration file.
    ///
    /// Checks `./config.yaml`, then `/app/config.yaml`, then
    /// [`Config::default_path`].
    pub fn discover() -> Option<PathBuf> {
        WELL_KNOWN_PATHS
            .iter()
            .map(PathBuf::from)
            .chain(std::iter::once(Self::default_path()))
            .find(|candidate| candidate.is_file())
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"watch.interval"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid values for `dify.dataset_permission`.
const VALID_DATASET_PERMISSIONS: &[&str] = &["only_me", "all_team_members", "partial_members"];

/// Valid values for `dify.indexing_technique`.
const VALID_INDEXING_TECHNIQUES: &[&str] = &["high_quality", "economy"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- dify ---
        match url::Url::parse(&self.dify.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::new(
                "dify.base_url",
                format!("unsupported scheme '{}', expected http or https", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(
                "dify.base_url",
                format!("invalid URL '{}': {e}", self.dify.base_url),
            )),
        }
        if self.dify.api_key.trim().is_empty() {
            errors.push(ValidationError::new("dify.api_key", "must not be empty"));
        }
        if !VALID_DATASET_PERMISSIONS.contains(&self.dify.dataset_permission.as_str()) {
            errors.push(ValidationError::new(
                "dify.dataset_permission",
                format!(
                    "invalid permission '{}', expected one of: {}",
                    self.dify.dataset_permission,
                    VALID_DATASET_PERMISSIONS.join(", ")
                ),
            ));
        }
        if !VALID_INDEXING_TECHNIQUES.contains(&self.dify.indexing_technique.as_str()) {
            errors.push(ValidationError::new(
                "dify.indexing_technique",
                format!(
                    "invalid indexing technique '{}', expected one of: {}",
                    self.dify.indexing_technique,
                    VALID_INDEXING_TECHNIQUES.join(", ")
                ),
            ));
        }
        if !(1..=100).contains(&self.dify.page_limit) {
            errors.push(ValidationError::new(
                "dify.page_limit",
                "must be between 1 and 100",
            ));
        }

        // --- watch ---
        if self.watch.folder.as_os_str().is_empty() {
            errors.push(ValidationError::new("watch.folder", "must not be empty"));
        } else if !self.watch.folder.is_dir() {
            errors.push(ValidationError::new(
                "watch.folder",
                format!("directory does not exist: {}", self.watch.folder.display()),
            ));
        }
        if self.watch.interval == 0 {
            errors.push(ValidationError::new(
                "watch.interval",
                "must be greater than 0",
            ));
        }
        if self.watch.debounce_delay == 0 {
            errors.push(ValidationError::new(
                "watch.debounce_delay",
                "must be greater than 0",
            ));
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError::new(
                "logging.level",
                format!(
                    "invalid log level '{}', expected one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Config`], starting from defaults.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder pre-populated with default values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- dify ---

    pub fn dify_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.dify.base_url = base_url.into();
        self
    }

    pub fn dify_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.dify.api_key = api_key.into();
        self
    }

    pub fn dify_dataset_permission(mut self, permission: impl Into<String>) -> Self {
        self.config.dify.dataset_permission = permission.into();
        self
    }

    pub fn dify_indexing_technique(mut self, technique: impl Into<String>) -> Self {
        self.config.dify.indexing_technique = technique.into();
        self
    }

    pub fn dify_page_limit(mut self, limit: u32) -> Self {
        self.config.dify.page_limit = limit;
        self
    }

    // --- watch ---

    pub fn watch_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.config.watch.folder = folder.into();
        self
    }

    pub fn watch_interval(mut self, seconds: u64) -> Self {
        self.config.watch.interval = seconds;
        self
    }

    pub fn watch_debounce_delay(mut self, seconds: u64) -> Self {
        self.config.watch.debounce_delay = seconds;
        self
    }

    pub fn watch_notify(mut self, notify: bool) -> Self {
        self.config.watch.notify = notify;
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
