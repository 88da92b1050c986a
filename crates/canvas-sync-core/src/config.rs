//! Configuration module for canvas-sync.
//!
//! Provides the typed configuration that maps to `canvas-sync.yml`, with
//! loading, environment overrides, validation, defaults, and a builder for
//! programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "canvas-sync.yml";

/// Environment variable that overrides `token`.
pub const TOKEN_ENV_VAR: &str = "CANVAS_SYNC_TOKEN";

/// Default location of the change cache, relative to the sync root.
pub const DEFAULT_CACHE_PATH: &str = ".canvas-sync/state.db";

// ---------------------------------------------------------------------------
// Config struct
// ---------------------------------------------------------------------------

/// Top-level configuration for canvas-sync.
///
/// Keys are snake_case; the all-lowercase spellings accepted by older
/// configuration files (`courseid`, `workercount`, `usemodules`) are
/// accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Numeric id of the course to mirror.
    #[serde(alias = "courseid")]
    pub course_id: i64,
    /// Number of parallel transfers.
    #[serde(alias = "workercount")]
    pub worker_count: usize,
    /// Static bearer token for the Canvas API.
    pub token: String,
    /// Base URL of the Canvas instance, e.g. `https://canvas.example.edu`.
    pub host: String,
    /// List files through course modules instead of the files API.
    #[serde(alias = "usemodules")]
    pub use_modules: bool,
    /// Page size sent as `per_page`; server default when absent.
    pub per_page: Option<u32>,
    /// Destination root. Defaults to the directory holding the config file.
    pub root: Option<PathBuf>,
    /// Change cache database, relative to the sync root unless absolute.
    pub cache_path: PathBuf,
    pub logging: LoggingConfig,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            course_id: 0,
            worker_count: 4,
            token: String::new(),
            host: String::new(),
            use_modules: false,
            per_page: None,
            root: None,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            logging: LoggingConfig::default(),
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
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    ///
    /// Applies environment overrides and, when `root` is unset, anchors the
    /// sync root at the config file's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env_overrides();
        if config.root.is_none() {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            config.root = Some(dir.to_path_buf());
        }
        Ok(config)
    }

    /// Parse configuration from YAML text without touching the environment.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.is_empty() {
                self.token = token;
            }
        }
    }

    /// Directory the remote tree is mirrored into.
    pub fn sync_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Absolute-or-root-relative path of the change cache database.
    pub fn cache_file(&self) -> PathBuf {
        if self.cache_path.is_absolute() {
            self.cache_path.clone()
        } else {
            self.sync_root().join(&self.cache_path)
        }
    }

    /// Copy of this configuration safe to print (token masked).
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.token.is_empty() {
            copy.token = "********".to_string();
        }
        copy
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field, e.g. `"worker_count"`.
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

/// Upper bound for `worker_count`.
const MAX_WORKERS: usize = 64;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.course_id <= 0 {
            errors.push(ValidationError {
                field: "course_id".into(),
                message: "must be a positive course id".into(),
            });
        }
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            errors.push(ValidationError {
                field: "worker_count".into(),
                message: format!("must be in range 1..={MAX_WORKERS}"),
            });
        }
        if self.token.trim().is_empty() {
            errors.push(ValidationError {
                field: "token".into(),
                message: format!("must not be empty (set it in the file or via {TOKEN_ENV_VAR})"),
            });
        }
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            errors.push(ValidationError {
                field: "host".into(),
                message: format!("must be an absolute http(s) URL, got '{}'", self.host),
            });
        }
        if self.per_page == Some(0) {
            errors.push(ValidationError {
                field: "per_page".into(),
                message: "must be greater than 0 when set".into(),
            });
        }
        if self.cache_path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "cache_path".into(),
                message: "must not be empty".into(),
            });
        }
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }

    /// Like [`validate`](Self::validate), folding every error into one
    pub fn ensure_valid(&self) -> Result<(), DomainError> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        Err(DomainError::Validation(details.join("; ")))
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
/// ```rust
/// use canvas_sync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .course_id(1234)
///     .host("https://canvas.example.edu")
///     .token("secret")
///     .worker_count(8)
///     .build();
/// assert!(config.validate().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn course_id(mut self, id: i64) -> Self {
        self.config.course_id = id;
        self
    }

    pub fn worker_count(mut self, n: usize) -> Self {
        self.config.worker_count = n;
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn use_modules(mut self, enabled: bool) -> Self {
        self.config.use_modules = enabled;
        self
    }

    pub fn per_page(mut self, n: u32) -> Self {
        self.config.per_page = Some(n);
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = Some(root.into());
        self
    }

    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cache_path = path.into();
        self
    }

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
