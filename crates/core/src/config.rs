//! Application configuration.
//!
//! Configuration is merged from three layers, later layers winning:
//! - Defaults
//! - The workspace YAML file (`.isa/config.yaml`)
//! - Environment variables, then command-line flags
//!
//! Tunables of the evidence pipeline itself (fusion weights, scoring deltas)
//! live in the evidence crate's own `evidence.yaml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default bound on concurrently running pipeline invocations in batch mode.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Default per-retriever timeout in milliseconds.
pub const DEFAULT_RETRIEVER_TIMEOUT_MS: u64 = 10_000;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .isa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Upper bound on concurrent pipeline runs (batch evaluation)
    pub max_concurrency: usize,

    /// Timeout applied to each retriever call
    pub retriever_timeout_ms: u64,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    workspace: Option<WorkspaceSection>,
    logging: Option<LoggingSection>,
    pipeline: Option<PipelineSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PipelineSection {
    #[serde(rename = "maxConcurrency")]
    max_concurrency: Option<usize>,

    #[serde(rename = "retrieverTimeoutMs")]
    retriever_timeout_ms: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            retriever_timeout_ms: DEFAULT_RETRIEVER_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, the workspace config
    /// file, and defaults.
    ///
    /// Environment variables:
    /// - `ISA_WORKSPACE`: Override workspace path
    /// - `ISA_CONFIG`: Path to config file
    /// - `ISA_MAX_CONCURRENCY`: Batch concurrency bound
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("ISA_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("ISA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.isa_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        if let Ok(raw) = std::env::var("ISA_MAX_CONCURRENCY") {
            config.max_concurrency = raw.parse().map_err(|e| {
                AppError::Config(format!("Invalid ISA_MAX_CONCURRENCY '{}': {}", raw, e))
            })?;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        if let Some(pipeline) = config_file.pipeline {
            if let Some(max) = pipeline.max_concurrency {
                result.max_concurrency = max;
            }
            if let Some(timeout) = pipeline.retriever_timeout_ms {
                result.retriever_timeout_ms = timeout;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment and file values.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Get the path to the .isa directory.
    pub fn isa_dir(&self) -> PathBuf {
        self.workspace.join(".isa")
    }

    /// Retriever timeout as a `Duration`.
    pub fn retriever_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.retriever_timeout_ms)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.max_concurrency == 0 {
            return Err(AppError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }

        if self.retriever_timeout_ms == 0 {
            return Err(AppError::Config(
                "retriever_timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
