//! # CLI Configuration
//!
//! Optional YAML file. Every field has a default, and command-line flags
//! override file values.
//!
//! ```yaml
//! log_filter: "orderflow_state=debug,info"
//! log_format: json
//! initial_email: "first@example.com"
//! observers: [tracing, recorder]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use orderflow_core::OrderflowError;

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Observers the `run` command attaches, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObserverKind {
    /// Log every snapshot through `tracing`.
    Tracing,
    /// Keep every snapshot for the final report.
    Recorder,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderflowConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Log line layout.
    pub log_format: LogFormat,
    /// Email applied before any `--email` flags.
    pub initial_email: Option<String>,
    /// Observers attached by `run`.
    pub observers: Vec<ObserverKind>,
}

impl Default for OrderflowConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            log_format: LogFormat::Text,
            initial_email: None,
            observers: vec![ObserverKind::Tracing, ObserverKind::Recorder],
        }
    }
}

impl OrderflowConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, OrderflowError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, OrderflowError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Load `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, OrderflowError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), OrderflowError> {
        if self.log_filter.trim().is_empty() {
            return Err(OrderflowError::Config("log_filter must not be empty".to_string()));
        }
        let mut seen = Vec::with_capacity(self.observers.len());
        for kind in &self.observers {
            if seen.contains(kind) {
                return Err(OrderflowError::Config(format!(
                    "observer {kind:?} listed more than once"
                )));
            }
            seen.push(*kind);
        }
        Ok(())
    }
}
