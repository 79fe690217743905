//! Contracts for transports and per-platform configuration lifecycles

use crate::diff::DiffError;
use crate::record::DiffRecord;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport is not open")]
    NotOpen,
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Diff(#[from] DiffError),
    #[error("Config source `{store}` is not one of {available:?}")]
    InvalidSource {
        store: String,
        available: Vec<String>,
    },
    #[error("No match for substitution `{placeholder}` using pattern `{pattern}`")]
    Substitution { placeholder: String, pattern: String },
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("{operation} failed on {host}: {message}")]
    Failed {
        host: String,
        operation: Operation,
        message: String,
    },
    #[error("{operation} on {host}{}: {inner}", store_suffix(.store))]
    Operation {
        host: String,
        operation: Operation,
        store: Option<String>,
        #[source]
        inner: Box<ConfigError>,
    },
}

fn store_suffix(store: &Option<String>) -> String {
    store
        .as_deref()
        .map(|s| format!(" ({})", s))
        .unwrap_or_default()
}

impl ConfigError {
    /// The error without any operation context wrapped around it
    pub fn root(&self) -> &ConfigError {
        match self {
            ConfigError::Operation { inner, .. } => inner.root(),
            other => other,
        }
    }
}

/// Lifecycle operation names, used for logging and error context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Open,
    GetConfig,
    LoadConfig,
    AbortConfig,
    CommitConfig,
    DiffConfig,
    RenderSubstitutedConfig,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Open => "open",
            Operation::GetConfig => "get_config",
            Operation::LoadConfig => "load_config",
            Operation::AbortConfig => "abort_config",
            Operation::CommitConfig => "commit_config",
            Operation::DiffConfig => "diff_config",
            Operation::RenderSubstitutedConfig => "render_substituted_config",
        };
        f.write_str(name)
    }
}

/// Result of a lifecycle operation against a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResponse {
    pub host: String,
    pub operation: Operation,
    /// Operation output, e.g. the fetched config for `get_config`
    pub result: String,
    pub failed: bool,
}

impl ConfigResponse {
    pub fn success(
        host: impl Into<String>,
        operation: Operation,
        result: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            operation,
            result: result.into(),
            failed: false,
        }
    }

    pub fn failure(
        host: impl Into<String>,
        operation: Operation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            operation,
            result: message.into(),
            failed: true,
        }
    }

    /// Turn a failed response into [`ConfigError::Failed`]
    pub fn raise_for_status(self) -> Result<Self, ConfigError> {
        if self.failed {
            return Err(ConfigError::Failed {
                host: self.host,
                operation: self.operation,
                message: self.result,
            });
        }
        Ok(self)
    }
}

/// Platform-specific options for `load_config`
pub type LoadOptions = serde_json::Map<String, serde_json::Value>;

/// Session to a remote target
pub trait Transport {
    fn is_alive(&self) -> bool;
    fn open(&mut self) -> Result<(), TransportError>;
}

/// Configuration lifecycle of one device family
///
/// Implementations own their transport and track whether a candidate is
/// staged; the coordinator only consumes their results.
pub trait ConfigPlatform {
    type Transport: Transport;

    fn host(&self) -> &str;

    fn transport(&self) -> &Self::Transport;

    fn transport_mut(&mut self) -> &mut Self::Transport;

    /// Fetch the full text of a config store. Must not change device state.
    fn get_config(&mut self, source: &str) -> Result<ConfigResponse, ConfigError>;

    /// Stage `config`, replacing the whole config or merging into it
    fn load_config(
        &mut self,
        config: &str,
        replace: bool,
        options: &LoadOptions,
    ) -> Result<ConfigResponse, ConfigError>;

    /// Discard any staged config; nothing staged is not an error
    fn abort_config(&mut self) -> Result<ConfigResponse, ConfigError>;

    fn commit_config(&mut self, source: &str) -> Result<ConfigResponse, ConfigError>;

    /// Compare the staged candidate against a config store
    fn diff_config(&mut self, source: &str) -> Result<DiffRecord, ConfigError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_for_status() {
        let ok = ConfigResponse::success("r1", Operation::LoadConfig, "");
        assert!(ok.clone().raise_for_status().is_ok());

        let failed = ConfigResponse::failure("r1", Operation::CommitConfig, "% Invalid input");
        let err = failed.raise_for_status().unwrap_err();
        assert_eq!(err.to_string(), "commit_config failed on r1: % Invalid input");
    }

    #[test]
    fn test_operation_context_message() {
        let err = ConfigError::Operation {
            host: "r1".to_string(),
            operation: Operation::GetConfig,
            store: Some("running".to_string()),
            inner: Box::new(TransportError::NotOpen.into()),
        };
        assert_eq!(err.to_string(), "get_config on r1 (running): Transport is not open");
        assert!(matches!(
            err.root(),
            ConfigError::Transport(TransportError::NotOpen)
        ));
    }
}
