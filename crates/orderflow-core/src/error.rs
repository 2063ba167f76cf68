//! # Error Types
//!
//! Lifecycle advancement, duplicate attachment, and detaching an absent
//! observer are all defined as no-ops, so none of them appear here. What
//! remains is parsing and configuration failures, plus [`ObserverError`]
//! for failures raised by observers themselves, which must reach the caller
//! of the mutating operation.

use thiserror::Error;

/// Top-level error type for orderflow.
#[derive(Error, Debug)]
pub enum OrderflowError {
    /// A state label did not name any known lifecycle state.
    #[error("unknown state label: {0:?}")]
    UnknownState(String),

    /// Timestamp was not valid RFC 3339 UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Configuration could not be loaded or was malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// YAML deserialization error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure raised by an observer while handling a notification.
///
/// Delivery is fail-fast: the first failure stops the pass and is returned
/// to the caller. Observers notified earlier in the pass are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObserverError {
    /// The observer refused or could not process the snapshot.
    #[error("observer {observer} rejected notification: {reason}")]
    Rejected {
        /// Name of the failing observer.
        observer: String,
        /// Why the observer failed.
        reason: String,
    },
}

impl ObserverError {
    /// Shorthand for [`ObserverError::Rejected`].
    pub fn rejected(observer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            observer: observer.into(),
            reason: reason.into(),
        }
    }
}
