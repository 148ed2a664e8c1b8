//! # Error Types — Severity-Classified Failures
//!
//! Every failure raised by descriptor nodes is a [`MetaDataError`]. Callers
//! that drive a larger pass (loading a batch of metadata, bringing up a
//! store) inspect [`MetaDataError::severity()`] to decide whether to skip the
//! offending node and carry on, or abort the whole operation.
//!
//! The fatal/non-fatal distinction is data on the error, not a second error
//! hierarchy: most variants are always [`Severity::User`],
//! [`MetaDataError::DatastoreInitialisation`] is always [`Severity::Fatal`],
//! and the generic [`MetaDataError::User`] variant carries the flag itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message code for a malformed extension (missing vendor, or a reserved
/// vendor entry without key or value).
pub const INVALID_EXTENSION_CODE: &str = "044160";

/// How bad a failure is for the operation that hit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Invalid input or a violated usage precondition. Recoverable.
    User,
    /// Non-recoverable. The enclosing operation should be abandoned.
    Fatal,
}

impl Severity {
    /// Whether this severity demands aborting the enclosing operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::User => "USER",
            Self::Fatal => "FATAL",
        };
        f.write_str(s)
    }
}

/// Top-level error type for descriptor nodes.
#[derive(Error, Debug)]
pub enum MetaDataError {
    /// An extension was rejected at the point it was added.
    #[error("invalid extension [{code}]: vendor={vendor:?} key={key:?} value={value:?}")]
    InvalidExtension {
        /// Message code identifying the rule that was broken.
        code: &'static str,
        /// Vendor name as supplied.
        vendor: Option<String>,
        /// Key as supplied.
        key: Option<String>,
        /// Value as supplied.
        value: Option<String>,
    },

    /// Structural mutation attempted on a node that is already frozen.
    #[error("cannot set parent of {node} since it is already {state}")]
    ConfigurationState {
        /// Rendering of the offending node.
        node: String,
        /// Lifecycle state the node was in.
        state: String,
    },

    /// A datastore could not be brought up. Always fatal.
    #[error("error initialising datastore: {message}")]
    DatastoreInitialisation {
        /// What went wrong.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Free-form user-visible error with an explicit fatal flag.
    #[error("{message}")]
    User {
        /// What went wrong.
        message: String,
        /// Whether the caller should abort the enclosing operation.
        fatal: bool,
    },
}

impl MetaDataError {
    /// Build a recoverable user error.
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            fatal: false,
        }
    }

    /// Build a user error flagged as fatal.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            fatal: true,
        }
    }

    /// Build a datastore initialisation failure, optionally wrapping its cause.
    pub fn datastore_initialisation(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::DatastoreInitialisation {
            message: message.into(),
            source,
        }
    }

    /// Severity classification of this error.
    pub fn severity(&self) -> Severity {
        match self {
            Self::InvalidExtension { .. } | Self::ConfigurationState { .. } => Severity::User,
            Self::DatastoreInitialisation { .. } => Severity::Fatal,
            Self::User { fatal: true, .. } => Severity::Fatal,
            Self::User { fatal: false, .. } => Severity::User,
        }
    }

    /// Whether the enclosing operation should be aborted.
    pub fn is_fatal(&self) -> bool {
        self.severity().is_fatal()
    }

    /// Message code, for variants that carry one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidExtension { code, .. } => Some(*code),
            _ => None,
        }
    }
}
