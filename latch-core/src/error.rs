//! Error Types
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are
//! raised synchronously and always before the call mutates the tree.
//!
//! # Taxonomy
//!
//! - [`LatchError::Argument`]: a required argument has the wrong type or shape.
//! - [`LatchError::Environment`]: the host lacks a capability the crate needs.
//! - [`LatchError::UnknownAction`]: a hook names an action the markup lacks.
//!
//! The remaining variants cover opt-in strictness, configuration parsing and
//! host tree violations.

use thiserror::Error;

use crate::env::Capability;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LatchError>;

/// Errors raised by latches and the initialization guard.
#[derive(Debug, Error)]
pub enum LatchError {
    /// An argument was missing or had the wrong type or shape.
    #[error("invalid argument `{argument}`: {reason}")]
    Argument {
        argument: &'static str,
        reason: String,
    },

    /// The host environment does not provide a required capability.
    #[error("host environment lacks required capability: {0}")]
    Environment(Capability),

    /// A hook referenced an action element that does not exist.
    #[error("hook references unknown action `{action}`")]
    UnknownAction { action: String },

    /// Two bindings share a key while the unique key policy is active.
    #[error("binding key `{key}` appears more than once")]
    DuplicateKey { key: String },

    /// A configuration document could not be parsed.
    #[error("invalid markup configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The host tree rejected an operation.
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl LatchError {
    /// Shorthand for building an argument error.
    pub(crate) fn argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::Argument {
            argument,
            reason: reason.into(),
        }
    }
}

/// Errors raised by the host tree itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// Inserting the node would make it its own ancestor.
    #[error("cannot append node {child} under its own descendant {parent}")]
    Hierarchy { parent: u64, child: u64 },

    /// Text nodes cannot hold children.
    #[error("text node {0} cannot have children")]
    NotAContainer(u64),
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
