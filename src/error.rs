//! Error types.

use crate::id::NodeId;
use thiserror::Error;

/// Errors that abort a whole batch.
///
/// These are raised before any tree mutation, so the tree is unchanged when one is returned.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The backend declared a type this client does not know; usually a protocol or version
    /// mismatch.
    #[error("node `{id}` has unknown component type `{type_tag}`")]
    UnknownType { id: NodeId, type_tag: String },
    #[error("could not create node `{id}`: {source}")]
    Factory {
        id: NodeId,
        #[source]
        source: FactoryError,
    },
}

/// Errors raised by a [`ComponentFactory`](crate::ComponentFactory).
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unknown component type `{0}`")]
    UnknownType(String),
    #[error("invalid initial state for `{type_tag}`: {reason}")]
    InvalidState { type_tag: String, reason: String },
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("viewport must be non-negative, got {0}x{1}")]
    Viewport(f64, f64),
}

/// Errors raised by the batch [`Host`](crate::Host).
#[derive(Debug, Error)]
pub enum HostError {
    #[error("batch transport disconnected")]
    Disconnected,
    #[error("malformed batch: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Batch(#[from] BatchError),
}
