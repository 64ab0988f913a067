//! Error types for the AST crate.
//!
//! This module defines structured errors for Babel JSON import/export and
//! arena access.

use thiserror::Error;

use crate::nodes::NodeId;

#[derive(Debug, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum AstError {
    /// The document root is neither a `File` nor a `Program`.
    #[error("expected a `File` or `Program` root node, found `{found}`")]
    UnexpectedRoot { found: String },

    /// A JSON object in node position has no `type` string.
    #[error("node object has no `type` field")]
    MissingType,

    #[error("`{node_type}` node is missing required field `{field}`")]
    MissingField {
        node_type: String,
        field: &'static str,
    },

    #[error("`{node_type}` field `{field}` has an unexpected shape: {reason}")]
    InvalidField {
        node_type: String,
        field: String,
        reason: String,
    },

    #[error("node {id} does not exist in the arena")]
    UnknownNode { id: NodeId },

    #[error("failed to read AST JSON: {0}")]
    Json(#[from] serde_json::Error),
}
