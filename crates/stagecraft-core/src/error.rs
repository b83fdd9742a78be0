//! Error taxonomy for the pipeline builder.
//!
//! Three failure families, distinguished by what they can be attributed to:
//!
//! - [`StructuralError`] — the graph is not a single chain. Fatal for the
//!   whole pipeline, not attributable to one node.
//! - [`ValidationError`] — one stage's configuration is invalid. Attributed
//!   to exactly one node via [`CompileError::Validation`]; assembly stops
//!   at that node and nothing is ever submitted for execution.
//! - [`RuntimeError`] — the live store rejected an otherwise valid prefix.
//!   Attributed to one node inside its execution result; upstream results
//!   are retained.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::NodeId;

/// The graph does not form a single directed chain.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StructuralError {
    /// A node has more than one incoming or outgoing connection
    #[error("stage '{node}' has more than one incoming or outgoing connection")]
    Branch { node: NodeId },

    /// Following the edges revisits a node
    #[error("the stage graph contains a cycle")]
    Cycle,

    /// More than one chain, or nodes unreachable from the source
    #[error("the stage graph is not a single connected chain")]
    Disconnected,
}

/// A single stage parameter is missing or invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field} {message}")]
pub struct ValidationError {
    /// Configuration field the problem was found in
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "is required")
    }
}

/// Why a graph could not be compiled into a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CompileError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Validation failure attributed to the node it came from
    #[error("stage '{node}': {source}")]
    Validation {
        node: NodeId,
        source: ValidationError,
    },
}

impl CompileError {
    /// The node this error is attributable to, if any.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            CompileError::Structural(_) => None,
            CompileError::Validation { node, .. } => Some(node),
        }
    }
}

/// The external store rejected an execution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RuntimeError {
    /// The store refused the stage (type mismatch, unknown operator, ...)
    #[error("the data store rejected the stage: {0}")]
    Rejected(String),

    /// The data source could not be reached
    #[error("could not reach the data source: {0}")]
    Connection(String),

    /// The per-prefix latency bound was exceeded
    #[error("stage execution timed out after {0}ms")]
    Timeout(u64),
}

/// A pipeline could not be rendered to the requested output format.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ExportError {
    /// Stage body shape the exporter cannot express
    #[error("stage {index} ({operator}) has a body this format cannot express")]
    UnsupportedBody { index: usize, operator: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_error_messages() {
        let err = StructuralError::Branch {
            node: "n1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "stage 'n1' has more than one incoming or outgoing connection"
        );
    }

    #[test]
    fn test_validation_error_is_field_level() {
        let err = ValidationError::required("from");
        assert_eq!(err.to_string(), "from is required");
    }

    #[test]
    fn test_compile_error_attribution() {
        let validation = CompileError::Validation {
            node: "n2".to_string(),
            source: ValidationError::new("limit", "must be a non-negative integer"),
        };
        assert_eq!(validation.node(), Some(&"n2".to_string()));
        assert_eq!(
            validation.to_string(),
            "stage 'n2': limit must be a non-negative integer"
        );

        let structural = CompileError::from(StructuralError::Cycle);
        assert_eq!(structural.node(), None);
    }

    #[test]
    fn test_runtime_error_round_trips_through_json() {
        let err = RuntimeError::Timeout(10_000);
        let json = serde_json::to_string(&err).unwrap();
        let parsed: RuntimeError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }
}
