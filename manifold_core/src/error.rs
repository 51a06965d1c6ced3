//! Error types for schematic construction and translation.
//!
//! Every variant reflects a malformed specification; none are recoverable
//! within a compilation run and there is no retry policy. Oracle outcomes
//! (`Sat`/`Unsat`/`Unknown`) are ordinary results, not errors.

use thiserror::Error;

/// Errors raised while building a schematic or compiling it to constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchematicError {
    /// A node with this name already exists in the schematic.
    #[error("Identifier '{0}' already exists")]
    DuplicateIdentifier(String),

    /// A channel endpoint names a node that was never added.
    #[error("Channel endpoint '{0}' does not exist")]
    UnknownEndpoint(String),

    /// A channel between this ordered pair of nodes already exists.
    #[error("Channel '{from}' -> '{to}' already exists")]
    DuplicateChannel {
        /// Upstream endpoint name.
        from: String,
        /// Downstream endpoint name.
        to: String,
    },

    /// Unsupported channel cross-section.
    #[error("Invalid channel shape: '{0}'")]
    InvalidShape(String),

    /// Node kind not valid in this position, or unrecognized on parse.
    #[error("Invalid node kind: {0}")]
    InvalidKind(String),

    /// A numeric attribute was negative.
    #[error("Attribute '{attribute}' must be non-negative, got {value}")]
    InvalidBound {
        /// Name of the offending attribute.
        attribute: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A port had no channels attached where at least one is required.
    #[error("Port '{0}' must have 1 or more connections")]
    NoConnection(String),

    /// Wrong connection count or direction for a specialized node.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Unrecognized or missing phase tag at a junction that needs one.
    #[error("Invalid phase: {0}")]
    InvalidPhase(String),

    /// Electrophoretic injection node lacks usable per-analyte arrays.
    #[error("Missing or malformed analyte data: {0}")]
    MissingAnalyteData(String),

    /// The graph contains a directed cycle; translation requires a DAG.
    #[error("Cycle detected through node '{0}'")]
    CycleDetected(String),

    /// Fluid name not present in the property table.
    #[error("Unknown fluid: '{0}'")]
    UnknownFluid(String),
}

impl SchematicError {
    /// Create an invalid-topology error.
    pub(crate) fn topology(detail: impl Into<String>) -> Self {
        Self::InvalidTopology(detail.into())
    }

    /// Create an invalid-phase error.
    pub(crate) fn phase(detail: impl Into<String>) -> Self {
        Self::InvalidPhase(detail.into())
    }
}
