//! Constraint compiler for microfluidic chip schematics.
//!
//! A [`Schematic`] is a directed graph of fluid ports, junction nodes, and
//! rectangular channels. [`Schematic::compile`] walks the graph and encodes
//! its geometry and flow regime as a conjunction of nonlinear real-arithmetic
//! constraints over named symbolic variables; an [`Oracle`] backend decides
//! the conjunction and, when the design is realizable, returns a [`Model`]
//! assigning every free dimension, pressure, and flow rate.
//!
//! The compiler only decides feasibility and derives parameter ranges — it
//! does not simulate time-dependent flow or optimize a design.

pub mod error;
pub mod eval;
pub mod expr;
pub mod physics;
pub mod properties;
pub mod registry;
pub mod schematic;
pub mod solve;
pub mod translate;

pub use error::SchematicError;
pub use expr::{Constraint, ConstraintSet, Expr};
pub use registry::{Attr, ChannelId, EntityId, NodeId, VarId, VariableRegistry};
pub use schematic::{
    AnalyteSet, Channel, ChannelShape, ChannelSpec, ChipDims, Node, NodeKind, NodeSpec, Phase,
    Quantity, Schematic,
};
pub use solve::{Formula, Model, Oracle, SatResult, SolveError};
pub use translate::CompileOptions;
