//! Graph-to-constraints translation.
//!
//! The driver walks every node and channel, dispatching on the closed kind
//! sums, and the per-kind strategies emit constraint terms through the
//! shared [`Translator`]. Strategies recurse into their successors (a
//! channel translates its downstream node, a node its outgoing channels), so
//! terms may be emitted more than once; ordering is deterministic and two
//! runs over the same schematic produce identical sets.
//!
//! The only supported topology is a DAG reachable from input ports. An
//! on-path guard turns an accidental cycle into a fast
//! [`SchematicError::CycleDetected`] instead of unbounded recursion.

mod channel;
mod ep_cross;
mod node;
mod tjunction;

use tracing::{info, trace};

use crate::error::SchematicError;
use crate::expr::{Constraint, ConstraintSet, Expr};
use crate::physics;
use crate::registry::{ChannelId, NodeId, VariableRegistry};
use crate::schematic::{
    Channel, ChannelShape, ChipDims, Node, NodeKind, Quantity, Schematic,
};

/// Options governing a compilation run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Critical crossing angle for T-junction droplet generation, in
    /// degrees. The angle between any two channels at the junction must not
    /// exceed it.
    pub crit_crossing_angle: f64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            crit_crossing_angle: physics::DEFAULT_CRIT_ANGLE_DEG,
        }
    }
}

impl Schematic {
    /// Compile the schematic into a constraint set.
    ///
    /// Walks every node and channel, then bounds every node position to the
    /// chip area. Calling this twice on an unmodified schematic yields
    /// structurally identical sets and mints no new variables.
    pub fn compile(&mut self, options: &CompileOptions) -> Result<ConstraintSet, SchematicError> {
        let Schematic {
            dims,
            nodes,
            channels,
            outgoing,
            incoming,
            registry,
            ..
        } = self;
        let mut translator = Translator {
            dims: *dims,
            nodes: nodes.as_slice(),
            channels: channels.as_slice(),
            outgoing: outgoing.as_slice(),
            incoming: incoming.as_slice(),
            registry,
            options,
            constraints: ConstraintSet::new(),
            path: Vec::new(),
        };

        for index in 0..translator.nodes.len() {
            translator.translate_node(NodeId(index as u32))?;
        }
        for index in 0..translator.channels.len() {
            translator.translate_channel(ChannelId(index as u32))?;
        }
        for index in 0..translator.nodes.len() {
            translator.chip_bounds(NodeId(index as u32));
        }

        info!(
            nodes = translator.nodes.len(),
            channels = translator.channels.len(),
            constraints = translator.constraints.len(),
            variables = translator.registry.len(),
            "compiled schematic"
        );
        Ok(translator.constraints)
    }
}

/// Shared state of one compilation run.
pub(crate) struct Translator<'s> {
    dims: ChipDims,
    nodes: &'s [Node],
    channels: &'s [Channel],
    outgoing: &'s [Vec<ChannelId>],
    incoming: &'s [Vec<ChannelId>],
    registry: &'s mut VariableRegistry,
    options: &'s CompileOptions,
    constraints: ConstraintSet,
    /// Nodes on the current recursion path, for cycle detection.
    path: Vec<NodeId>,
}

impl Translator<'_> {
    /// Translate one node, dispatching on its kind.
    fn translate_node(&mut self, id: NodeId) -> Result<(), SchematicError> {
        if self.path.contains(&id) {
            return Err(SchematicError::CycleDetected(self.node(id).name().to_string()));
        }
        self.path.push(id);
        trace!(node = %self.node(id).name(), kind = %self.node(id).kind(), "translating node");
        let result = match self.node(id).kind() {
            NodeKind::Input => self.translate_input(id),
            NodeKind::Output => self.translate_output(id),
            NodeKind::Plain => self.translate_plain(id),
            NodeKind::TJunction => self.translate_tjunction(id),
            NodeKind::EpCross => self.translate_ep_cross(id),
        };
        self.path.pop();
        result
    }

    /// Translate one channel, dispatching on its shape.
    fn translate_channel(&mut self, id: ChannelId) -> Result<(), SchematicError> {
        match self.channel(id).shape() {
            ChannelShape::Rectangle => self.translate_rectangular(id),
        }
    }

    /// Keep a node's position within the chip area.
    fn chip_bounds(&mut self, id: NodeId) {
        let node = self.node(id);
        let (x, y) = (node.x().var, node.y().var);
        let dims = self.dims;
        self.push(Constraint::ge(x, dims.x_min));
        self.push(Constraint::ge(y, dims.y_min));
        self.push(Constraint::le(x, dims.x_max));
        self.push(Constraint::le(y, dims.y_max));
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn channel(&self, id: ChannelId) -> &Channel {
        &self.channels[id.index()]
    }

    /// Position of a node as a pair of fresh variable expressions.
    fn position(&self, id: NodeId) -> (Expr, Expr) {
        let node = self.node(id);
        (Expr::Var(node.x().var), Expr::Var(node.y().var))
    }

    fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Pin a quantity to its fixed value, or lower-bound it (inclusive).
    fn fix_or_ge(&mut self, quantity: Quantity, default_min: f64) {
        match quantity.fixed {
            Some(value) => self.push(Constraint::eq(quantity.var, value)),
            None => self.push(Constraint::ge(quantity.var, default_min)),
        }
    }

    /// Pin a quantity to its fixed value, or lower-bound it (strict).
    fn fix_or_gt(&mut self, quantity: Quantity, default_min: f64) {
        match quantity.fixed {
            Some(value) => self.push(Constraint::eq(quantity.var, value)),
            None => self.push(Constraint::gt(quantity.var, default_min)),
        }
    }
}

/// Sum a list of expressions, or `None` when the list is empty.
fn sum_exprs(items: Vec<Expr>) -> Option<Expr> {
    items.into_iter().reduce(|acc, item| acc + item)
}
