//! The circuit graph: an arena of nodes and directed channels.
//!
//! Clients build the graph up front (`add_port` / `add_node` /
//! `add_channel`); topology is immutable afterwards — there is no delete or
//! rewire. Every attribute variable is minted at creation time, so repeated
//! compilation reuses identical variables.

mod channel;
mod node;

pub use channel::{Channel, ChannelShape, ChannelSpec, Phase};
pub use node::{AnalyteSet, Node, NodeKind, NodeSpec};

use indexmap::IndexMap;
use tracing::debug;

use crate::error::SchematicError;
use crate::properties;
use crate::registry::{Attr, ChannelId, EntityId, NodeId, VarId, VariableRegistry};

/// A symbolic attribute together with its optional user-fixed value.
///
/// `fixed: Some(v)` pins the variable to `v` by equality during translation;
/// `None` leaves it free with only the default bound. Unset is a distinct
/// state from fixed-at-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    /// The registry variable backing this attribute.
    pub var: VarId,
    /// User-fixed value, if any.
    pub fixed: Option<f64>,
}

impl Quantity {
    fn new(var: VarId, fixed: Option<f64>) -> Self {
        Self { var, fixed }
    }
}

/// Bounding box of the chip; every node must be placed within it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChipDims {
    /// Lower x bound.
    pub x_min: f64,
    /// Lower y bound.
    pub y_min: f64,
    /// Upper x bound.
    pub x_max: f64,
    /// Upper y bound.
    pub y_max: f64,
}

impl ChipDims {
    /// A chip spanning `[x_min, x_max] x [y_min, y_max]`.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}

impl Default for ChipDims {
    fn default() -> Self {
        Self::new(0.0, 0.0, 10.0, 10.0)
    }
}

/// A microfluidic circuit: ports, junction nodes, and channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schematic {
    pub(crate) dims: ChipDims,
    pub(crate) nodes: Vec<Node>,
    pub(crate) channels: Vec<Channel>,
    pub(crate) node_ids: IndexMap<String, NodeId>,
    pub(crate) channel_ids: IndexMap<(NodeId, NodeId), ChannelId>,
    pub(crate) outgoing: Vec<Vec<ChannelId>>,
    pub(crate) incoming: Vec<Vec<ChannelId>>,
    pub(crate) registry: VariableRegistry,
}

impl Schematic {
    /// An empty schematic with the given chip bounds.
    pub fn new(dims: ChipDims) -> Self {
        Self {
            dims,
            ..Self::default()
        }
    }

    /// Add a fluid port. `kind` must be [`NodeKind::Input`] or
    /// [`NodeKind::Output`].
    pub fn add_port(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        spec: NodeSpec,
    ) -> Result<NodeId, SchematicError> {
        if !kind.is_port() {
            return Err(SchematicError::InvalidKind(format!(
                "'{kind}' is not a port kind"
            )));
        }
        self.insert_node(name.into(), kind, spec)
    }

    /// Add a junction node. `kind` must be [`NodeKind::Plain`],
    /// [`NodeKind::TJunction`], or [`NodeKind::EpCross`].
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        spec: NodeSpec,
    ) -> Result<NodeId, SchematicError> {
        if !kind.is_junction() {
            return Err(SchematicError::InvalidKind(format!(
                "'{kind}' is not a junction kind"
            )));
        }
        self.insert_node(name.into(), kind, spec)
    }

    /// Add a directed channel between two existing nodes. At most one
    /// channel may exist per ordered (from, to) pair.
    pub fn add_channel(
        &mut self,
        from: &str,
        to: &str,
        shape: ChannelShape,
        spec: ChannelSpec,
    ) -> Result<ChannelId, SchematicError> {
        let from_id = self
            .node_id(from)
            .ok_or_else(|| SchematicError::UnknownEndpoint(from.to_string()))?;
        let to_id = self
            .node_id(to)
            .ok_or_else(|| SchematicError::UnknownEndpoint(to.to_string()))?;
        if self.channel_ids.contains_key(&(from_id, to_id)) {
            return Err(SchematicError::DuplicateChannel {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        ensure_non_negative("min_length", spec.min_length)?;
        ensure_non_negative("min_width", spec.min_width)?;
        ensure_non_negative("min_height", spec.min_height)?;
        ensure_non_negative("max_width", spec.max_width)?;
        ensure_non_negative("max_height", spec.max_height)?;
        ensure_non_negative("min_sampling_time", spec.min_sampling_time)?;

        let id = ChannelId(self.channels.len() as u32);
        let entity = EntityId::Channel(id);
        let prefix = format!("{from}_{to}");
        let length = self.mint(entity, Attr::Length, &prefix, spec.min_length);
        let width = self.mint(entity, Attr::Width, &prefix, spec.min_width);
        let height = self.mint(entity, Attr::Height, &prefix, spec.min_height);
        let flow_rate = self.mint(entity, Attr::FlowRate, &prefix, None);
        let droplet_volume = self.mint(entity, Attr::DropletVolume, &prefix, None);
        let viscosity = self.mint(entity, Attr::Viscosity, &prefix, None);
        let resistance = self.mint(entity, Attr::Resistance, &prefix, None);
        let channel = Channel {
            id,
            from: from_id,
            to: to_id,
            shape,
            length,
            width,
            height,
            flow_rate,
            droplet_volume,
            viscosity,
            resistance,
            max_width: spec.max_width,
            max_height: spec.max_height,
            min_sampling_time: spec.min_sampling_time,
            phase: spec.phase,
        };
        debug!(channel = %prefix, phase = %channel.phase, "added channel");
        self.channels.push(channel);
        self.channel_ids.insert((from_id, to_id), id);
        self.outgoing[from_id.index()].push(id);
        self.incoming[to_id.index()].push(id);
        Ok(id)
    }

    fn insert_node(
        &mut self,
        name: String,
        kind: NodeKind,
        spec: NodeSpec,
    ) -> Result<NodeId, SchematicError> {
        if self.node_ids.contains_key(&name) {
            return Err(SchematicError::DuplicateIdentifier(name));
        }
        ensure_non_negative("min_pressure", spec.min_pressure)?;
        ensure_non_negative("min_flow_rate", spec.min_flow_rate)?;
        ensure_non_negative("min_viscosity", spec.min_viscosity)?;
        ensure_non_negative("density", spec.density)?;
        ensure_non_negative("x", spec.x)?;
        ensure_non_negative("y", spec.y)?;

        let mut density = spec.density;
        let mut viscosity = spec.min_viscosity;
        let mut analytes = spec.analytes;
        if let Some(fluid_name) = &spec.fluid {
            let fluid = properties::fluid(fluid_name)
                .ok_or_else(|| SchematicError::UnknownFluid(fluid_name.clone()))?;
            density = density.or(fluid.density);
            viscosity = viscosity.or(fluid.viscosity);
            analytes = analytes.or_else(|| properties::analytes(fluid.analyte_group));
        }

        let id = NodeId(self.nodes.len() as u32);
        let entity = EntityId::Node(id);
        let pressure = self.mint(entity, Attr::Pressure, &name, spec.min_pressure);
        let flow_rate = self.mint(entity, Attr::FlowRate, &name, spec.min_flow_rate);
        let viscosity = self.mint(entity, Attr::Viscosity, &name, viscosity);
        let density = self.mint(entity, Attr::Density, &name, density);
        let x = self.mint(entity, Attr::X, &name, spec.x);
        let y = self.mint(entity, Attr::Y, &name, spec.y);
        let node = Node {
            id,
            kind,
            pressure,
            flow_rate,
            viscosity,
            density,
            x,
            y,
            analytes,
            name,
        };
        debug!(node = %node.name, kind = %kind, "added node");
        self.node_ids.insert(node.name.clone(), id);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        Ok(id)
    }

    fn mint(
        &mut self,
        entity: EntityId,
        attr: Attr,
        prefix: &str,
        fixed: Option<f64>,
    ) -> Quantity {
        Quantity::new(self.registry.intern(entity, attr, prefix), fixed)
    }

    /// Chip bounds this schematic was created with.
    pub fn dims(&self) -> ChipDims {
        self.dims
    }

    /// Look up a node handle by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_ids.get(name).copied()
    }

    /// Node by handle.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Channel by handle.
    pub fn channel(&self, id: ChannelId) -> &Channel {
        &self.channels[id.index()]
    }

    /// Look up a channel handle by its ordered endpoint names.
    pub fn channel_between(&self, from: &str, to: &str) -> Option<ChannelId> {
        let from_id = self.node_id(from)?;
        let to_id = self.node_id(to)?;
        self.channel_ids.get(&(from_id, to_id)).copied()
    }

    /// Channels leaving `id`, in insertion order.
    pub fn channels_from(&self, id: NodeId) -> &[ChannelId] {
        &self.outgoing[id.index()]
    }

    /// Channels entering `id`, in insertion order.
    pub fn channels_into(&self, id: NodeId) -> &[ChannelId] {
        &self.incoming[id.index()]
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All channels in insertion order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// The variable registry backing this schematic.
    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// Variable backing a named node's attribute, if minted.
    pub fn node_variable(&self, name: &str, attr: &Attr) -> Option<VarId> {
        let id = self.node_id(name)?;
        self.registry.variable_for(EntityId::Node(id), attr)
    }

    /// Variable backing a channel's attribute, if minted.
    pub fn channel_variable(&self, from: &str, to: &str, attr: &Attr) -> Option<VarId> {
        let id = self.channel_between(from, to)?;
        self.registry.variable_for(EntityId::Channel(id), attr)
    }
}

fn ensure_non_negative(
    attribute: &'static str,
    value: Option<f64>,
) -> Result<(), SchematicError> {
    match value {
        Some(v) if v < 0.0 => Err(SchematicError::InvalidBound {
            attribute,
            value: v,
        }),
        _ => Ok(()),
    }
}
