//! Variable registry: one symbolic variable per (entity, attribute) pair.
//!
//! The solver treats name identity as variable identity, so a pair must
//! always resolve to the same variable. The registry mints a variable with a
//! deterministic name on first use and returns the same id for every later
//! request; there is no removal, and the registry lives as long as the graph.

use indexmap::IndexMap;

/// Opaque handle of a symbolic real-valued variable.
///
/// Identity is id equality: two handles compare equal iff they refer to the
/// same (entity, attribute) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u32) -> Self {
        VarId(raw)
    }

    /// Index of this variable in the registry.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a node in a schematic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Index of this node in the schematic's node arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a channel in a schematic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub(crate) u32);

impl ChannelId {
    /// Index of this channel in the schematic's channel arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Entity owning a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityId {
    /// A port or junction node.
    Node(NodeId),
    /// A channel edge.
    Channel(ChannelId),
}

/// Attribute identifying a variable within its entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attr {
    /// Node pressure.
    Pressure,
    /// Node or channel volumetric flow rate.
    FlowRate,
    /// Node or channel dynamic viscosity.
    Viscosity,
    /// Node fluid density.
    Density,
    /// Node x position.
    X,
    /// Node y position.
    Y,
    /// Channel length.
    Length,
    /// Channel cross-section width.
    Width,
    /// Channel cross-section height.
    Height,
    /// Droplet volume generated into a channel.
    DropletVolume,
    /// Channel hydraulic resistance.
    Resistance,
    /// Corner-rounding parameter of a T-junction.
    Epsilon,
    /// Electric field along an electrophoretic separation axis.
    ElectricField,
    /// Applied voltage across an electrophoretic separation axis.
    Voltage,
    /// Anode-to-cathode distance of an electrophoretic cross.
    AxisLength,
    /// Detector position along a separation channel.
    DetectorPosition,
    /// Electrophoretic mobility of analyte `i`.
    Mobility(usize),
    /// Drift velocity of analyte `i`.
    DriftVelocity(usize),
    /// Detector peak time of analyte `i`.
    PeakTime(usize),
    /// Peak-height ratio between analytes `i` and `i + 1`.
    PeakRatio(usize),
}

impl Attr {
    /// Suffix used in the variable's globally unique name.
    fn suffix(&self) -> String {
        match self {
            Attr::Pressure => "pressure".into(),
            Attr::FlowRate => "flow_rate".into(),
            Attr::Viscosity => "viscosity".into(),
            Attr::Density => "density".into(),
            Attr::X => "x".into(),
            Attr::Y => "y".into(),
            Attr::Length => "length".into(),
            Attr::Width => "width".into(),
            Attr::Height => "height".into(),
            Attr::DropletVolume => "droplet_volume".into(),
            Attr::Resistance => "resistance".into(),
            Attr::Epsilon => "epsilon".into(),
            Attr::ElectricField => "electric_field".into(),
            Attr::Voltage => "voltage".into(),
            Attr::AxisLength => "axis_length".into(),
            Attr::DetectorPosition => "detector_position".into(),
            Attr::Mobility(i) => format!("mobility_{i}"),
            Attr::DriftVelocity(i) => format!("velocity_{i}"),
            Attr::PeakTime(i) => format!("peak_time_{i}"),
            Attr::PeakRatio(i) => format!("peak_ratio_{i}"),
        }
    }
}

/// Create-once store of symbolic variables, keyed by (entity, attribute).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableRegistry {
    names: Vec<String>,
    index: IndexMap<(EntityId, Attr), VarId>,
}

impl VariableRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the variable for this (entity, attribute) pair, minting it
    /// with the deterministic name `{prefix}_{attribute}` on first use.
    pub(crate) fn intern(&mut self, entity: EntityId, attr: Attr, prefix: &str) -> VarId {
        if let Some(var) = self.index.get(&(entity, attr.clone())) {
            return *var;
        }
        let var = VarId(self.names.len() as u32);
        self.names.push(format!("{prefix}_{}", attr.suffix()));
        self.index.insert((entity, attr), var);
        var
    }

    /// Look up the variable for this (entity, attribute) pair, if minted.
    pub fn variable_for(&self, entity: EntityId, attr: &Attr) -> Option<VarId> {
        self.index.get(&(entity, attr.clone())).copied()
    }

    /// Globally unique name of a variable.
    pub fn name(&self, var: VarId) -> &str {
        &self.names[var.index()]
    }

    /// Number of minted variables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no variables were minted yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate variables in minting order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (VarId(i as u32), name.as_str()))
    }
}
