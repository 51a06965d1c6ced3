//! Node kinds, per-node attributes, and the node option bag.

use std::fmt;
use std::str::FromStr;

use crate::error::SchematicError;
use crate::registry::NodeId;
use crate::schematic::Quantity;

/// Kind of a node: a fluid port or an internal junction.
///
/// A closed sum — the translation driver matches exhaustively, so an
/// unsupported kind is unrepresentable rather than a runtime error. The
/// string boundary (CLI, config files) goes through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Fluid entry port; a traversal root with no inbound channels.
    Input,
    /// Fluid exit port; a sink with no outbound channels.
    Output,
    /// Plain junction connecting two or more channels.
    Plain,
    /// Droplet-generating T-junction (continuous + dispersed -> output).
    TJunction,
    /// Electrophoretic cross (injection/waste axis + separation axis).
    EpCross,
}

impl NodeKind {
    /// Whether this kind is a fluid port (valid for `add_port`).
    pub fn is_port(self) -> bool {
        matches!(self, NodeKind::Input | NodeKind::Output)
    }

    /// Whether this kind is an internal junction (valid for `add_node`).
    pub fn is_junction(self) -> bool {
        !self.is_port()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            NodeKind::Input => "input",
            NodeKind::Output => "output",
            NodeKind::Plain => "node",
            NodeKind::TJunction => "t-junction",
            NodeKind::EpCross => "ep-cross",
        };
        write!(f, "{tag}")
    }
}

impl FromStr for NodeKind {
    type Err = SchematicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "input" => Ok(NodeKind::Input),
            "output" => Ok(NodeKind::Output),
            "node" | "plain" => Ok(NodeKind::Plain),
            "t-junction" | "tjunc" => Ok(NodeKind::TJunction),
            "ep-cross" | "ep_cross" => Ok(NodeKind::EpCross),
            other => Err(SchematicError::InvalidKind(other.to_string())),
        }
    }
}

/// Equal-length per-analyte property arrays carried by an injection port.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyteSet {
    diffusivities: Vec<f64>,
    initial_concentrations: Vec<f64>,
    radii: Vec<f64>,
    charges: Vec<f64>,
}

impl AnalyteSet {
    /// Build an analyte set from parallel property arrays.
    ///
    /// All four arrays must have the same length; diffusivities,
    /// concentrations, and radii must be non-negative (charges may carry
    /// either sign).
    pub fn new(
        diffusivities: Vec<f64>,
        initial_concentrations: Vec<f64>,
        radii: Vec<f64>,
        charges: Vec<f64>,
    ) -> Result<Self, SchematicError> {
        let len = diffusivities.len();
        if initial_concentrations.len() != len || radii.len() != len || charges.len() != len {
            return Err(SchematicError::MissingAnalyteData(
                "analyte property arrays must have equal lengths".to_string(),
            ));
        }
        for (attribute, values) in [
            ("analyte_diffusivities", &diffusivities),
            ("analyte_initial_concentrations", &initial_concentrations),
            ("analyte_radii", &radii),
        ] {
            if let Some(&value) = values.iter().find(|v| **v < 0.0) {
                return Err(SchematicError::InvalidBound { attribute, value });
            }
        }
        Ok(Self {
            diffusivities,
            initial_concentrations,
            radii,
            charges,
        })
    }

    /// Number of analytes.
    pub fn len(&self) -> usize {
        self.diffusivities.len()
    }

    /// Whether the set holds no analytes.
    pub fn is_empty(&self) -> bool {
        self.diffusivities.is_empty()
    }

    /// Diffusivity of analyte `i`.
    pub fn diffusivity(&self, i: usize) -> f64 {
        self.diffusivities[i]
    }

    /// Initial concentration of analyte `i`.
    pub fn initial_concentration(&self, i: usize) -> f64 {
        self.initial_concentrations[i]
    }

    /// Hydrodynamic radius of analyte `i`.
    pub fn radius(&self, i: usize) -> f64 {
        self.radii[i]
    }

    /// Charge of analyte `i`.
    pub fn charge(&self, i: usize) -> f64 {
        self.charges[i]
    }
}

/// Optional fixed attributes supplied when adding a node or port.
///
/// Every unset attribute stays a free variable, lower-bounded at zero during
/// translation. Unset is distinct from fixed-at-zero: the generated
/// constraint differs (free-but-bounded vs pinned-equal).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSpec {
    pub(crate) min_pressure: Option<f64>,
    pub(crate) min_flow_rate: Option<f64>,
    pub(crate) min_viscosity: Option<f64>,
    pub(crate) density: Option<f64>,
    pub(crate) x: Option<f64>,
    pub(crate) y: Option<f64>,
    pub(crate) analytes: Option<AnalyteSet>,
    pub(crate) fluid: Option<String>,
}

impl NodeSpec {
    /// An all-free spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the node pressure.
    pub fn min_pressure(mut self, value: f64) -> Self {
        self.min_pressure = Some(value);
        self
    }

    /// Pin the node flow rate.
    pub fn min_flow_rate(mut self, value: f64) -> Self {
        self.min_flow_rate = Some(value);
        self
    }

    /// Pin the node viscosity.
    pub fn min_viscosity(mut self, value: f64) -> Self {
        self.min_viscosity = Some(value);
        self
    }

    /// Pin the fluid density at the node.
    pub fn density(mut self, value: f64) -> Self {
        self.density = Some(value);
        self
    }

    /// Pin the node position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Attach per-analyte property arrays (electrophoretic injection ports).
    pub fn analytes(mut self, set: AnalyteSet) -> Self {
        self.analytes = Some(set);
        self
    }

    /// Fill density, viscosity, and analyte data from the fluid property
    /// table. Explicitly set attributes win over table values.
    pub fn fluid(mut self, name: impl Into<String>) -> Self {
        self.fluid = Some(name.into());
        self
    }
}

/// A port or junction node in a schematic.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) pressure: Quantity,
    pub(crate) flow_rate: Quantity,
    pub(crate) viscosity: Quantity,
    pub(crate) density: Quantity,
    pub(crate) x: Quantity,
    pub(crate) y: Quantity,
    pub(crate) analytes: Option<AnalyteSet>,
}

impl Node {
    /// Handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Unique name of this node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of this node.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Pressure attribute.
    pub fn pressure(&self) -> Quantity {
        self.pressure
    }

    /// Flow-rate attribute.
    pub fn flow_rate(&self) -> Quantity {
        self.flow_rate
    }

    /// Viscosity attribute.
    pub fn viscosity(&self) -> Quantity {
        self.viscosity
    }

    /// Density attribute.
    pub fn density(&self) -> Quantity {
        self.density
    }

    /// X-position attribute.
    pub fn x(&self) -> Quantity {
        self.x
    }

    /// Y-position attribute.
    pub fn y(&self) -> Quantity {
        self.y
    }

    /// Per-analyte arrays, if attached.
    pub fn analytes(&self) -> Option<&AnalyteSet> {
        self.analytes.as_ref()
    }
}
