//! Channel shapes, phase tags, per-channel attributes, and the channel
//! option bag.

use std::fmt;
use std::str::FromStr;

use crate::error::SchematicError;
use crate::registry::{ChannelId, NodeId};
use crate::schematic::Quantity;

/// Cross-section shape of a channel. Only rectangular ducts are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelShape {
    /// Rectangular cross-section.
    Rectangle,
}

impl fmt::Display for ChannelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelShape::Rectangle => write!(f, "rectangle"),
        }
    }
}

impl FromStr for ChannelShape {
    type Err = SchematicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rectangle" => Ok(ChannelShape::Rectangle),
            other => Err(SchematicError::InvalidShape(other.to_string())),
        }
    }
}

/// Role of a channel at a junction node.
///
/// Only consulted when translating the junction the channel is incident to;
/// plain nodes and ports ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Continuous carrier phase into a T-junction.
    Continuous,
    /// Dispersed droplet phase into a T-junction.
    Dispersed,
    /// Droplet output of a T-junction.
    Output,
    /// Separation channel of an electrophoretic cross (toward the anode).
    Separation,
    /// Tail channel of an electrophoretic cross (toward the cathode).
    Tail,
    /// No junction role.
    #[default]
    None,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Phase::Continuous => "continuous",
            Phase::Dispersed => "dispersed",
            Phase::Output => "output",
            Phase::Separation => "separation",
            Phase::Tail => "tail",
            Phase::None => "none",
        };
        write!(f, "{tag}")
    }
}

impl FromStr for Phase {
    type Err = SchematicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "continuous" => Ok(Phase::Continuous),
            "dispersed" => Ok(Phase::Dispersed),
            "output" => Ok(Phase::Output),
            "separation" => Ok(Phase::Separation),
            "tail" => Ok(Phase::Tail),
            "none" | "" => Ok(Phase::None),
            other => Err(SchematicError::phase(format!(
                "unrecognized phase tag '{other}'"
            ))),
        }
    }
}

/// Optional fixed attributes supplied when adding a channel.
///
/// `min_*` pins the attribute by equality; `max_width`/`max_height` tighten
/// the default upper bounds (fabrication resolution and etch depth). Unset
/// attributes stay free with the translation defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSpec {
    pub(crate) min_length: Option<f64>,
    pub(crate) min_width: Option<f64>,
    pub(crate) min_height: Option<f64>,
    pub(crate) max_width: Option<f64>,
    pub(crate) max_height: Option<f64>,
    pub(crate) min_sampling_time: Option<f64>,
    pub(crate) phase: Phase,
}

impl ChannelSpec {
    /// An all-free spec with no junction role.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the channel length.
    pub fn min_length(mut self, value: f64) -> Self {
        self.min_length = Some(value);
        self
    }

    /// Pin the cross-section width.
    pub fn min_width(mut self, value: f64) -> Self {
        self.min_width = Some(value);
        self
    }

    /// Pin the cross-section height.
    pub fn min_height(mut self, value: f64) -> Self {
        self.min_height = Some(value);
        self
    }

    /// Upper-bound the width (fabrication resolution).
    pub fn max_width(mut self, value: f64) -> Self {
        self.max_width = Some(value);
        self
    }

    /// Upper-bound the height (etch depth).
    pub fn max_height(mut self, value: f64) -> Self {
        self.max_height = Some(value);
        self
    }

    /// Minimum detector sampling interval (separation channels).
    pub fn min_sampling_time(mut self, value: f64) -> Self {
        self.min_sampling_time = Some(value);
        self
    }

    /// Set the junction role of this channel.
    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }
}

/// A directed micro-channel between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub(crate) id: ChannelId,
    pub(crate) from: NodeId,
    pub(crate) to: NodeId,
    pub(crate) shape: ChannelShape,
    pub(crate) length: Quantity,
    pub(crate) width: Quantity,
    pub(crate) height: Quantity,
    pub(crate) flow_rate: Quantity,
    pub(crate) droplet_volume: Quantity,
    pub(crate) viscosity: Quantity,
    pub(crate) resistance: Quantity,
    pub(crate) max_width: Option<f64>,
    pub(crate) max_height: Option<f64>,
    pub(crate) min_sampling_time: Option<f64>,
    pub(crate) phase: Phase,
}

impl Channel {
    /// Handle of this channel.
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Upstream endpoint.
    pub fn from(&self) -> NodeId {
        self.from
    }

    /// Downstream endpoint.
    pub fn to(&self) -> NodeId {
        self.to
    }

    /// Cross-section shape.
    pub fn shape(&self) -> ChannelShape {
        self.shape
    }

    /// Length attribute.
    pub fn length(&self) -> Quantity {
        self.length
    }

    /// Width attribute.
    pub fn width(&self) -> Quantity {
        self.width
    }

    /// Height attribute.
    pub fn height(&self) -> Quantity {
        self.height
    }

    /// Flow-rate attribute.
    pub fn flow_rate(&self) -> Quantity {
        self.flow_rate
    }

    /// Droplet-volume attribute.
    pub fn droplet_volume(&self) -> Quantity {
        self.droplet_volume
    }

    /// Viscosity attribute.
    pub fn viscosity(&self) -> Quantity {
        self.viscosity
    }

    /// Hydraulic-resistance attribute.
    pub fn resistance(&self) -> Quantity {
        self.resistance
    }

    /// Junction role of this channel.
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_parses_rectangle_only() {
        assert_eq!(
            "rectangle".parse::<ChannelShape>().unwrap(),
            ChannelShape::Rectangle
        );
        let err = "circle".parse::<ChannelShape>().unwrap_err();
        assert_eq!(err, SchematicError::InvalidShape("circle".to_string()));
    }

    #[test]
    fn phase_parses_all_tags() {
        for (tag, expected) in [
            ("continuous", Phase::Continuous),
            ("dispersed", Phase::Dispersed),
            ("output", Phase::Output),
            ("separation", Phase::Separation),
            ("tail", Phase::Tail),
            ("none", Phase::None),
        ] {
            assert_eq!(tag.parse::<Phase>().unwrap(), expected);
        }
        assert!("carrier".parse::<Phase>().is_err());
    }
}
