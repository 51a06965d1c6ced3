//! Strategy for rectangular channels.

use crate::error::SchematicError;
use crate::expr::Constraint;
use crate::physics;
use crate::registry::ChannelId;
use crate::translate::Translator;

impl Translator<'_> {
    /// Rectangular channel: length pinned to the endpoint geometry,
    /// cross-section within fabrication bounds, viscosity and flow carried
    /// from the upstream node, and the resistive law with its `h < w`
    /// validity precondition. Recurses into the downstream node.
    pub(super) fn translate_rectangular(&mut self, id: ChannelId) -> Result<(), SchematicError> {
        let channel = self.channel(id);
        let (length, width, height) = (channel.length(), channel.width(), channel.height());
        let (flow_rate, viscosity, resistance) =
            (channel.flow_rate(), channel.viscosity(), channel.resistance());
        let (max_width, max_height) = (channel.max_width, channel.max_height);
        let (from, to) = (channel.from(), channel.to());
        let upstream_viscosity = self.node(from).viscosity().var;
        let upstream_flow = self.node(from).flow_rate().var;
        let downstream_viscosity = self.node(to).viscosity().var;

        // Length is the Euclidean distance between the endpoints.
        self.push(physics::pythagorean_length(
            self.position(from),
            self.position(to),
            length.var.into(),
        ));
        self.fix_or_gt(length, 0.0);

        self.fix_or_gt(width, 0.0);
        self.push(Constraint::lt(
            width.var,
            max_width.unwrap_or(physics::DEFAULT_MAX_WIDTH),
        ));
        self.fix_or_gt(height, physics::MIN_CHANNEL_HEIGHT);
        self.push(Constraint::lt(
            height.var,
            max_height.unwrap_or(physics::DEFAULT_MAX_HEIGHT),
        ));

        // Viscosity is constant along the channel; propagate it downstream
        // before the resistance law consumes it.
        self.push(Constraint::eq(viscosity.var, upstream_viscosity));
        self.push(Constraint::eq(downstream_viscosity, upstream_viscosity));

        // The rectangular-duct law requires a shallow cross-section.
        self.push(Constraint::lt(height.var, width.var));
        self.push(Constraint::eq(
            resistance.var,
            physics::channel_resistance(
                viscosity.var.into(),
                length.var.into(),
                width.var.into(),
                height.var.into(),
            ),
        ));
        self.push(Constraint::gt(resistance.var, 0.0));

        // Flow is conserved along the channel.
        self.push(Constraint::eq(flow_rate.var, upstream_flow));

        self.translate_node(to)
    }
}
