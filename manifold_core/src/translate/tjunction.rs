//! Strategy for droplet-generating T-junctions.

use crate::error::SchematicError;
use crate::expr::{Constraint, Expr};
use crate::physics;
use crate::registry::{Attr, ChannelId, EntityId, NodeId};
use crate::schematic::Phase;
use crate::translate::Translator;

impl Translator<'_> {
    /// T-junction: one continuous and one dispersed inlet merge into a
    /// single output channel, generating droplets. Inlet roles are
    /// determined by phase tag, not by edge order.
    pub(super) fn translate_tjunction(&mut self, id: NodeId) -> Result<(), SchematicError> {
        let name = self.node(id).name().to_string();
        let preds = self.incoming[id.index()].clone();
        let succs = self.outgoing[id.index()].clone();
        if preds.len() + succs.len() != 3 {
            return Err(SchematicError::topology(format!(
                "t-junction '{name}' must have exactly 3 connections, found {}",
                preds.len() + succs.len()
            )));
        }
        if succs.len() != 1 {
            return Err(SchematicError::topology(format!(
                "t-junction '{name}' must have exactly one output channel"
            )));
        }

        self.translate_plain(id)?;

        let output = succs[0];
        let output_channel = self.channel(output);
        let (out_width, out_height) = (output_channel.width().var, output_channel.height().var);
        let (out_flow, out_droplet_volume) = (
            output_channel.flow_rate().var,
            output_channel.droplet_volume().var,
        );
        let output_node = output_channel.to();

        // The inlets are identified by their phase tags.
        let mut continuous: Option<ChannelId> = None;
        let mut dispersed: Option<ChannelId> = None;
        for cid in &preds {
            let channel = self.channel(*cid);
            match channel.phase() {
                Phase::Continuous => {
                    let (width, height) = (channel.width().var, channel.height().var);
                    continuous = Some(*cid);
                    // Continuous inlet matches the output cross-section.
                    self.push(Constraint::eq(width, out_width));
                    self.push(Constraint::eq(height, out_height));
                }
                Phase::Dispersed => {
                    let height = channel.height().var;
                    dispersed = Some(*cid);
                    // Only the height of the dispersed inlet must match.
                    self.push(Constraint::eq(height, out_height));
                }
                Phase::Output => {}
                other => {
                    return Err(SchematicError::phase(format!(
                        "channel into t-junction '{name}' has phase '{other}'"
                    )));
                }
            }
        }
        let continuous = continuous.ok_or_else(|| {
            SchematicError::phase(format!("t-junction '{name}' has no continuous-phase inlet"))
        })?;
        let dispersed = dispersed.ok_or_else(|| {
            SchematicError::phase(format!("t-junction '{name}' has no dispersed-phase inlet"))
        })?;

        // Corner rounding where the inlets join; sharpness is free but
        // non-negative.
        let epsilon = self
            .registry
            .intern(EntityId::Node(id), Attr::Epsilon, &name);
        self.push(Constraint::ge(epsilon, 0.0));

        let continuous_channel = self.channel(continuous);
        let continuous_node = continuous_channel.from();
        let continuous_flow = continuous_channel.flow_rate().var;
        let dispersed_channel = self.channel(dispersed);
        let dispersed_node = dispersed_channel.from();
        let dispersed_flow = dispersed_channel.flow_rate().var;
        let dispersed_width = dispersed_channel.width().var;

        // Carrier viscosity is what reaches the output.
        self.push(Constraint::eq(
            self.node(continuous_node).viscosity().var,
            self.node(output_node).viscosity().var,
        ));

        // Flow into the junction equals flow out.
        self.push(Constraint::eq(
            Expr::from(continuous_flow) + Expr::from(dispersed_flow),
            out_flow,
        ));

        // Continuous inlet, junction, and output sit on a straight line.
        self.push(Constraint::eq(
            physics::triangle_area(
                self.position(continuous_node),
                self.position(id),
                self.position(output_node),
            ),
            0.0,
        ));

        // Droplet volume in the output channel follows the closed form.
        let volume = physics::droplet_volume(
            out_height.into(),
            out_width.into(),
            dispersed_width.into(),
            epsilon.into(),
            self.node(dispersed_node).flow_rate().var.into(),
            self.node(continuous_node).flow_rate().var.into(),
        );
        self.push(Constraint::eq(out_droplet_volume, volume));

        // No pair of channels may cross at more than the critical angle.
        let cos2_crit = self
            .options
            .crit_crossing_angle
            .to_radians()
            .cos()
            .powi(2);
        self.push(Constraint::le(
            cos2_crit,
            physics::cosine_squared(
                self.position(continuous_node),
                self.position(id),
                self.position(dispersed_node),
            ),
        ));
        self.push(Constraint::le(
            cos2_crit,
            physics::cosine_squared(
                self.position(continuous_node),
                self.position(id),
                self.position(output_node),
            ),
        ));
        self.push(Constraint::le(
            cos2_crit,
            physics::cosine_squared(
                self.position(output_node),
                self.position(id),
                self.position(dispersed_node),
            ),
        ));

        self.translate_node(output_node)
    }
}
