//! Strategy for electrophoretic cross junctions.
//!
//! A cross separates charged analytes along an anode-cathode axis driven by
//! an electric field, while the injection/waste axis loads the sample. The
//! constraints require every adjacent pair of analyte peaks to arrive at the
//! detector far enough apart in time, and comparable enough in height, to be
//! resolved.

use itertools::Itertools;

use crate::error::SchematicError;
use crate::expr::{Constraint, Expr};
use crate::physics;
use crate::registry::{Attr, ChannelId, EntityId, NodeId, VarId};
use crate::schematic::{NodeKind, Phase};
use crate::translate::Translator;

impl Translator<'_> {
    /// Electrophoretic cross: a 4-way junction with separation and tail
    /// channels on the electrode axis, and injection/waste channels on the
    /// sample axis.
    pub(super) fn translate_ep_cross(&mut self, id: NodeId) -> Result<(), SchematicError> {
        let name = self.node(id).name().to_string();
        let preds = self.incoming[id.index()].clone();
        let succs = self.outgoing[id.index()].clone();
        if preds.len() + succs.len() != 4 {
            return Err(SchematicError::topology(format!(
                "electrophoretic cross '{name}' must have exactly 4 connections, found {}",
                preds.len() + succs.len()
            )));
        }

        self.translate_plain(id)?;

        // The separation channel leaves the cross toward the anode; the
        // tail reaches the cathode from either side.
        let separation = succs
            .iter()
            .copied()
            .find(|cid| self.channel(*cid).phase() == Phase::Separation)
            .ok_or_else(|| {
                SchematicError::phase(format!(
                    "electrophoretic cross '{name}' has no separation channel"
                ))
            })?;
        let tail = preds
            .iter()
            .chain(succs.iter())
            .copied()
            .find(|cid| self.channel(*cid).phase() == Phase::Tail)
            .ok_or_else(|| {
                SchematicError::phase(format!(
                    "electrophoretic cross '{name}' has no tail channel"
                ))
            })?;
        let anode = self.channel(separation).to();
        let tail_channel = self.channel(tail);
        let cathode = if tail_channel.from() == id {
            tail_channel.to()
        } else {
            tail_channel.from()
        };

        // Sample axis: injection comes in from an input port, waste drains
        // to an output port.
        let injection = preds
            .iter()
            .copied()
            .filter(|cid| *cid != tail)
            .find(|cid| self.node(self.channel(*cid).from()).kind() == NodeKind::Input)
            .ok_or_else(|| {
                SchematicError::topology(format!(
                    "electrophoretic cross '{name}' has no injection channel from an input port"
                ))
            })?;
        let waste = succs
            .iter()
            .copied()
            .filter(|cid| *cid != separation && *cid != tail)
            .find(|cid| self.node(self.channel(*cid).to()).kind() == NodeKind::Output)
            .ok_or_else(|| {
                SchematicError::topology(format!(
                    "electrophoretic cross '{name}' has no waste channel to an output port"
                ))
            })?;

        self.axis_dimension_equalities(separation, tail, injection, waste);

        // Electric field along the electrode axis: E * d == U with the axis
        // length tied to the electrode positions.
        let entity = EntityId::Node(id);
        let axis_length = self.registry.intern(entity, Attr::AxisLength, &name);
        self.push(physics::pythagorean_length(
            self.position(anode),
            self.position(cathode),
            axis_length.into(),
        ));
        self.push(Constraint::gt(axis_length, 0.0));
        let voltage = self.registry.intern(entity, Attr::Voltage, &name);
        self.push(Constraint::gt(voltage, 0.0));
        let field = self.registry.intern(entity, Attr::ElectricField, &name);
        self.push(Constraint::eq(
            Expr::from(field) * Expr::from(axis_length),
            voltage,
        ));
        self.push(Constraint::gt(field, 0.0));

        // The detector sits somewhere along the separation channel.
        let detector = self.registry.intern(entity, Attr::DetectorPosition, &name);
        self.push(Constraint::gt(detector, 0.0));
        self.push(Constraint::le(
            detector,
            self.channel(separation).length().var,
        ));

        // Analyte data rides in on the injection port.
        let injection_port = self.node(self.channel(injection).from());
        let injection_name = injection_port.name().to_string();
        let analytes = injection_port
            .analytes()
            .cloned()
            .ok_or_else(|| SchematicError::MissingAnalyteData(injection_name.clone()))?;
        if analytes.is_empty() {
            return Err(SchematicError::MissingAnalyteData(injection_name));
        }

        let separation_viscosity = self.channel(separation).viscosity().var;
        let sampling_time = self
            .channel(separation)
            .min_sampling_time
            .unwrap_or(physics::DEFAULT_MIN_SAMPLING_TIME);

        // Per-analyte mobility, drift velocity, and detector peak time.
        let mut peaks: Vec<(VarId, VarId)> = Vec::with_capacity(analytes.len());
        for i in 0..analytes.len() {
            let mobility = self.registry.intern(entity, Attr::Mobility(i), &name);
            self.push(Constraint::eq(
                mobility,
                physics::stokes_mobility(
                    analytes.charge(i),
                    analytes.radius(i),
                    separation_viscosity.into(),
                ),
            ));
            let velocity = self.registry.intern(entity, Attr::DriftVelocity(i), &name);
            self.push(Constraint::eq(
                velocity,
                physics::drift_velocity(mobility.into(), field.into()),
            ));
            let peak_time = self.registry.intern(entity, Attr::PeakTime(i), &name);
            self.push(Constraint::eq(
                peak_time,
                Expr::from(detector) / Expr::from(velocity),
            ));
            peaks.push((mobility, peak_time));
        }

        // Adjacent peaks must be separable in time and comparable in height.
        // The gap is squared so the elution order stays free and the term
        // stays polynomial.
        for (i, ((mobility, peak_time), (next_mobility, next_peak_time))) in
            peaks.iter().copied().tuple_windows().enumerate()
        {
            let gap = Expr::from(next_peak_time) - Expr::from(peak_time);
            self.push(Constraint::ge(
                gap.powi(2),
                sampling_time * sampling_time,
            ));
            let ratio = self.registry.intern(entity, Attr::PeakRatio(i), &name);
            self.push(Constraint::eq(
                ratio,
                physics::peak_height_ratio(
                    analytes.initial_concentration(i),
                    analytes.initial_concentration(i + 1),
                    analytes.diffusivity(i),
                    analytes.diffusivity(i + 1),
                    mobility.into(),
                    next_mobility.into(),
                ),
            ));
            self.push(Constraint::ge(ratio, physics::RESOLVABILITY_RATIO));
            self.push(Constraint::le(ratio, 1.0 / physics::RESOLVABILITY_RATIO));
        }
        Ok(())
    }

    /// Channels across each axis of the cross share their cross-section.
    fn axis_dimension_equalities(
        &mut self,
        separation: ChannelId,
        tail: ChannelId,
        injection: ChannelId,
        waste: ChannelId,
    ) {
        let (sep_width, sep_height) = {
            let channel = self.channel(separation);
            (channel.width().var, channel.height().var)
        };
        let (tail_width, tail_height) = {
            let channel = self.channel(tail);
            (channel.width().var, channel.height().var)
        };
        let (inj_width, inj_height) = {
            let channel = self.channel(injection);
            (channel.width().var, channel.height().var)
        };
        let (waste_width, waste_height) = {
            let channel = self.channel(waste);
            (channel.width().var, channel.height().var)
        };

        self.push(Constraint::eq(tail_width, sep_width));
        self.push(Constraint::eq(tail_height, sep_height));
        self.push(Constraint::eq(inj_width, waste_width));
        self.push(Constraint::eq(inj_height, waste_height));
        self.push(Constraint::eq(inj_height, sep_height));
    }
}
