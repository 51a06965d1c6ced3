//! Strategies for plain nodes and fluid ports.

use itertools::Itertools;

use crate::error::SchematicError;
use crate::expr::{Constraint, Expr};
use crate::physics;
use crate::registry::{ChannelId, NodeId, VarId};
use crate::translate::{Translator, sum_exprs};

impl Translator<'_> {
    /// Shared node logic: pressure coupling to inbound channels,
    /// fixed-or-bounded attributes, density propagation, and recursion into
    /// every outgoing channel.
    pub(super) fn translate_plain(&mut self, id: NodeId) -> Result<(), SchematicError> {
        let node = self.node(id);
        let (pressure, flow_rate, viscosity, density) = (
            node.pressure(),
            node.flow_rate(),
            node.viscosity(),
            node.density(),
        );
        let (x, y) = (node.x(), node.y());
        let preds = self.incoming[id.index()].clone();
        let succs = self.outgoing[id.index()].clone();

        // What each inbound channel delivers after its resistive drop.
        let mut inbound = Vec::with_capacity(preds.len());
        for cid in &preds {
            let channel = self.channel(*cid);
            let upstream = self.node(channel.from());
            inbound.push(physics::channel_output_pressure(
                upstream.pressure().var.into(),
                channel.flow_rate().var.into(),
                channel.resistance().var.into(),
            ));
        }
        if let Some(total) = sum_exprs(inbound) {
            self.push(Constraint::eq(pressure.var, total));
        }

        self.fix_or_ge(x, 0.0);
        self.fix_or_ge(y, 0.0);
        self.fix_or_gt(pressure, 0.0);
        self.fix_or_gt(flow_rate, 0.0);
        self.fix_or_gt(viscosity, 0.0);
        self.fix_or_gt(density, 0.0);

        // Forward a common inlet density.
        let upstream_densities: Vec<VarId> = preds
            .iter()
            .map(|cid| self.node(self.channel(*cid).from()).density().var)
            .collect();
        if !upstream_densities.is_empty() && upstream_densities.iter().all_equal() {
            self.push(Constraint::eq(density.var, upstream_densities[0]));
        }

        for cid in succs {
            self.translate_channel(cid)?;
        }
        Ok(())
    }

    /// Input ports are traversal roots: at least one outgoing channel, no
    /// inbound ones. An unfixed flow rate is derived from the outgoing
    /// cross-sections and the port pressure.
    pub(super) fn translate_input(&mut self, id: NodeId) -> Result<(), SchematicError> {
        let node = self.node(id);
        let name = node.name().to_string();
        let (pressure, flow_rate, density) = (node.pressure(), node.flow_rate(), node.density());
        let preds: &[ChannelId] = &self.incoming[id.index()];
        if !preds.is_empty() {
            return Err(SchematicError::topology(format!(
                "input port '{name}' cannot have inbound channels"
            )));
        }
        let succs = self.outgoing[id.index()].clone();
        if succs.is_empty() {
            return Err(SchematicError::NoConnection(name));
        }

        self.translate_plain(id)?;

        if flow_rate.fixed.is_none() {
            let mut outflow = Vec::with_capacity(succs.len());
            for cid in &succs {
                let channel = self.channel(*cid);
                outflow.push(physics::port_channel_outflow(
                    channel.width().var.into(),
                    channel.height().var.into(),
                    pressure.var.into(),
                    density.var.into(),
                ));
            }
            if let Some(total) = sum_exprs(outflow) {
                self.push(Constraint::eq(flow_rate.var, total));
            }
        }
        // Sanity ceiling on what a port can push.
        self.push(Constraint::lt(flow_rate.var, physics::MAX_PORT_FLOW_RATE));
        Ok(())
    }

    /// Output ports are sinks: at least one inbound channel, no outgoing
    /// ones. An unfixed flow rate equals the sum of inbound channel flows.
    pub(super) fn translate_output(&mut self, id: NodeId) -> Result<(), SchematicError> {
        let node = self.node(id);
        let name = node.name().to_string();
        let flow_rate = node.flow_rate();
        let succs: &[ChannelId] = &self.outgoing[id.index()];
        if !succs.is_empty() {
            return Err(SchematicError::topology(format!(
                "output port '{name}' cannot have outbound channels"
            )));
        }
        let preds = self.incoming[id.index()].clone();
        if preds.is_empty() {
            return Err(SchematicError::NoConnection(name));
        }

        self.translate_plain(id)?;

        if flow_rate.fixed.is_none() {
            let inflow: Vec<Expr> = preds
                .iter()
                .map(|cid| self.channel(*cid).flow_rate().var.into())
                .collect();
            if let Some(total) = sum_exprs(inflow) {
                self.push(Constraint::eq(flow_rate.var, total));
            }
        }
        Ok(())
    }
}
