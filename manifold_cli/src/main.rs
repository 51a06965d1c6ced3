//! Manifold demo CLI.
//!
//! Builds the droplet-generator demo schematic (two pressure-driven inlets
//! merging at a T-junction into one outlet), compiles it to a nonlinear
//! real-arithmetic formula, and asks z3 whether the chip is realizable.

mod args;

use clap::Parser;
use tracing::info;

use args::Args;
use manifold_core::{
    ChannelShape, ChannelSpec, ChipDims, CompileOptions, Formula, NodeKind, NodeSpec, Oracle,
    Phase, SatResult, Schematic,
};
use manifold_solver::SmtOracle;

/// The demo circuit:
///
/// ```text
///      dispersed
///          |
/// continuous --- junction --- out
/// ```
fn demo_schematic() -> Result<Schematic, Box<dyn std::error::Error>> {
    let mut sch = Schematic::new(ChipDims::new(0.0, 0.0, 10.0, 10.0));
    sch.add_port(
        "continuous",
        NodeKind::Input,
        NodeSpec::new().min_pressure(1.0),
    )?;
    sch.add_port(
        "dispersed",
        NodeKind::Input,
        NodeSpec::new().min_pressure(1.0),
    )?;
    sch.add_port("out", NodeKind::Output, NodeSpec::new())?;
    sch.add_node("junction", NodeKind::TJunction, NodeSpec::new().at(1.0, 0.0))?;
    sch.add_channel(
        "junction",
        "out",
        ChannelShape::Rectangle,
        ChannelSpec::new().phase(Phase::Output),
    )?;
    sch.add_channel(
        "continuous",
        "junction",
        ChannelShape::Rectangle,
        ChannelSpec::new().phase(Phase::Continuous),
    )?;
    sch.add_channel(
        "dispersed",
        "junction",
        ChannelShape::Rectangle,
        ChannelSpec::new().phase(Phase::Dispersed),
    )?;
    Ok(sch)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut sch = demo_schematic()?;

    let options = CompileOptions {
        crit_crossing_angle: args.crit_angle,
    };
    let constraints = sch.compile(&options)?;
    let formula = Formula::new(&constraints, sch.registry());
    info!(
        constraints = constraints.len(),
        variables = sch.registry().len(),
        "compiled demo schematic"
    );
    if args.show {
        println!("{formula}");
    }

    let mut oracle = match args.solver {
        Some(path) => SmtOracle::with_binary(path, SmtOracle::z3_args()),
        None => SmtOracle::z3()?,
    };
    match oracle.solve(formula)? {
        SatResult::Sat(model) => {
            println!("sat");
            if args.json {
                println!("{}", serde_json::to_string_pretty(&model)?);
            } else {
                print!("{model}");
            }
        }
        SatResult::Unsat => println!("unsat: the schematic is not realizable as constrained"),
        SatResult::Unknown => println!("unknown: the solver could not decide the formula"),
    }
    Ok(())
}
