//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Check whether the demo droplet-generator chip is physically realizable.
#[derive(Debug, Parser)]
#[command(
    name = "manifold",
    about = "Microfluidic schematic feasibility checker"
)]
pub struct Args {
    /// Render the compiled formula before solving.
    #[arg(long)]
    pub show: bool,

    /// Print the model as JSON instead of name = value lines.
    #[arg(long)]
    pub json: bool,

    /// Path to an SMT-LIB solver binary (defaults to z3 on PATH).
    #[arg(long)]
    pub solver: Option<PathBuf>,

    /// Critical crossing angle at the T-junction, in degrees.
    #[arg(long, default_value_t = 0.5)]
    pub crit_angle: f64,
}
