//! Read-only fluid property table.
//!
//! Keyed by fluid name; values feed node fixed attributes as plain numeric
//! literals. The compiler consumes this table, it does not validate it.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::schematic::AnalyteSet;

/// Bulk properties of a named working fluid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidProperties {
    /// Density, if characterized.
    pub density: Option<f64>,
    /// Electrical resistivity, if characterized.
    pub resistivity: Option<f64>,
    /// Dynamic viscosity, if characterized.
    pub viscosity: Option<f64>,
    /// Key into the analyte-group table ("none" when the fluid carries no
    /// analytes).
    pub analyte_group: &'static str,
}

lazy_static! {
    static ref FLUIDS: HashMap<&'static str, FluidProperties> = {
        let mut table = HashMap::new();
        table.insert(
            "default",
            FluidProperties {
                density: None,
                resistivity: None,
                viscosity: None,
                analyte_group: "none",
            },
        );
        table.insert(
            "water",
            FluidProperties {
                density: Some(999.87),
                resistivity: Some(18200.0),
                viscosity: Some(0.001),
                analyte_group: "none",
            },
        );
        table.insert(
            "mineraloil",
            FluidProperties {
                density: Some(800.0),
                resistivity: Some(10_000_000_000.0),
                viscosity: Some(0.0003051),
                analyte_group: "none",
            },
        );
        table.insert(
            "polyacrylamide",
            FluidProperties {
                density: Some(1100.0),
                resistivity: Some(14.28),
                viscosity: Some(0.003),
                analyte_group: "none",
            },
        );
        table.insert(
            "ep_cross_test_sample",
            FluidProperties {
                density: Some(999.87),
                resistivity: Some(18200.0),
                viscosity: Some(0.001),
                analyte_group: "ep_cross_test_analyte",
            },
        );
        table
    };
}

/// Look up a fluid by name.
pub fn fluid(name: &str) -> Option<&'static FluidProperties> {
    FLUIDS.get(name)
}

/// Per-analyte property arrays for an analyte group, if the group defines
/// any.
pub fn analytes(group: &str) -> Option<AnalyteSet> {
    match group {
        "ep_cross_test_analyte" => AnalyteSet::new(
            vec![0.1, 0.1, 0.1, 0.1],
            vec![0.2, 0.2, 0.2, 0.2],
            vec![0.05, 0.05, 0.05, 0.05],
            vec![-1.0, -2.0, -3.0, -4.0],
        )
        .ok(),
        _ => None,
    }
}
