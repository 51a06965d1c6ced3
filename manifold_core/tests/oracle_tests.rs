//! The oracle capability boundary and model checking.

use std::convert::Infallible;

use manifold_core::{
    Attr, ChannelShape, ChannelSpec, ChipDims, CompileOptions, Constraint, ConstraintSet, Formula,
    Model, NodeKind, NodeSpec, Oracle, SatResult, Schematic, SchematicError, SolveError,
};

/// Backend stand-in that returns a canned result.
struct StubOracle {
    result: SatResult,
    calls: usize,
}

impl StubOracle {
    fn new(result: SatResult) -> Self {
        Self { result, calls: 0 }
    }
}

impl Oracle for StubOracle {
    type Error = Infallible;

    fn solve(&mut self, _formula: Formula<'_>) -> Result<SatResult, Self::Error> {
        self.calls += 1;
        Ok(self.result.clone())
    }
}

fn line() -> Schematic {
    let mut sch = Schematic::new(ChipDims::default());
    sch.add_port("inlet", NodeKind::Input, NodeSpec::new().min_pressure(1.0))
        .unwrap();
    sch.add_port("outlet", NodeKind::Output, NodeSpec::new())
        .unwrap();
    sch.add_channel("inlet", "outlet", ChannelShape::Rectangle, ChannelSpec::new())
        .unwrap();
    sch
}

#[test]
fn solve_with_passes_oracle_outcomes_through() {
    let mut sch = line();
    for canned in [SatResult::Unsat, SatResult::Unknown] {
        let mut oracle = StubOracle::new(canned.clone());
        let result = sch.solve_with(&mut oracle, false).unwrap();
        assert_eq!(result, canned);
        assert_eq!(oracle.calls, 1);
    }
}

#[test]
fn solve_with_reports_compile_errors_before_the_oracle() {
    let mut sch = Schematic::new(ChipDims::default());
    sch.add_port("inlet", NodeKind::Input, NodeSpec::new()).unwrap();
    let mut oracle = StubOracle::new(SatResult::Unsat);
    let err = sch.solve_with(&mut oracle, false).unwrap_err();
    match err {
        SolveError::Compile(inner) => {
            assert_eq!(inner, SchematicError::NoConnection("inlet".to_string()));
        }
        SolveError::Oracle(_) => panic!("oracle must not be reached"),
    }
    assert_eq!(oracle.calls, 0);
}

#[test]
fn model_checking_accepts_a_consistent_assignment() {
    let mut sch = line();
    sch.compile(&CompileOptions::default()).unwrap();
    let pressure = sch.node_variable("inlet", &Attr::Pressure).unwrap();
    let flow = sch.node_variable("inlet", &Attr::FlowRate).unwrap();

    let mut set = ConstraintSet::new();
    set.push(Constraint::eq(pressure, 1.0));
    set.push(Constraint::gt(flow, 0.0));
    let formula = Formula::new(&set, sch.registry());

    let mut model = Model::new();
    model.insert("inlet_pressure", 1.0);
    model.insert("inlet_flow_rate", 0.25);
    assert!(model.satisfies(&formula, 1e-9));

    let mut bad = Model::new();
    bad.insert("inlet_pressure", 2.0);
    bad.insert("inlet_flow_rate", 0.25);
    assert!(!bad.satisfies(&formula, 1e-9));

    // missing assignments are a failure, not a pass
    let empty = Model::new();
    assert!(!empty.satisfies(&formula, 1e-9));
}

#[test]
fn formula_renders_with_variable_names() {
    let mut sch = line();
    sch.compile(&CompileOptions::default()).unwrap();
    let pressure = sch.node_variable("inlet", &Attr::Pressure).unwrap();
    let mut set = ConstraintSet::new();
    set.push(Constraint::eq(pressure, 1.0));
    let formula = Formula::new(&set, sch.registry());
    assert_eq!(format!("{formula}"), "inlet_pressure == 1\n");
}
