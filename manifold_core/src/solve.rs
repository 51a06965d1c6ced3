//! Oracle boundary: compiled formulas, results, and the capability trait.
//!
//! The concrete satisfiability backend lives behind [`Oracle`] so it can be
//! swapped without touching the compiler. `Unsat` and `Unknown` are normal
//! outcomes a caller branches on — only backend failures (a missing binary,
//! a broken pipe) surface as errors.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::SchematicError;
use crate::eval;
use crate::expr::{Constraint, ConstraintSet, Expr};
use crate::registry::{VarId, VariableRegistry};
use crate::schematic::Schematic;
use crate::translate::CompileOptions;

/// A compiled formula: the constraint conjunction plus its variable table.
#[derive(Debug, Clone, Copy)]
pub struct Formula<'a> {
    constraints: &'a ConstraintSet,
    registry: &'a VariableRegistry,
}

impl<'a> Formula<'a> {
    /// View a constraint set together with the registry that names its
    /// variables.
    pub fn new(constraints: &'a ConstraintSet, registry: &'a VariableRegistry) -> Self {
        Self {
            constraints,
            registry,
        }
    }

    /// The constraint conjunction.
    pub fn constraints(&self) -> &'a ConstraintSet {
        self.constraints
    }

    /// All variables in minting order.
    pub fn variables(&self) -> impl Iterator<Item = (VarId, &'a str)> {
        self.registry.iter()
    }

    /// Name of one variable.
    pub fn name(&self, var: VarId) -> &'a str {
        self.registry.name(var)
    }

    fn render_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Var(var) => self.name(*var).to_string(),
            Expr::Lit(value) => format!("{value}"),
            Expr::Add(a, b) => format!("({} + {})", self.render_expr(a), self.render_expr(b)),
            Expr::Sub(a, b) => format!("({} - {})", self.render_expr(a), self.render_expr(b)),
            Expr::Mul(a, b) => format!("({} * {})", self.render_expr(a), self.render_expr(b)),
            Expr::Div(a, b) => format!("({} / {})", self.render_expr(a), self.render_expr(b)),
            Expr::Sqrt(a) => format!("sqrt({})", self.render_expr(a)),
        }
    }

    fn render_constraint(&self, constraint: &Constraint) -> String {
        match constraint {
            Constraint::Eq(a, b) => {
                format!("{} == {}", self.render_expr(a), self.render_expr(b))
            }
            Constraint::Lt(a, b) => format!("{} < {}", self.render_expr(a), self.render_expr(b)),
            Constraint::Le(a, b) => format!("{} <= {}", self.render_expr(a), self.render_expr(b)),
            Constraint::Gt(a, b) => format!("{} > {}", self.render_expr(a), self.render_expr(b)),
            Constraint::Ge(a, b) => format!("{} >= {}", self.render_expr(a), self.render_expr(b)),
            Constraint::And(items) => {
                let parts: Vec<String> =
                    items.iter().map(|item| self.render_constraint(item)).collect();
                format!("({})", parts.join(" && "))
            }
        }
    }
}

impl fmt::Display for Formula<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for constraint in self.constraints.iter() {
            writeln!(f, "{}", self.render_constraint(constraint))?;
        }
        Ok(())
    }
}

/// A satisfying assignment: variable name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Model {
    values: IndexMap<String, f64>,
}

impl Model {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one assignment.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Value assigned to a variable name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the model carries no assignments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate assignments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Re-evaluate every constraint of `formula` under this assignment.
    ///
    /// Returns false when any constraint fails within `tol`, or when a
    /// referenced variable has no assignment.
    pub fn satisfies(&self, formula: &Formula<'_>, tol: f64) -> bool {
        let lookup = |var: VarId| self.get(formula.name(var));
        for constraint in formula.constraints().iter() {
            match eval::holds(constraint, &lookup, tol) {
                Some(true) => {}
                Some(false) => {
                    warn!(
                        constraint = %formula.render_constraint(constraint),
                        "model violates constraint"
                    );
                    return false;
                }
                None => {
                    warn!(
                        constraint = %formula.render_constraint(constraint),
                        "model leaves constraint variables unassigned"
                    );
                    return false;
                }
            }
        }
        true
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}

/// Outcome of an oracle query.
#[derive(Debug, Clone, PartialEq)]
pub enum SatResult {
    /// The formula is satisfiable; a witness assignment is attached.
    Sat(Model),
    /// The formula is unsatisfiable: the design is not realizable.
    Unsat,
    /// The backend could not decide the formula.
    Unknown,
}

impl SatResult {
    /// Whether this is a `Sat` outcome.
    pub fn is_sat(&self) -> bool {
        matches!(self, SatResult::Sat(_))
    }

    /// The witness model of a `Sat` outcome.
    pub fn model(&self) -> Option<&Model> {
        match self {
            SatResult::Sat(model) => Some(model),
            _ => None,
        }
    }
}

/// Capability interface for satisfiability backends.
pub trait Oracle {
    /// Backend failure type. `Unsat`/`Unknown` are results, not errors.
    type Error;

    /// Decide one formula.
    fn solve(&mut self, formula: Formula<'_>) -> Result<SatResult, Self::Error>;
}

/// Error from [`Schematic::solve_with`]: compilation or backend failure.
#[derive(Debug, Error)]
pub enum SolveError<E> {
    /// The schematic failed to compile.
    #[error(transparent)]
    Compile(#[from] SchematicError),
    /// The backend failed outside the `Sat`/`Unsat`/`Unknown` protocol.
    #[error("solver backend failed: {0}")]
    Oracle(E),
}

impl Schematic {
    /// Compile this schematic and hand the formula to `oracle`.
    ///
    /// `show` renders the fully conjoined formula to the debug trace without
    /// altering behavior.
    pub fn solve_with<O: Oracle>(
        &mut self,
        oracle: &mut O,
        show: bool,
    ) -> Result<SatResult, SolveError<O::Error>> {
        let constraints = self.compile(&CompileOptions::default())?;
        let formula = Formula::new(&constraints, &self.registry);
        if show {
            debug!("compiled formula:\n{formula}");
        }
        oracle.solve(formula).map_err(SolveError::Oracle)
    }
}
