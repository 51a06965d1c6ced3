//! SMT solver adapter for the schematic compiler.
//!
//! Lowers a compiled [`Formula`] into SMT-LIB s-expressions via `easy-smt`,
//! drives an external solver process (z3 by default), and converts the
//! check-sat outcome into a [`SatResult`]. Square roots are flattened into
//! fresh auxiliary variables (`s >= 0` and `s*s = t`) so the emitted formula
//! stays inside nonlinear real arithmetic.

use std::collections::HashMap;
use std::path::PathBuf;

use easy_smt::{Context, ContextBuilder, Response, SExpr, SExprData};
use thiserror::Error;
use tracing::{debug, warn};

use manifold_core::{Constraint, Expr, Formula, Model, Oracle, SatResult, VarId};

/// Errors from the solver boundary. `Unsat`/`Unknown` are results, not
/// errors, and never surface here.
#[derive(Debug, Error)]
pub enum SolverError {
    /// No solver binary could be located.
    #[error("Failed to find solver binary: {0}")]
    SolverNotFound(String),
    /// The solver process failed or spoke an unexpected protocol.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Oracle backed by an external SMT-LIB process.
///
/// Each [`Oracle::solve`] call spawns a fresh process, so queries never leak
/// state into one another.
#[derive(Debug, Clone)]
pub struct SmtOracle {
    program: PathBuf,
    args: Vec<String>,
}

impl SmtOracle {
    /// Locate `z3` on `PATH`.
    pub fn z3() -> Result<Self, SolverError> {
        let program =
            which::which("z3").map_err(|e| SolverError::SolverNotFound(e.to_string()))?;
        Ok(Self::with_binary(program, Self::z3_args()))
    }

    /// Use an explicit solver binary with the given arguments.
    pub fn with_binary(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Arguments for a z3 process reading SMT-LIB from stdin. Decimal
    /// pretty-printing keeps model values parseable instead of symbolic
    /// root objects.
    pub fn z3_args() -> Vec<String> {
        vec![
            "-smt2".to_string(),
            "-in".to_string(),
            "pp.decimal=true".to_string(),
        ]
    }

    fn spawn(&self) -> Result<Context, SolverError> {
        let ctx = ContextBuilder::new()
            .solver(self.program.as_os_str())
            .solver_args(self.args.iter())
            .build()?;
        Ok(ctx)
    }
}

impl Oracle for SmtOracle {
    type Error = SolverError;

    fn solve(&mut self, formula: Formula<'_>) -> Result<SatResult, SolverError> {
        let mut ctx = self.spawn()?;

        let mut lowering = Lowering::new();
        for (var, name) in formula.variables() {
            let sort = ctx.atom("Real");
            let symbol = ctx.declare_const(name, sort)?;
            lowering.vars.insert(var, symbol);
        }
        debug!(
            variables = lowering.vars.len(),
            constraints = formula.constraints().len(),
            "submitting formula"
        );

        for constraint in formula.constraints().iter() {
            let lowered = lowering.constraint(&mut ctx, constraint)?;
            ctx.assert(lowered)?;
        }

        match ctx.check()? {
            Response::Sat => {
                let model = extract_model(&mut ctx, &formula, &lowering)?;
                Ok(SatResult::Sat(model))
            }
            Response::Unsat => Ok(SatResult::Unsat),
            Response::Unknown => Ok(SatResult::Unknown),
        }
    }
}

/// State of one formula lowering: variable symbols plus the auxiliary
/// square-root definitions minted along the way.
struct Lowering {
    vars: HashMap<VarId, SExpr>,
    sqrt_count: usize,
}

impl Lowering {
    fn new() -> Self {
        Self {
            vars: HashMap::new(),
            sqrt_count: 0,
        }
    }

    fn constraint(
        &mut self,
        ctx: &mut Context,
        constraint: &Constraint,
    ) -> Result<SExpr, SolverError> {
        let lowered = match constraint {
            Constraint::Eq(a, b) => self.relation(ctx, "=", a, b)?,
            Constraint::Lt(a, b) => self.relation(ctx, "<", a, b)?,
            Constraint::Le(a, b) => self.relation(ctx, "<=", a, b)?,
            Constraint::Gt(a, b) => self.relation(ctx, ">", a, b)?,
            Constraint::Ge(a, b) => self.relation(ctx, ">=", a, b)?,
            Constraint::And(items) => {
                if items.is_empty() {
                    return Ok(ctx.atom("true"));
                }
                let mut parts = Vec::with_capacity(items.len() + 1);
                parts.push(ctx.atom("and"));
                for item in items {
                    parts.push(self.constraint(ctx, item)?);
                }
                ctx.list(parts)
            }
        };
        Ok(lowered)
    }

    fn relation(
        &mut self,
        ctx: &mut Context,
        op: &str,
        a: &Expr,
        b: &Expr,
    ) -> Result<SExpr, SolverError> {
        let lhs = self.expr(ctx, a)?;
        let rhs = self.expr(ctx, b)?;
        let head = ctx.atom(op);
        Ok(ctx.list(vec![head, lhs, rhs]))
    }

    fn expr(&mut self, ctx: &mut Context, expr: &Expr) -> Result<SExpr, SolverError> {
        let lowered = match expr {
            Expr::Var(var) => self.vars[var],
            Expr::Lit(value) => real_literal(ctx, *value),
            Expr::Add(a, b) => self.binary(ctx, "+", a, b)?,
            Expr::Sub(a, b) => self.binary(ctx, "-", a, b)?,
            Expr::Mul(a, b) => self.binary(ctx, "*", a, b)?,
            Expr::Div(a, b) => self.binary(ctx, "/", a, b)?,
            Expr::Sqrt(a) => {
                // sqrt(t) becomes a fresh s with s >= 0 and s*s = t, keeping
                // the formula polynomial.
                let operand = self.expr(ctx, a)?;
                let name = format!("sqrt_aux_{}", self.sqrt_count);
                self.sqrt_count += 1;
                let sort = ctx.atom("Real");
                let symbol = ctx.declare_const(name, sort)?;
                let zero = real_literal(ctx, 0.0);
                let ge = ctx.atom(">=");
                let non_negative = ctx.list(vec![ge, symbol, zero]);
                ctx.assert(non_negative)?;
                let times = ctx.atom("*");
                let squared = ctx.list(vec![times, symbol, symbol]);
                let eq = ctx.atom("=");
                let definition = ctx.list(vec![eq, squared, operand]);
                ctx.assert(definition)?;
                symbol
            }
        };
        Ok(lowered)
    }

    fn binary(
        &mut self,
        ctx: &mut Context,
        op: &str,
        a: &Expr,
        b: &Expr,
    ) -> Result<SExpr, SolverError> {
        let lhs = self.expr(ctx, a)?;
        let rhs = self.expr(ctx, b)?;
        let head = ctx.atom(op);
        Ok(ctx.list(vec![head, lhs, rhs]))
    }
}

/// Emit a finite `f64` as an SMT-LIB real literal. Rust's positional float
/// formatting never produces exponent notation, which SMT-LIB would reject.
fn real_literal(ctx: &mut Context, value: f64) -> SExpr {
    if value < 0.0 {
        let magnitude = real_literal(ctx, -value);
        let minus = ctx.atom("-");
        ctx.list(vec![minus, magnitude])
    } else if value.fract() == 0.0 {
        ctx.atom(format!("{value:.1}"))
    } else {
        ctx.atom(format!("{value}"))
    }
}

fn extract_model(
    ctx: &mut Context,
    formula: &Formula<'_>,
    lowering: &Lowering,
) -> Result<Model, SolverError> {
    let order: Vec<(VarId, &str)> = formula.variables().collect();
    let symbols: Vec<SExpr> = order.iter().map(|(var, _)| lowering.vars[var]).collect();
    let values = ctx.get_value(symbols)?;

    let mut model = Model::new();
    for ((_, name), (_, value)) in order.iter().zip(values) {
        match parse_value(ctx, value) {
            Some(parsed) => model.insert(*name, parsed),
            None => warn!(
                variable = name,
                value = %ctx.display(value),
                "model value is not numeric; leaving it unassigned"
            ),
        }
    }
    Ok(model)
}

/// Parse a model value: plain decimals (z3's `pp.decimal` may append `?` to
/// truncated algebraics), rationals `(/ a b)`, and negations `(- a)`.
fn parse_value(ctx: &Context, value: SExpr) -> Option<f64> {
    match ctx.get(value) {
        SExprData::Atom(atom) => atom.trim_end_matches('?').parse::<f64>().ok(),
        SExprData::List(items) => match items {
            [head, operand] => match ctx.get(*head) {
                SExprData::Atom("-") => Some(-parse_value(ctx, *operand)?),
                _ => None,
            },
            [head, numerator, denominator] => match ctx.get(*head) {
                SExprData::Atom("/") => {
                    Some(parse_value(ctx, *numerator)? / parse_value(ctx, *denominator)?)
                }
                _ => None,
            },
            _ => None,
        },
        SExprData::String(_) => None,
    }
}
