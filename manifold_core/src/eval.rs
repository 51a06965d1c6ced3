//! Numeric evaluation of expressions and constraints.
//!
//! Used to verify a returned model against the compiled formula and by tests
//! that check formula terms without a solver. Evaluation is plain `f64`
//! arithmetic; comparisons apply a caller-supplied tolerance.

use crate::expr::{Constraint, Expr};
use crate::registry::VarId;

/// Evaluate `expr` under the given variable lookup.
///
/// Returns `None` when a referenced variable has no value.
pub fn eval_expr<F>(expr: &Expr, get: &F) -> Option<f64>
where
    F: Fn(VarId) -> Option<f64>,
{
    match expr {
        Expr::Var(var) => get(*var),
        Expr::Lit(value) => Some(*value),
        Expr::Add(a, b) => Some(eval_expr(a, get)? + eval_expr(b, get)?),
        Expr::Sub(a, b) => Some(eval_expr(a, get)? - eval_expr(b, get)?),
        Expr::Mul(a, b) => Some(eval_expr(a, get)? * eval_expr(b, get)?),
        Expr::Div(a, b) => Some(eval_expr(a, get)? / eval_expr(b, get)?),
        Expr::Sqrt(a) => Some(eval_expr(a, get)?.sqrt()),
    }
}

/// Whether `constraint` holds under the given lookup, within `tol`.
///
/// Equalities compare within an absolute-plus-relative band; inequalities
/// are relaxed by `tol` so solver round-off does not flip a verdict.
/// Returns `None` when a referenced variable has no value.
pub fn holds<F>(constraint: &Constraint, get: &F, tol: f64) -> Option<bool>
where
    F: Fn(VarId) -> Option<f64>,
{
    match constraint {
        Constraint::Eq(a, b) => {
            let a = eval_expr(a, get)?;
            let b = eval_expr(b, get)?;
            let scale = 1.0_f64.max(a.abs()).max(b.abs());
            Some((a - b).abs() <= tol * scale)
        }
        Constraint::Lt(a, b) => Some(eval_expr(a, get)? < eval_expr(b, get)? + tol),
        Constraint::Le(a, b) => Some(eval_expr(a, get)? <= eval_expr(b, get)? + tol),
        Constraint::Gt(a, b) => Some(eval_expr(a, get)? > eval_expr(b, get)? - tol),
        Constraint::Ge(a, b) => Some(eval_expr(a, get)? >= eval_expr(b, get)? - tol),
        Constraint::And(items) => {
            let mut all = true;
            for item in items {
                all &= holds(item, get, tol)?;
            }
            Some(all)
        }
    }
}
