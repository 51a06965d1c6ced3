//! Physical formula library.
//!
//! Pure constructors for the fluid-dynamic and electrokinetic constraint
//! terms the translation strategies emit. Everything here is symbolic —
//! functions take and return [`Expr`] trees and never evaluate anything.

use std::f64::consts::PI;

use crate::expr::{Constraint, Expr};

/// Gutter-flow correction in the droplet-volume closed form.
pub const Q_GUTTER: f64 = 0.1;

/// Sanity ceiling asserted on a derived input-port flow rate.
pub const MAX_PORT_FLOW_RATE: f64 = 100.0;

/// Default upper bound on channel width when no fabrication resolution is
/// given.
pub const DEFAULT_MAX_WIDTH: f64 = 1.0;

/// Default lower bound on a free channel height.
pub const MIN_CHANNEL_HEIGHT: f64 = 1e-6;

/// Default upper bound on channel height when no etch depth is given.
pub const DEFAULT_MAX_HEIGHT: f64 = 1e-3;

/// Default critical crossing angle at a T-junction, in degrees.
pub const DEFAULT_CRIT_ANGLE_DEG: f64 = 0.5;

/// Default minimum spacing between adjacent detector peaks.
pub const DEFAULT_MIN_SAMPLING_TIME: f64 = 0.1;

/// Adjacent-peak height ratio bound for detectability.
pub const RESOLVABILITY_RATIO: f64 = 0.4;

/// Hydraulic resistance of a rectangular duct,
/// `R = 12·mu·L / (w·h^3·(1 - 0.63·h/w))`.
///
/// The low-aspect-ratio approximation is only valid for `h < w`; callers
/// must assert that precondition alongside the returned term.
pub fn channel_resistance(viscosity: Expr, length: Expr, width: Expr, height: Expr) -> Expr {
    (12.0 * viscosity * length)
        / (width.clone()
            * (height.clone().powi(3) * (1.0 - 0.63 * (height / width))))
}

/// Pressure at the downstream end of a channel, `p_in - Q·R`.
pub fn channel_output_pressure(pressure_in: Expr, flow_rate: Expr, resistance: Expr) -> Expr {
    pressure_in - flow_rate * resistance
}

/// Pythagorean identity tying a channel length to its endpoint positions:
/// `(ax - bx)^2 + (ay - by)^2 == length^2`.
pub fn pythagorean_length(a: (Expr, Expr), b: (Expr, Expr), length: Expr) -> Constraint {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    Constraint::eq(dx.powi(2) + dy.powi(2), length.powi(2))
}

/// Half the signed area of the triangle `(a, b, c)`; zero iff the three
/// points are colinear.
pub fn triangle_area(a: (Expr, Expr), b: (Expr, Expr), c: (Expr, Expr)) -> Expr {
    let (ax, ay) = a;
    let (bx, by) = b;
    let (cx, cy) = c;
    (ax * (by.clone() - cy.clone()) + (bx * (cy - ay.clone()) + cx * (ay - by))) / 2.0
}

/// Squared cosine of the angle at `vertex` between the rays toward `a` and
/// `c`, in dot-product form `(u·v)^2 / (|u|^2·|v|^2)`.
pub fn cosine_squared(a: (Expr, Expr), vertex: (Expr, Expr), c: (Expr, Expr)) -> Expr {
    let ux = a.0 - vertex.0.clone();
    let uy = a.1 - vertex.1.clone();
    let vx = c.0 - vertex.0;
    let vy = c.1 - vertex.1;
    let dot = ux.clone() * vx.clone() + uy.clone() * vy.clone();
    dot.powi(2) / ((ux.powi(2) + uy.powi(2)) * (vx.powi(2) + vy.powi(2)))
}

/// Torricelli outflow through one port channel, `(w·h)·sqrt(2·p/rho)`.
pub fn port_channel_outflow(width: Expr, height: Expr, pressure: Expr, density: Expr) -> Expr {
    (width * height) * (2.0 * pressure / density).sqrt()
}

/// Droplet volume generated at a T-junction (closed-form approximation from
/// DOI:10.1039/c002625e).
///
/// `h` is the channel height, `w` the continuous/output width, `w_in` the
/// dispersed width, `epsilon` the corner-rounding parameter, and `q_d`/`q_c`
/// the dispersed and continuous flow rates.
pub fn droplet_volume(
    h: Expr,
    w: Expr,
    w_in: Expr,
    epsilon: Expr,
    q_d: Expr,
    q_c: Expr,
) -> Expr {
    // v_fill = 3*pi/8 - (pi/2)*(1 - pi/4)*(h/w)
    let v_fill = (3.0 / 8.0) * PI - ((PI / 2.0) * (1.0 - PI / 4.0)) * (h.clone() / w.clone());

    let hw_parallel = (h.clone() * w.clone()) / (h.clone() + w.clone());

    // r_pinch = w + (w_in - (hw_parallel - eps))
    //             + sqrt(2*(w_in - hw_parallel)*(w - hw_parallel))
    let r_pinch = w.clone()
        + ((w_in.clone() - (hw_parallel.clone() - epsilon))
            + (2.0
                * ((w_in - hw_parallel.clone()) * (w.clone() - hw_parallel)))
            .sqrt());
    let r_fill = w.clone();

    let alpha = ((1.0 - PI / 4.0) / (1.0 - Q_GUTTER))
        * ((r_pinch.clone() / w.clone()).powi(2) - (r_fill.clone() / w.clone()).powi(2)
            + ((PI / 4.0)
                * ((r_pinch / w.clone() - r_fill / w.clone()) * (h.clone() / w.clone()))));

    (h * w.clone().powi(2)) * (v_fill + alpha * (q_d / q_c))
}

/// Stokes-drag electrophoretic mobility of a charged sphere,
/// `|q| / (6·pi·eta·r)`.
///
/// The charge magnitude is used so drift is oriented toward the detector
/// regardless of analyte sign.
pub fn stokes_mobility(charge: f64, radius: f64, viscosity: Expr) -> Expr {
    charge.abs() / ((6.0 * PI * radius) * viscosity)
}

/// Drift velocity of an analyte in field `e`.
pub fn drift_velocity(mobility: Expr, field: Expr) -> Expr {
    mobility * field
}

/// Height ratio of two adjacent Gaussian concentration peaks at the
/// detector, `(C0_i/C0_j)·sqrt(D_j·mu_i / (D_i·mu_j))`.
pub fn peak_height_ratio(
    c0: f64,
    c0_next: f64,
    diffusivity: f64,
    diffusivity_next: f64,
    mobility: Expr,
    mobility_next: Expr,
) -> Expr {
    (c0 / c0_next) * ((diffusivity_next * mobility) / (diffusivity * mobility_next)).sqrt()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::eval::eval_expr;

    fn lit(v: f64) -> Expr {
        Expr::Lit(v)
    }

    fn eval(e: &Expr) -> f64 {
        eval_expr(e, &|_| None).expect("closed expression")
    }

    #[test]
    fn resistance_matches_closed_form() {
        let r = channel_resistance(lit(0.001), lit(2.0), lit(0.3), lit(0.1));
        assert_relative_eq!(eval(&r), 101.2658227848101, max_relative = 1e-12);
    }

    #[test]
    fn droplet_volume_matches_closed_form() {
        let v = droplet_volume(lit(1.0), lit(1.0), lit(1.0), lit(0.0), lit(1.0), lit(1.0));
        assert_relative_eq!(eval(&v), 1.9901656403949657, max_relative = 1e-12);

        let v = droplet_volume(lit(0.1), lit(0.3), lit(0.2), lit(0.01), lit(2.0), lit(5.0));
        assert_relative_eq!(eval(&v), 0.013321309095574246, max_relative = 1e-12);
    }

    #[test]
    fn colinear_points_have_zero_area() {
        let area = triangle_area(
            (lit(0.0), lit(0.0)),
            (lit(1.0), lit(1.0)),
            (lit(2.0), lit(2.0)),
        );
        assert_relative_eq!(eval(&area), 0.0);
    }

    #[test]
    fn right_angle_has_zero_cosine() {
        let cos2 = cosine_squared(
            (lit(1.0), lit(0.0)),
            (lit(0.0), lit(0.0)),
            (lit(0.0), lit(1.0)),
        );
        assert_relative_eq!(eval(&cos2), 0.0);
    }

    #[test]
    fn straight_line_has_unit_cosine() {
        let cos2 = cosine_squared(
            (lit(-1.0), lit(0.0)),
            (lit(0.0), lit(0.0)),
            (lit(2.0), lit(0.0)),
        );
        assert_relative_eq!(eval(&cos2), 1.0);
    }

    #[test]
    fn mobility_uses_charge_magnitude() {
        let positive = stokes_mobility(2.0, 0.05, lit(0.001));
        let negative = stokes_mobility(-2.0, 0.05, lit(0.001));
        assert_relative_eq!(eval(&positive), eval(&negative));
        assert!(eval(&positive) > 0.0);
    }
}
