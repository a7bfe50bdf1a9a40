//! Root finders for the bubble-mechanics equations
//!
//! Two solvers with fixed iteration caps: a plain bisection used where only
//! a bracketed crossing time is needed, and a safeguarded Newton-Raphson
//! (falling back to bisection when a Newton step leaves the bracket) for the
//! cubic bubble-radius equation `r²·(A·r − B) = C`.
//!
//! # References
//! - Press, W.H. et al. (1992). "Numerical Recipes in Fortran", §9.4
//!   (rtsafe).

use crate::error::NumericError;

/// Iteration cap shared by both root finders.
pub const MAX_ROOT_ITERATIONS: usize = 100;

/// Find a sign change of `f` between `low` and `high` by bisection.
///
/// Converges when the bracket width drops below `tolerance`. The endpoints
/// must evaluate to opposite signs or the search fails with
/// [`NumericError::BracketRootsShareSign`].
pub fn bisect<F>(f: F, low: f64, high: f64, tolerance: f64) -> Result<f64, NumericError>
where
    F: Fn(f64) -> f64,
{
    let f_low = f(low);
    let f_high = f(high);
    if f_low == 0.0 {
        return Ok(low);
    }
    if f_high == 0.0 {
        return Ok(high);
    }
    if f_low.signum() == f_high.signum() {
        return Err(NumericError::BracketRootsShareSign);
    }

    let (mut low, mut high) = (low, high);
    let negative_side_low = f_low < 0.0;
    for _ in 0..MAX_ROOT_ITERATIONS {
        let mid = 0.5 * (low + high);
        if (high - low).abs() <= tolerance {
            return Ok(mid);
        }
        if (f(mid) < 0.0) == negative_side_low {
            low = mid;
        } else {
            high = mid;
        }
    }
    Err(NumericError::RootFinderExceededIterations)
}

/// Solve `r²·(A·r − B) = C` for the radius between `low_bound` and
/// `high_bound`.
///
/// Hybrid bisection/Newton-Raphson with 1e-12 accuracy. The bracket
/// endpoints must straddle the root.
pub fn radius_root_finder(
    a: f64,
    b: f64,
    c: f64,
    low_bound: f64,
    high_bound: f64,
) -> Result<f64, NumericError> {
    const ACCURACY: f64 = 1.0e-12;

    let function = |r: f64| r * r * (a * r - b) - c;
    let derivative = |r: f64| 3.0 * a * r * r - 2.0 * b * r;

    let f_low = function(low_bound);
    let f_high = function(high_bound);
    if f_low == 0.0 {
        return Ok(low_bound);
    }
    if f_high == 0.0 {
        return Ok(high_bound);
    }
    if f_low.signum() == f_high.signum() {
        return Err(NumericError::BracketRootsShareSign);
    }

    // Orient so that function < 0 lies at xl.
    let (mut xl, mut xh) = if f_low < 0.0 {
        (low_bound, high_bound)
    } else {
        (high_bound, low_bound)
    };

    let mut radius = 0.5 * (low_bound + high_bound);
    let mut step_before_last = (high_bound - low_bound).abs();
    let mut last_step = step_before_last;
    let mut f = function(radius);
    let mut df = derivative(radius);

    for _ in 0..MAX_ROOT_ITERATIONS {
        let newton_leaves_bracket =
            ((radius - xh) * df - f) * ((radius - xl) * df - f) >= 0.0;
        let converging_too_slowly = 2.0 * f.abs() > (step_before_last * df).abs();

        if newton_leaves_bracket || converging_too_slowly {
            step_before_last = last_step;
            last_step = 0.5 * (xh - xl);
            radius = xl + last_step;
            if xl == radius {
                return Ok(radius);
            }
        } else {
            step_before_last = last_step;
            last_step = f / df;
            let previous = radius;
            radius -= last_step;
            if previous == radius {
                return Ok(radius);
            }
        }

        if last_step.abs() < ACCURACY {
            return Ok(radius);
        }
        f = function(radius);
        df = derivative(radius);
        if f < 0.0 {
            xl = radius;
        } else {
            xh = radius;
        }
    }
    Err(NumericError::RootFinderExceededIterations)
}
