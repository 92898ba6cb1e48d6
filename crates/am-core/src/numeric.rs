use crate::AmError;

/// Floating point type used throughout the solver.
pub type Real = f64;

/// Smallest magnitude treated as a usable divisor.
pub const DIVISOR_FLOOR: Real = 1e-12;

#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, AmError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(AmError::NonFinite { what, value: v })
    }
}

pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, AmError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(AmError::InvalidArg { what })
    }
}

/// `num / den`, or `fallback` when `den` is too small to divide by.
#[inline]
pub fn guarded_div(num: Real, den: Real, fallback: Real) -> Real {
    if den.abs() < DIVISOR_FLOOR {
        fallback
    } else {
        num / den
    }
}

/// Return `value` if finite, otherwise `previous`.
#[inline]
pub fn finite_or(value: Real, previous: Real) -> Real {
    if value.is_finite() { value } else { previous }
}

/// Interpolation cell on a strictly increasing axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bracket {
    pub lo: usize,
    pub hi: usize,
    /// Weight of `hi`, in [0, 1].
    pub t: Real,
}

/// Locate `x` on `axis`, clamping to the first/last node outside the range.
///
/// Exactly on a node the weight is 0 or 1, so interpolation reproduces the
/// node value bit for bit.
pub fn bracket(axis: &[Real], x: Real) -> Result<Bracket, AmError> {
    let n = axis.len();
    if n == 0 {
        return Err(AmError::InvalidArg {
            what: "bracket axis is empty",
        });
    }
    if n == 1 || x <= axis[0] || x.is_nan() {
        return Ok(Bracket { lo: 0, hi: 0, t: 0.0 });
    }
    if x >= axis[n - 1] {
        return Ok(Bracket {
            lo: n - 1,
            hi: n - 1,
            t: 0.0,
        });
    }
    // partition_point: first index with axis[i] > x
    let hi = axis.partition_point(|&a| a <= x);
    let lo = hi - 1;
    if axis[lo] == x {
        return Ok(Bracket { lo, hi: lo, t: 0.0 });
    }
    let t = (x - axis[lo]) / (axis[hi] - axis[lo]);
    Ok(Bracket { lo, hi, t })
}

pub fn is_strictly_increasing(axis: &[Real]) -> bool {
    axis.windows(2).all(|w| w[0] < w[1])
}

#[inline]
pub fn lerp(a: Real, b: Real, t: Real) -> Real {
    if t == 0.0 { a } else { a + (b - a) * t }
}

/// Piecewise-linear lookup with edge clamping.
pub fn interp1(xs: &[Real], ys: &[Real], x: Real) -> Result<Real, AmError> {
    if xs.len() != ys.len() {
        return Err(AmError::LengthMismatch {
            what: "interp1 table",
            expected: xs.len(),
            found: ys.len(),
        });
    }
    let b = bracket(xs, x)?;
    Ok(lerp(ys[b.lo], ys[b.hi], b.t))
}
