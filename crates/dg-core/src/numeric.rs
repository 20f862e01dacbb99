use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Lower bound of every percentage quantity (gate opening, gate target).
pub const PERCENT_MIN: Real = 0.0;
/// Upper bound of every percentage quantity.
pub const PERCENT_MAX: Real = 100.0;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and inside `[min, max]`.
pub fn ensure_in_range(
    v: Real,
    min: Real,
    max: Real,
    what: &'static str,
) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v < min || v > max {
        return Err(CoreError::OutOfRange {
            what,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

/// Finite and strictly positive.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v <= 0.0 {
        return Err(CoreError::InvalidArg { what });
    }
    Ok(v)
}

/// Clamp to `[0, 100]`. NaN collapses to the lower bound.
#[inline]
pub fn clamp_percent(v: Real) -> Real {
    if v.is_nan() {
        return PERCENT_MIN;
    }
    v.clamp(PERCENT_MIN, PERCENT_MAX)
}

/// Clamp to `[0, max]`. NaN collapses to zero.
#[inline]
pub fn clamp_non_negative(v: Real, max: Real) -> Real {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, max)
}
