/// Floating point type used throughout system
pub type Real = f64;

/// Turns NaN and ±inf into a missing value.
#[inline]
pub fn finite(v: Real) -> Option<Real> {
    v.is_finite().then_some(v)
}

/// Division that yields missing instead of inf/NaN.
#[inline]
pub fn checked_div(num: Real, den: Real) -> Option<Real> {
    if den == 0.0 {
        return None;
    }
    finite(num / den)
}

#[inline]
pub fn clamp_opt(v: Option<Real>, lo: Real, hi: Real) -> Option<Real> {
    v.map(|x| x.clamp(lo, hi))
}
