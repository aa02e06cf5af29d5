//! Aggregates over series with missing values.
//!
//! Every aggregate skips missing (`None`) and non-finite entries; an aggregate
//! over zero usable values is itself missing.

use crate::numeric::Real;

/// Finite values of a series, in order.
pub fn present(values: &[Option<Real>]) -> Vec<Real> {
    values
        .iter()
        .filter_map(|v| v.filter(|x| x.is_finite()))
        .collect()
}

pub fn count_present(values: &[Option<Real>]) -> usize {
    values
        .iter()
        .filter(|v| v.is_some_and(|x| x.is_finite()))
        .count()
}

pub fn mean(values: &[Option<Real>]) -> Option<Real> {
    mean_of(&present(values))
}

pub fn max(values: &[Option<Real>]) -> Option<Real> {
    present(values).into_iter().reduce(Real::max)
}

/// Last element of the series, which may itself be missing.
pub fn last(values: &[Option<Real>]) -> Option<Real> {
    values.last().copied().flatten().filter(|x| x.is_finite())
}

/// Quantile with linear interpolation between closest ranks, `q` in [0, 1].
pub fn quantile(values: &[Option<Real>], q: Real) -> Option<Real> {
    let mut v = present(values);
    quantile_in_place(&mut v, q)
}

pub fn mean_of(values: &[Real]) -> Option<Real> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<Real>() / values.len() as Real)
}

pub fn quantile_in_place(values: &mut [Real], q: Real) -> Option<Real> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let pos = q.clamp(0.0, 1.0) * (values.len() - 1) as Real;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as Real;
    Some(values[lo] + (values[hi] - values[lo]) * frac)
}

/// Least-squares slope of `values` against their index.
///
/// Missing when fewer than two points or when any point is non-finite.
pub fn linear_slope(values: &[Real]) -> Option<Real> {
    if values.len() < 2 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let n = values.len() as Real;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<Real>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as Real - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    if sxx.abs() < Real::EPSILON {
        return None;
    }
    Some(sxy / sxx)
}

/// Trailing window: `size` rows, statistic emitted only when at
/// least `min_periods` rows in the window are present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub size: usize,
    pub min_periods: usize,
}

impl Window {
    pub fn new(size: usize, min_periods: usize) -> Self {
        Self {
            size: size.max(1),
            min_periods: min_periods.max(1),
        }
    }

    fn bounds(&self, i: usize) -> (usize, usize) {
        (i + 1 - self.size.min(i + 1), i + 1)
    }

    fn apply<F>(&self, values: &[Option<Real>], f: F) -> Vec<Option<Real>>
    where
        F: Fn(&[Option<Real>]) -> Option<Real>,
    {
        (0..values.len())
            .map(|i| {
                let (lo, hi) = self.bounds(i);
                let slice = &values[lo..hi];
                if count_present(slice) < self.min_periods {
                    None
                } else {
                    f(slice)
                }
            })
            .collect()
    }

    pub fn rolling_mean(&self, values: &[Option<Real>]) -> Vec<Option<Real>> {
        self.apply(values, mean)
    }

    pub fn rolling_quantile(&self, values: &[Option<Real>], q: Real) -> Vec<Option<Real>> {
        self.apply(values, |w| quantile(w, q))
    }

    /// Rolling slope; a window holding any missing value yields missing.
    pub fn rolling_slope(&self, values: &[Option<Real>]) -> Vec<Option<Real>> {
        self.apply(values, |w| {
            let full: Option<Vec<Real>> = w.iter().map(|v| v.filter(|x| x.is_finite())).collect();
            full.and_then(|v| linear_slope(&v))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_skip_missing() {
        let v = [Some(1.0), None, Some(3.0), Some(Real::NAN), Some(5.0)];
        assert_eq!(mean(&v), Some(3.0));
        assert_eq!(max(&v), Some(5.0));
        assert_eq!(quantile(&v, 0.5), Some(3.0));
        assert_eq!(count_present(&v), 3);
    }

    #[test]
    fn empty_aggregates_are_missing() {
        let v: [Option<Real>; 2] = [None, None];
        assert_eq!(mean(&v), None);
        assert_eq!(quantile(&v, 0.95), None);
        assert_eq!(last(&v), None);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v: Vec<Option<Real>> = (1..=10).map(|i| Some(i as Real)).collect();
        let p95 = quantile(&v, 0.95).unwrap();
        assert!((p95 - 9.55).abs() < 1e-12);
    }

    #[test]
    fn slope_of_line() {
        assert!((linear_slope(&[1.0, 3.0, 5.0, 7.0]).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(linear_slope(&[1.0]), None);
        assert_eq!(linear_slope(&[1.0, Real::NAN, 2.0]), None);
    }

    #[test]
    fn rolling_respects_min_periods() {
        let w = Window::new(4, 3);
        let v = [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0), Some(6.0)];
        let m = w.rolling_mean(&v);
        assert_eq!(m[0], None);
        assert_eq!(m[1], None);
        assert_eq!(m[2], None);
        assert_eq!(m[3], Some(7.0 / 3.0));
        assert_eq!(m[5], Some(5.0));
    }

    #[test]
    fn rolling_slope_rejects_gaps() {
        let w = Window::new(3, 2);
        let v = [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0), Some(6.0)];
        let s = w.rolling_slope(&v);
        assert_eq!(s[1], Some(1.0));
        assert_eq!(s[3], None);
        assert_eq!(s[4], None);
        assert_eq!(s[5], Some(1.0));
    }
}
