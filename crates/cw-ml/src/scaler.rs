//! Feature scaling fitted on the training rows only.

use cw_core::stats::{mean_of, quantile_in_place};
use nalgebra::DMatrix;

#[derive(Debug, Clone, PartialEq)]
pub enum Scaler {
    /// Pass-through.
    Identity,
    /// Centre on the median, scale by the interquartile range.
    Robust { center: Vec<f64>, scale: Vec<f64> },
    /// Centre on the mean, scale by the population standard deviation.
    Standard { center: Vec<f64>, scale: Vec<f64> },
}

/// A zero spread leaves the column unscaled.
fn guard_scale(s: f64) -> f64 {
    if s.is_finite() && s.abs() > f64::EPSILON { s } else { 1.0 }
}

impl Scaler {
    pub fn fit_robust(x: &DMatrix<f64>) -> Self {
        let mut center = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());
        for col in x.column_iter() {
            let mut v: Vec<f64> = col.iter().copied().collect();
            let q1 = quantile_in_place(&mut v, 0.25).unwrap_or(0.0);
            let med = quantile_in_place(&mut v, 0.5).unwrap_or(0.0);
            let q3 = quantile_in_place(&mut v, 0.75).unwrap_or(0.0);
            center.push(med);
            scale.push(guard_scale(q3 - q1));
        }
        Self::Robust { center, scale }
    }

    pub fn fit_standard(x: &DMatrix<f64>) -> Self {
        let mut center = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());
        for col in x.column_iter() {
            let v: Vec<f64> = col.iter().copied().collect();
            let mu = mean_of(&v).unwrap_or(0.0);
            let var = v.iter().map(|a| (a - mu).powi(2)).sum::<f64>() / v.len().max(1) as f64;
            center.push(mu);
            scale.push(guard_scale(var.sqrt()));
        }
        Self::Standard { center, scale }
    }

    pub fn transform(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        match self {
            Self::Identity => x.clone(),
            Self::Robust { center, scale } | Self::Standard { center, scale } => {
                DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| {
                    (x[(i, j)] - center[j]) / scale[j]
                })
            }
        }
    }
}
