//! L2-regularised logistic regression with balanced class weights.

use crate::classifier::Classifier;
use crate::{MlError, MlResult, balanced_weights, check_training_set, sigmoid};
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Inverse regularisation strength.
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    coef: Option<DVector<f64>>,
    intercept: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 2000,
            tol: 1e-8,
            coef: None,
            intercept: 0.0,
        }
    }
}

fn with_intercept(x: &DMatrix<f64>) -> DMatrix<f64> {
    x.clone().insert_column(x.ncols(), 1.0)
}

/// Penalised, weighted negative log-likelihood.
fn objective(xt: &DMatrix<f64>, y: &[f64], s: &[f64], theta: &DVector<f64>, c: f64) -> f64 {
    let p = theta.len() - 1;
    let penalty = 0.5 * theta.rows(0, p).norm_squared();
    let z = xt * theta;
    let loss: f64 = z
        .iter()
        .zip(y.iter().zip(s))
        .map(|(zi, (yi, si))| {
            // log(1 + e^z) - y z, stable for large |z|
            let softplus = if *zi > 0.0 {
                zi + (-zi).exp().ln_1p()
            } else {
                zi.exp().ln_1p()
            };
            si * (softplus - yi * zi)
        })
        .sum();
    penalty + c * loss
}

impl LogisticRegression {
    pub fn coefficients(&self) -> Option<&DVector<f64>> {
        self.coef.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "LogisticRegression"
    }

    fn fit(&mut self, x: &DMatrix<f64>, y: &[u8]) -> MlResult<()> {
        check_training_set(x, y)?;
        let n = x.nrows();
        let p = x.ncols();
        let xt = with_intercept(x);
        let yf: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();
        let s = balanced_weights(y, &vec![1.0; n]);

        let mut theta = DVector::<f64>::zeros(p + 1);
        let mut current = objective(&xt, &yf, &s, &theta, self.c);
        let mut converged = false;

        for _ in 0..self.max_iter {
            let probs = (&xt * &theta).map(sigmoid);

            let resid = DVector::from_fn(n, |i, _| s[i] * (probs[i] - yf[i]));
            let mut grad = xt.tr_mul(&resid) * self.c;
            for j in 0..p {
                grad[j] += theta[j];
            }

            let xw = DMatrix::from_fn(n, p + 1, |i, j| {
                xt[(i, j)] * s[i] * probs[i] * (1.0 - probs[i])
            });
            let mut hess = xt.tr_mul(&xw) * self.c;
            for j in 0..p {
                hess[(j, j)] += 1.0;
            }
            hess[(p, p)] += 1e-10;

            let step = match hess.clone().cholesky() {
                Some(ch) => ch.solve(&grad),
                None => hess.lu().solve(&grad).ok_or(MlError::Solver {
                    what: "logistic Newton step",
                })?,
            };

            // Backtrack until the objective does not increase.
            let mut t = 1.0;
            let mut next = &theta - &step * t;
            let mut value = objective(&xt, &yf, &s, &next, self.c);
            let mut halvings = 0;
            while value > current && halvings < 30 {
                t *= 0.5;
                next = &theta - &step * t;
                value = objective(&xt, &yf, &s, &next, self.c);
                halvings += 1;
            }

            let moved = (&step * t).amax();
            theta = next;
            current = value;
            if moved < self.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(max_iter = self.max_iter, "logistic regression did not converge");
        }

        self.intercept = theta[p];
        self.coef = Some(theta.rows(0, p).into_owned());
        Ok(())
    }

    fn predict_proba(&self, x: &DMatrix<f64>) -> MlResult<Vec<f64>> {
        let coef = self.coef.as_ref().ok_or(MlError::NotFitted {
            model: "LogisticRegression",
        })?;
        if x.ncols() != coef.len() {
            return Err(MlError::ShapeMismatch {
                what: "feature columns",
                expected: coef.len(),
                got: x.ncols(),
            });
        }
        let z = x * coef;
        Ok(z.iter().map(|v| sigmoid(v + self.intercept)).collect())
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        self.coef
            .as_ref()
            .map(|c| c.iter().map(|v| v.abs()).collect())
    }
}
