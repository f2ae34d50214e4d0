//! Polynomials in ascending coefficient order, used to describe baselines.
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolynomialError {
    #[error("The x and y arrays do not match in length ({0} != {1})")]
    XYLengthMismatch(usize, usize),
    #[error("A polynomial of order {order} needs at least {needed} points, received {received}")]
    TooFewPoints {
        order: usize,
        needed: usize,
        received: usize,
    },
    #[error("Failed to solve for coefficients: {0}")]
    FailedToSolveCoefficients(&'static str),
}

/// A polynomial `c[0] + c[1] * x + c[2] * x^2 + ...`
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// A polynomial that is `value` everywhere
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// The highest power with a coefficient, `0` for an empty polynomial
    pub fn order(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.coefficients.iter()
    }

    /// Evaluate the polynomial at `x` using Horner's scheme
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + *c)
    }

    pub fn eval(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.evaluate(*v)).collect()
    }

    /// Fit a polynomial of `order` to `x` and `y` by least squares.
    pub fn fit(x: &[f64], y: &[f64], order: usize) -> Result<Self, PolynomialError> {
        if x.len() != y.len() {
            return Err(PolynomialError::XYLengthMismatch(x.len(), y.len()));
        }
        let nc = order + 1;
        let nr = x.len();
        if nr < nc {
            return Err(PolynomialError::TooFewPoints {
                order,
                needed: nc,
                received: nr,
            });
        }

        // Vandermonde system, one row per observation
        let system = DMatrix::<f64>::from_fn(nr, nc, |row_i, col_j| x[row_i].powi(col_j as i32));
        let beta = DVector::from_row_slice(y);
        let decomp = nalgebra::linalg::SVD::new(system, true, true);

        match decomp.solve(&beta, 1e-18) {
            Ok(val) => Ok(Self::new(val.data.into())),
            Err(e) => Err(PolynomialError::FailedToSolveCoefficients(e)),
        }
    }
}

impl AsRef<[f64]> for Polynomial {
    fn as_ref(&self) -> &[f64] {
        &self.coefficients
    }
}

impl From<Vec<f64>> for Polynomial {
    fn from(value: Vec<f64>) -> Self {
        Self::new(value)
    }
}
