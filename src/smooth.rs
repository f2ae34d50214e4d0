//! Symmetric convolution smoothing of a signal.
//!
//! A [`SmoothingKernel`] describes the half-window of weights `coefficient(points, j)`
//! for offsets `j = 0..points` and a shared divisor `norm(points)`. The full window is
//! mirrored around the center sample, so a kernel with `points` offsets spans
//! `2 * points - 1` samples.
//!
//! # Edges
//! [`smooth_function`] does not shrink the window near the ends of the signal. Samples
//! that would be read from outside the signal contribute nothing, as if the signal were
//! zero padded, so the first and last `points - 1` smoothed values are biased toward zero.
//! Choose `points` small relative to the distance between the signal edges and the
//! features of interest.

use cfg_if::cfg_if;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::signal::SignalAccess;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SmoothingError {
    #[error("The smoothing window must contain at least one point")]
    EmptyWindow,
    #[error(
        "The window length must be shorter than the data, received {0} window with {1} data points"
    )]
    WindowLengthTooLong(usize, usize),
}

/// A source of symmetric convolution weights
pub trait SmoothingKernel {
    /// The divisor applied to every weighted sample for a kernel with `window` offsets
    fn norm(&self, window: usize) -> f64;

    /// The weight applied at `offset` samples from the center, `offset < window`
    fn coefficient(&self, window: usize, offset: usize) -> f64;

    /// All the weights for a kernel with `window` offsets, center first
    fn coefficients(&self, window: usize) -> Vec<f64> {
        (0..window).map(|j| self.coefficient(window, j)).collect()
    }
}

/// Passes the center sample through unchanged
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Identity;

impl SmoothingKernel for Identity {
    fn norm(&self, _window: usize) -> f64 {
        1.0
    }

    fn coefficient(&self, _window: usize, offset: usize) -> f64 {
        if offset == 0 {
            1.0
        } else {
            0.0
        }
    }
}

/// An unweighted mean over the `2 * window - 1` samples around the center
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverage;

impl SmoothingKernel for MovingAverage {
    fn norm(&self, window: usize) -> f64 {
        (2 * window).saturating_sub(1).max(1) as f64
    }

    fn coefficient(&self, _window: usize, _offset: usize) -> f64 {
        1.0
    }
}

/// The tabulated quadratic/cubic Savitzky-Golay smoothing weights.
///
/// With `m = window - 1`, the weight at offset `j` is `3m² + 3m - 1 - 5j²` and the
/// divisor is `(2m + 3)(2m + 1)(2m - 1) / 3`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuadraticSavitzkyGolay;

impl SmoothingKernel for QuadraticSavitzkyGolay {
    fn norm(&self, window: usize) -> f64 {
        if window == 0 {
            return 1.0;
        }
        let m = (window - 1) as f64;
        (2.0 * m + 3.0) * (2.0 * m + 1.0) * (2.0 * m - 1.0) / 3.0
    }

    fn coefficient(&self, window: usize, offset: usize) -> f64 {
        if window == 0 {
            return 0.0;
        }
        let m = (window - 1) as f64;
        let j = offset as f64;
        3.0 * m * m + 3.0 * m - 1.0 - 5.0 * j * j
    }
}

/// Savitzky-Golay smoothing weights for an arbitrary polynomial order, solved by least squares.
///
/// The weights are normalized, so [`SmoothingKernel::norm`] is always `1`. Every call to
/// [`SmoothingKernel::coefficient`] solves the whole system again, so prefer
/// [`SmoothingKernel::coefficients`] when more than one weight is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavitzkyGolay {
    pub poly_order: usize,
}

impl Default for SavitzkyGolay {
    fn default() -> Self {
        Self { poly_order: 2 }
    }
}

impl SavitzkyGolay {
    pub fn new(poly_order: usize) -> Self {
        Self { poly_order }
    }

    /// Solve for the full `2 * window - 1` weights, ordered from `-m` to `m`
    fn estimate_coefficients(&self, window: usize) -> Result<DVector<f64>, &'static str> {
        let half_length = window - 1;
        let window_length = 2 * half_length + 1;
        let x = DVector::from_fn(window_length, |i, _| i as f64 - half_length as f64);
        let vandermonde = DMatrix::from_fn(self.poly_order + 1, window_length, |i, j| {
            x[j].powi(i as i32)
        });

        let mut y = DVector::from_element(self.poly_order + 1, 0.0);
        y[0] = 1.0;

        let svd = nalgebra::linalg::SVD::new(vandermonde, true, true);
        svd.solve(&y, 1e-12)
    }
}

impl SmoothingKernel for SavitzkyGolay {
    fn norm(&self, _window: usize) -> f64 {
        1.0
    }

    fn coefficient(&self, window: usize, offset: usize) -> f64 {
        self.coefficients(window)
            .get(offset)
            .copied()
            .unwrap_or_default()
    }

    fn coefficients(&self, window: usize) -> Vec<f64> {
        if window == 0 {
            return Vec::new();
        }
        match self.estimate_coefficients(window) {
            Ok(beta) => beta.iter().skip(window - 1).copied().collect(),
            Err(err) => {
                warn!(
                    "Failed to solve for Savitzky-Golay weights of order {} over {window} points: {err}, not smoothing",
                    self.poly_order
                );
                Identity.coefficients(window)
            }
        }
    }
}

/// A serializable choice of [`SmoothingKernel`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Kernel {
    Identity,
    MovingAverage,
    #[default]
    QuadraticSavitzkyGolay,
    SavitzkyGolay { poly_order: usize },
}

impl SmoothingKernel for Kernel {
    fn norm(&self, window: usize) -> f64 {
        match self {
            Kernel::Identity => Identity.norm(window),
            Kernel::MovingAverage => MovingAverage.norm(window),
            Kernel::QuadraticSavitzkyGolay => QuadraticSavitzkyGolay.norm(window),
            Kernel::SavitzkyGolay { poly_order } => SavitzkyGolay::new(*poly_order).norm(window),
        }
    }

    fn coefficient(&self, window: usize, offset: usize) -> f64 {
        match self {
            Kernel::Identity => Identity.coefficient(window, offset),
            Kernel::MovingAverage => MovingAverage.coefficient(window, offset),
            Kernel::QuadraticSavitzkyGolay => QuadraticSavitzkyGolay.coefficient(window, offset),
            Kernel::SavitzkyGolay { poly_order } => {
                SavitzkyGolay::new(*poly_order).coefficient(window, offset)
            }
        }
    }

    fn coefficients(&self, window: usize) -> Vec<f64> {
        match self {
            Kernel::SavitzkyGolay { poly_order } => {
                SavitzkyGolay::new(*poly_order).coefficients(window)
            }
            _ => (0..window).map(|j| self.coefficient(window, j)).collect(),
        }
    }
}

/// Convolve `ys` with the mirrored `coefficients`, writing the value centered on
/// sample `i + 1` into `out[i]`.
fn convolve_into(ys: &[f64], coefficients: &[f64], norm: f64, out: &mut [f64]) {
    let sample = |k: Option<usize>| -> f64 { k.and_then(|k| ys.get(k)).copied().unwrap_or(0.0) };

    let kernel_at = |i: usize| -> f64 {
        coefficients
            .iter()
            .copied()
            .enumerate()
            .fold(0.0, |mut val, (j, coeff)| {
                val += coeff * sample(i.checked_add(j)) / norm;
                if j > 0 {
                    val += coeff * sample(i.checked_sub(j)) / norm;
                }
                val
            })
    };

    cfg_if! {
        if #[cfg(feature = "parallelism")] {
            out.par_iter_mut().enumerate().for_each(|(k, v)| *v = kernel_at(k + 1));
        } else {
            out.iter_mut().enumerate().for_each(|(k, v)| *v = kernel_at(k + 1));
        }
    }
}

/// Smooth `signal` in place with a symmetric kernel of `points` offsets.
///
/// The smoothed value centered on sample `i` is written to index `i - 1` for
/// `i` in `1..signal.len()`, so the result is shifted one sample toward the start and
/// the final sample keeps its previous value. See the [module documentation](self)
/// for how edges are treated.
pub fn smooth_function<S: SignalAccess + ?Sized, K: SmoothingKernel + ?Sized>(
    signal: &mut S,
    points: usize,
    kernel: &K,
) {
    let coefficients = kernel.coefficients(points);
    let norm = kernel.norm(points);
    let n = signal.len();

    let mut buffer = vec![0.0; n.saturating_sub(1)];
    convolve_into(signal.y_array(), &coefficients, norm, &mut buffer);
    debug!(
        "Smoothed {} points with a {}-point kernel",
        buffer.len(),
        coefficients.len()
    );
    signal.set_spectrum(&buffer);
}

/// Like [`smooth_function`], but refuse to run when the kernel window is empty or
/// wider than the signal.
pub fn try_smooth_function<S: SignalAccess + ?Sized, K: SmoothingKernel + ?Sized>(
    signal: &mut S,
    points: usize,
    kernel: &K,
) -> Result<(), SmoothingError> {
    if points == 0 {
        return Err(SmoothingError::EmptyWindow);
    }
    let width = 2 * points - 1;
    if width > signal.len() {
        return Err(SmoothingError::WindowLengthTooLong(width, signal.len()));
    }
    smooth_function(signal, points, kernel);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signal::Spectrum;
    use rstest::rstest;

    fn quadratic_signal() -> Spectrum {
        let x: Vec<f64> = (0..25).map(|i| i as f64).collect();
        let y = x.iter().map(|x| 0.5 * x * x - 3.0 * x + 2.0).collect();
        Spectrum::new(x, y).unwrap()
    }

    #[test]
    fn test_quadratic_table() {
        let weights = QuadraticSavitzkyGolay.coefficients(3);
        assert_eq!(weights, vec![17.0, 12.0, -3.0]);
        assert_eq!(QuadraticSavitzkyGolay.norm(3), 35.0);

        assert_eq!(QuadraticSavitzkyGolay.coefficients(2), vec![5.0, 0.0]);
        assert_eq!(QuadraticSavitzkyGolay.norm(2), 5.0);
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(5)]
    fn test_least_squares_matches_table(#[case] points: usize) {
        let solved = SavitzkyGolay::new(2).coefficients(points);
        let norm = QuadraticSavitzkyGolay.norm(points);
        let table = QuadraticSavitzkyGolay.coefficients(points);
        assert_eq!(solved.len(), points);
        for (a, b) in solved.iter().zip(table.iter()) {
            assert!((a - b / norm).abs() < 1e-9, "{solved:?} vs {table:?}");
        }
    }

    #[rstest]
    #[case(2)]
    #[case(4)]
    fn test_single_weight_matches_batch(#[case] points: usize) {
        let kernel = SavitzkyGolay::new(3);
        let batch = kernel.coefficients(points);
        for (j, w) in batch.iter().enumerate() {
            assert!((kernel.coefficient(points, j) - w).abs() < 1e-12);
        }
        assert_eq!(kernel.coefficient(points, points), 0.0);
    }

    #[rstest]
    #[case(Kernel::Identity)]
    #[case(Kernel::QuadraticSavitzkyGolay)]
    #[case(Kernel::SavitzkyGolay { poly_order: 3 })]
    fn test_single_point_kernel_shifts_input(#[case] kernel: Kernel) {
        let mut spectrum = quadratic_signal();
        let original = spectrum.y_array().to_vec();
        smooth_function(&mut spectrum, 1, &kernel);
        let smoothed = spectrum.y_array();
        let n = original.len();
        for i in 0..n - 1 {
            assert!((smoothed[i] - original[i + 1]).abs() < 1e-9);
        }
        assert_eq!(smoothed[n - 1], original[n - 1]);
    }

    #[test_log::test]
    fn test_savitzky_golay_preserves_quadratic() {
        let mut spectrum = quadratic_signal();
        let original = spectrum.y_array().to_vec();
        let points = 3;
        smooth_function(&mut spectrum, points, &QuadraticSavitzkyGolay);
        let smoothed = spectrum.y_array();
        // Windows fully inside the signal are reproduced exactly
        for center in (points - 1)..(original.len() - points + 1) {
            assert!(
                (smoothed[center - 1] - original[center]).abs() < 1e-9,
                "{center}: {} != {}",
                smoothed[center - 1],
                original[center]
            );
        }
    }

    #[test]
    fn test_edges_are_zero_padded() {
        let mut spectrum = Spectrum::from_y(vec![3.0; 6]);
        smooth_function(&mut spectrum, 2, &MovingAverage);
        let smoothed = spectrum.y_array();
        // Center at 1..4 sees three samples, center 5 sees only two
        assert_eq!(&smoothed[..4], &[3.0, 3.0, 3.0, 3.0]);
        assert!((smoothed[4] - 2.0).abs() < 1e-12);
        assert_eq!(smoothed[5], 3.0);
    }

    #[test]
    fn test_try_smooth() {
        let mut spectrum = Spectrum::from_y(vec![1.0, 2.0, 3.0]);
        assert_eq!(
            try_smooth_function(&mut spectrum, 0, &Identity),
            Err(SmoothingError::EmptyWindow)
        );
        assert_eq!(
            try_smooth_function(&mut spectrum, 3, &MovingAverage),
            Err(SmoothingError::WindowLengthTooLong(5, 3))
        );
        assert_eq!(spectrum.y_array(), &[1.0, 2.0, 3.0]);
        try_smooth_function(&mut spectrum, 2, &MovingAverage).unwrap();
        assert!((spectrum.y_array()[0] - 2.0).abs() < 1e-12);
    }
}
