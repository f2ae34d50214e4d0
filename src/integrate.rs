//! Numerical integration of signal regions with optional baseline subtraction.
//!
//! Every pair of adjacent samples `(x0, y0), (x1, y1)` in the window contributes
//! `dx * m + dx * |y1 - y0| / 2`, where `dx = x1 - x0` and `m` is whichever of `y0` and
//! `y1` has the smaller magnitude. The window `start..end` covers the sample pairs
//! `(i, i + 1)` for `i` in `start..end`, i.e. the samples `start..=end`. The whole
//! signal is therefore the window `0..len - 1`, and `0..len` integrates to `0`.
//!
//! The plain functions never fail: mismatched arrays, empty windows and windows that
//! reach past the data all integrate to `0`. [`try_integrate`] reports those cases instead.
use cfg_if::cfg_if;
use log::trace;
use thiserror::Error;

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::peak::Peak;
use crate::polynomial::Polynomial;
use crate::signal::SignalAccess;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IntegrationError {
    #[error("The x and y arrays do not match in length ({0} != {1})")]
    XYLengthMismatch(usize, usize),
    #[error("The integration window {0}..{1} is empty")]
    EmptyWindow(usize, usize),
    #[error("The integration window ends at {0} but there are only {1} points")]
    OutOfBounds(usize, usize),
}

/// The reference level subtracted from the signal before integrating
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Baseline {
    #[default]
    None,
    Constant(f64),
    Polynomial(Polynomial),
}

impl Baseline {
    #[inline]
    pub fn at(&self, x: f64) -> f64 {
        match self {
            Baseline::None => 0.0,
            Baseline::Constant(c) => *c,
            Baseline::Polynomial(p) => p.evaluate(x),
        }
    }
}

impl From<Polynomial> for Baseline {
    fn from(value: Polynomial) -> Self {
        Self::Polynomial(value)
    }
}

impl From<f64> for Baseline {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

/// The area contributed by one pair of samples
#[inline]
fn segment_area(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    let dx = x1 - x0;
    let lower = if y0.abs() < y1.abs() { y0 } else { y1 };
    dx * lower + dx * (y1 - y0).abs() / 2.0
}

fn validate_window(x: &[f64], y: &[f64], start: usize, end: usize) -> Result<(), IntegrationError> {
    if x.len() != y.len() {
        Err(IntegrationError::XYLengthMismatch(x.len(), y.len()))
    } else if end <= start {
        Err(IntegrationError::EmptyWindow(start, end))
    } else if end >= x.len() {
        Err(IntegrationError::OutOfBounds(end, x.len()))
    } else {
        Ok(())
    }
}

fn integrate_baseline_unchecked<B: Fn(f64) -> f64 + Sync>(
    x: &[f64],
    y: &[f64],
    start: usize,
    end: usize,
    baseline: B,
) -> f64 {
    let contribution = |i: usize| {
        let x0 = x[i];
        let x1 = x[i + 1];
        segment_area(x0, y[i] - baseline(x0), x1, y[i + 1] - baseline(x1))
    };
    cfg_if! {
        if #[cfg(feature = "parallelism")] {
            return (start..end).into_par_iter().map(contribution).sum();
        } else {
            return (start..end).map(contribution).sum();
        }
    }
}

/// Integrate `y` over `x` across the samples `start..=end`
pub fn integrate(x: &[f64], y: &[f64], start: usize, end: usize) -> f64 {
    integrate_with_baseline(x, y, start, end, &Baseline::None)
}

/// Integrate `y - offset` over `x` across the samples `start..=end`
pub fn integrate_with_offset(x: &[f64], y: &[f64], start: usize, end: usize, offset: f64) -> f64 {
    integrate_with_baseline(x, y, start, end, &Baseline::Constant(offset))
}

/// Integrate `y - baseline(x)` over `x` across the samples `start..=end`
pub fn integrate_with_polynomial(
    x: &[f64],
    y: &[f64],
    start: usize,
    end: usize,
    baseline: &Polynomial,
) -> f64 {
    if validate_window(x, y, start, end).is_err() {
        return 0.0;
    }
    integrate_baseline_unchecked(x, y, start, end, |x| baseline.evaluate(x))
}

/// Integrate `y` over `x` across the samples `start..=end` after subtracting `baseline`.
///
/// Returns `0` for mismatched arrays or an empty or out of range window.
pub fn integrate_with_baseline(
    x: &[f64],
    y: &[f64],
    start: usize,
    end: usize,
    baseline: &Baseline,
) -> f64 {
    try_integrate(x, y, start, end, baseline).unwrap_or(0.0)
}

/// Integrate `y - baseline` over `x` across the samples `start..=end`, reporting why a
/// window could not be integrated.
pub fn try_integrate(
    x: &[f64],
    y: &[f64],
    start: usize,
    end: usize,
    baseline: &Baseline,
) -> Result<f64, IntegrationError> {
    validate_window(x, y, start, end)?;
    Ok(integrate_baseline_unchecked(x, y, start, end, |x| baseline.at(x)))
}

/// Integrate a signal across the samples `start..=end`
pub fn integrate_signal<S: SignalAccess + ?Sized>(signal: &S, start: usize, end: usize) -> f64 {
    integrate(signal.x_array(), signal.y_array(), start, end)
}

/// Integrate a signal minus a constant `offset` across the samples `start..=end`
pub fn integrate_signal_with_offset<S: SignalAccess + ?Sized>(
    signal: &S,
    start: usize,
    end: usize,
    offset: f64,
) -> f64 {
    integrate_with_offset(signal.x_array(), signal.y_array(), start, end, offset)
}

/// Integrate a signal minus a polynomial baseline across the samples `start..=end`
pub fn integrate_signal_with_polynomial<S: SignalAccess + ?Sized>(
    signal: &S,
    start: usize,
    end: usize,
    baseline: &Polynomial,
) -> f64 {
    integrate_with_polynomial(signal.x_array(), signal.y_array(), start, end, baseline)
}

/// Integrate `peak` over its integration window, storing the area in [`Peak::integ_num`]
/// and returning it.
pub fn integrate_peak<S: SignalAccess + ?Sized>(
    signal: &S,
    peak: &mut Peak,
    baseline: &Baseline,
) -> f64 {
    let area = integrate_with_baseline(
        signal.x_array(),
        signal.y_array(),
        peak.int_start,
        peak.int_end,
        baseline,
    );
    trace!(
        "Integrated {}..{} to {area}",
        peak.int_start,
        peak.int_end
    );
    peak.integ_num = area;
    area
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signal::Spectrum;
    use crate::test_data;
    use rstest::rstest;

    const X: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];
    const Y: [f64; 5] = [0.0, 1.0, 3.0, 1.0, 0.0];

    #[test]
    fn test_triangular_bump() {
        // 0.5 + 2.0 + 2.0 + 0.5
        assert!((integrate(&X, &Y, 0, 4) - 5.0).abs() < 1e-12);
        assert!((integrate(&X, &Y, 1, 2) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_whole_signal_window_ends_at_last_index() {
        assert!((integrate(&X, &Y, 0, X.len() - 1) - 5.0).abs() < 1e-12);
        assert_eq!(integrate(&X, &Y, 0, X.len()), 0.0);
        assert_eq!(
            try_integrate(&X, &Y, 0, X.len(), &Baseline::None),
            Err(IntegrationError::OutOfBounds(5, 5))
        );
    }

    #[rstest]
    #[case(2, 2)]
    #[case(3, 1)]
    #[case(0, 5)]
    #[case(4, 9)]
    fn test_degenerate_windows(#[case] start: usize, #[case] end: usize) {
        assert_eq!(integrate(&X, &Y, start, end), 0.0);
        assert!(try_integrate(&X, &Y, start, end, &Baseline::None).is_err());
    }

    #[test]
    fn test_mismatched_arrays() {
        assert_eq!(integrate(&X, &Y[..4], 0, 3), 0.0);
        assert_eq!(integrate_with_offset(&X[..3], &Y, 0, 2, 1.0), 0.0);
        assert_eq!(
            try_integrate(&X, &Y[..4], 0, 3, &Baseline::None),
            Err(IntegrationError::XYLengthMismatch(5, 4))
        );
        assert_eq!(
            try_integrate(&X, &Y, 0, 5, &Baseline::None),
            Err(IntegrationError::OutOfBounds(5, 5))
        );
    }

    #[test]
    fn test_sign_change_uses_smaller_magnitude() {
        let x = [0.0, 2.0];
        let y = [-1.0, 3.0];
        // dx * -1 + dx * 4 / 2
        assert!((integrate(&x, &y, 0, 1) - 2.0).abs() < 1e-12);
    }

    #[rstest]
    #[case(0.0)]
    #[case(2.5)]
    #[case(-7.0)]
    fn test_constant_offset_invariance(#[case] c: f64) {
        let (x, y) = test_data::two_peaks();
        let shifted: Vec<f64> = y.iter().map(|v| v + c).collect();
        let n = x.len() - 1;
        let expected = integrate_with_offset(&x, &y, 0, n, 0.0);
        let observed = integrate_with_offset(&x, &shifted, 0, n, c);
        assert!(
            (expected - observed).abs() < 1e-6,
            "{expected} != {observed}"
        );
    }

    #[test]
    fn test_polynomial_baseline() {
        let (x, y) = test_data::two_peaks();
        let baseline = Polynomial::new(vec![1.0, 0.05]);
        let raised: Vec<f64> = x
            .iter()
            .zip(y.iter())
            .map(|(x, y)| y + baseline.evaluate(*x))
            .collect();
        let n = x.len() - 1;
        let expected = integrate(&x, &y, 0, n);
        let observed = integrate_with_polynomial(&x, &raised, 0, n, &baseline);
        assert!((expected - observed).abs() < 1e-6);

        let via_enum = integrate_with_baseline(&x, &raised, 0, n, &baseline.clone().into());
        assert!((via_enum - observed).abs() < 1e-9);
    }

    #[test]
    fn test_matches_trapezoid_for_positive_signal() {
        let (x, y) = test_data::two_peaks();
        let trapezoid: f64 = x
            .windows(2)
            .zip(y.windows(2))
            .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
            .sum();
        let area = integrate(&x, &y, 0, x.len() - 1);
        assert!((area - trapezoid).abs() < 1e-6);
    }

    #[test]
    fn test_integrate_peak_writes_area() {
        let spectrum = Spectrum::new(X.to_vec(), Y.to_vec()).unwrap();
        let mut peak = Peak::new(0, 4);
        let area = integrate_peak(&spectrum, &mut peak, &Baseline::Constant(0.0));
        assert_eq!(area, peak.integ_num);
        assert!((area - 5.0).abs() < 1e-12);

        assert!((integrate_signal(&spectrum, 0, 4) - 5.0).abs() < 1e-12);
        let shifted = integrate_signal_with_offset(&spectrum, 1, 3, 1.0);
        assert!((shifted - 2.0).abs() < 1e-12);
        let flat = integrate_signal_with_polynomial(&spectrum, 1, 3, &Polynomial::constant(1.0));
        assert_eq!(shifted, flat);

        peak.set_integration_window(3, 3);
        assert_eq!(integrate_peak(&spectrum, &mut peak, &Baseline::None), 0.0);
        assert_eq!(peak.integ_num, 0.0);
    }
}
