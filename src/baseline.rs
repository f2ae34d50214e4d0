//! Estimate a polynomial baseline from the parts of a signal outside any peak.
use log::debug;
use thiserror::Error;

use crate::peak::Peak;
use crate::polynomial::{Polynomial, PolynomialError};
use crate::signal::SignalAccess;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BaselineError {
    #[error("Only {0} samples fall outside of the peaks, a polynomial of order {1} needs more")]
    TooFewPoints(usize, usize),
    #[error("Failed to fit the baseline: {0}")]
    FitFailed(#[from] PolynomialError),
}

/// Collect the samples of `signal` not covered by any of `peaks`, counting both
/// `start` and `end` as covered.
pub fn background_points<S: SignalAccess + ?Sized>(signal: &S, peaks: &[Peak]) -> (Vec<f64>, Vec<f64>) {
    let n = signal.len();
    let mut covered = vec![false; n];
    for peak in peaks {
        let end = peak.end.min(n.saturating_sub(1));
        if peak.start <= end {
            covered[peak.start..=end].fill(true);
        }
    }
    signal
        .x_array()
        .iter()
        .zip(signal.y_array())
        .zip(covered)
        .filter(|(_, hit)| !hit)
        .map(|((x, y), _)| (*x, *y))
        .unzip()
}

/// Fit a polynomial of `order` through the samples of `signal` outside all `peaks`.
pub fn fit_baseline<S: SignalAccess + ?Sized>(
    signal: &S,
    peaks: &[Peak],
    order: usize,
) -> Result<Polynomial, BaselineError> {
    let (xs, ys) = background_points(signal, peaks);
    if xs.len() <= order {
        return Err(BaselineError::TooFewPoints(xs.len(), order));
    }
    let poly = Polynomial::fit(&xs, &ys, order)?;
    debug!(
        "Fit a baseline of order {order} through {} background points: {:?}",
        xs.len(),
        poly.as_ref()
    );
    Ok(poly)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signal::Spectrum;
    use crate::test_data;

    #[test]
    fn test_background_points() {
        let spectrum = Spectrum::from_y(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let peaks = [Peak::new(1, 2), Peak::new(4, 9)];
        let (xs, ys) = background_points(&spectrum, &peaks);
        assert_eq!(xs, vec![0.0, 3.0]);
        assert_eq!(ys, vec![0.0, 3.0]);
    }

    #[test_log::test]
    fn test_recover_linear_baseline() {
        let (x, y) = test_data::two_peaks();
        let truth = Polynomial::new(vec![2.0, 0.3]);
        let raised: Vec<f64> = x
            .iter()
            .zip(y.iter())
            .map(|(x, y)| y + truth.evaluate(*x))
            .collect();
        let spectrum = Spectrum::new(x, raised).unwrap();
        let peaks = [
            Peak::new(spectrum.x_to_index(1.0), spectrum.x_to_index(5.0)),
            Peak::new(spectrum.x_to_index(5.0), spectrum.x_to_index(9.5)),
        ];
        let fit = fit_baseline(&spectrum, &peaks, 1).unwrap();
        for (a, b) in fit.iter().zip(truth.iter()) {
            assert!((a - b).abs() < 1e-3, "{fit:?} vs {truth:?}");
        }
    }

    #[test]
    fn test_too_few_points() {
        let spectrum = Spectrum::from_y(vec![0.0, 1.0, 2.0]);
        let peaks = [Peak::new(0, 1)];
        assert_eq!(
            fit_baseline(&spectrum, &peaks, 1),
            Err(BaselineError::TooFewPoints(1, 1))
        );
    }
}
