//! Rescale a signal relative to its maximum.
use cfg_if::cfg_if;
use log::debug;
use thiserror::Error;

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

use crate::signal::SignalAccess;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NormalizationError {
    #[error("The signal maximum is zero")]
    ZeroMaximum,
    #[error("The signal maximum is not finite ({0})")]
    NonFiniteMaximum(f64),
}

/// Rescale every sample so that the signal maximum becomes `max`.
///
/// The scaling is relative to zero, so `_min` is not used to offset the result. A signal
/// whose maximum is zero is filled with non-finite values, see [`try_normalise`] to
/// detect this up front. Cached statistics are refreshed afterwards.
pub fn normalise<S: SignalAccess + ?Sized>(signal: &mut S, _min: f64, max: f64) {
    let maximum = signal.max();
    let ys = signal.y_array_mut();
    cfg_if! {
        if #[cfg(feature = "parallelism")] {
            ys.par_iter_mut().for_each(|y| *y = *y / maximum * max);
        } else {
            ys.iter_mut().for_each(|y| *y = *y / maximum * max);
        }
    }
    debug!("Normalised {} points by {maximum} to {max}", ys.len());
    signal.analyse();
}

/// Like [`normalise`], but leave the signal untouched if its maximum cannot be divided by.
pub fn try_normalise<S: SignalAccess + ?Sized>(
    signal: &mut S,
    min: f64,
    max: f64,
) -> Result<(), NormalizationError> {
    let maximum = signal.max();
    if !maximum.is_finite() {
        return Err(NormalizationError::NonFiniteMaximum(maximum));
    }
    if maximum == 0.0 {
        return Err(NormalizationError::ZeroMaximum);
    }
    normalise(signal, min, max);
    Ok(())
}
