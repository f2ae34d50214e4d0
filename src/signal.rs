//! The sampled signal container the processing stages operate on.
//!
//! The stages only consume the [`SignalAccess`] surface, so any storage that can
//! expose paired x/y arrays can be processed. [`Spectrum`] is the owned,
//! `Vec`-backed implementation used throughout this crate.
use std::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arrayops::{is_increasing, minmax};
use crate::search;

/// Ways a signal can fail to be constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("The x and y arrays do not match in length ({0} != {1})")]
    XYLengthMismatch(usize, usize),
    #[error("The x array is not sorted")]
    XNotSorted,
}

/// Read and write access to a sampled x/y signal.
///
/// Indexing methods panic on out of range indices the same way slice indexing does.
pub trait SignalAccess {
    /// The x coordinates of the signal, in increasing order
    fn x_array(&self) -> &[f64];

    /// The sampled magnitudes of the signal
    fn y_array(&self) -> &[f64];

    /// Mutable access to the sampled magnitudes. Callers that change values
    /// through this slice should call [`SignalAccess::analyse`] afterwards.
    fn y_array_mut(&mut self) -> &mut [f64];

    /// The largest y value as of the last [`SignalAccess::analyse`] call
    fn max(&self) -> f64;

    /// The smallest y value as of the last [`SignalAccess::analyse`] call
    fn min(&self) -> f64;

    /// Recompute the cached aggregate statistics of the y values
    fn analyse(&mut self);

    fn len(&self) -> usize {
        self.x_array().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn x(&self, i: usize) -> f64 {
        self.x_array()[i]
    }

    #[inline]
    fn y(&self, i: usize) -> f64 {
        self.y_array()[i]
    }

    #[inline]
    fn set_y(&mut self, i: usize, value: f64) {
        self.y_array_mut()[i] = value;
    }

    /// Overwrite the y values from index 0 with `values`.
    ///
    /// A shorter buffer leaves the trailing samples untouched, extra values are ignored.
    fn set_spectrum(&mut self, values: &[f64]) {
        let ys = self.y_array_mut();
        let n = ys.len().min(values.len());
        ys[..n].copy_from_slice(&values[..n]);
        self.analyse();
    }

    /// Find the index of the sample whose x coordinate is closest to `x`
    fn x_to_index(&self, x: f64) -> usize {
        search::nearest(self.x_array(), x)
    }
}

/// An owned x/y signal with cached extrema.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spectrum {
    x: Vec<f64>,
    y: Vec<f64>,
    max: f64,
    min: f64,
}

impl Spectrum {
    /// Create a new [`Spectrum`], checking that the arrays are paired and that
    /// `x` is sorted.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, SignalError> {
        if x.len() != y.len() {
            return Err(SignalError::XYLengthMismatch(x.len(), y.len()));
        }
        if !is_increasing(&x) {
            return Err(SignalError::XNotSorted);
        }
        let mut inst = Self {
            x,
            y,
            max: 0.0,
            min: 0.0,
        };
        inst.analyse();
        Ok(inst)
    }

    /// Build a spectrum over the sample indices `0..y.len()`
    pub fn from_y(y: Vec<f64>) -> Self {
        let x = (0..y.len()).map(|i| i as f64).collect();
        let mut inst = Self {
            x,
            y,
            max: 0.0,
            min: 0.0,
        };
        inst.analyse();
        inst
    }

    /// Iterate over `(x, y)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Consume the spectrum, returning the x and y arrays
    pub fn into_arrays(self) -> (Vec<f64>, Vec<f64>) {
        (self.x, self.y)
    }
}

impl SignalAccess for Spectrum {
    fn x_array(&self) -> &[f64] {
        &self.x
    }

    fn y_array(&self) -> &[f64] {
        &self.y
    }

    fn y_array_mut(&mut self) -> &mut [f64] {
        &mut self.y
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn analyse(&mut self) {
        if self.y.is_empty() {
            self.min = 0.0;
            self.max = 0.0;
        } else {
            let (min, max) = minmax(&self.y);
            self.min = min;
            self.max = max;
        }
    }
}

impl TryFrom<(Vec<f64>, Vec<f64>)> for Spectrum {
    type Error = SignalError;

    fn try_from((x, y): (Vec<f64>, Vec<f64>)) -> Result<Self, Self::Error> {
        Self::new(x, y)
    }
}

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Spectrum({} points, min={}, max={})",
            self.len(),
            self.min,
            self.max
        )
    }
}
