//! Partition a signal into peak regions in a single streaming pass.
//!
//! The segmenter walks the samples in order and tracks whether it is outside a peak
//! ([`SegmentState::Closed`]), on a rising edge ([`SegmentState::Rising`]) or on a falling
//! edge ([`SegmentState::Falling`]). Sample values are rounded to `1 / precision` before
//! being compared so that differences below that resolution read as a plateau.
//!
//! A region is emitted when a falling edge drops to or below the threshold, or when a
//! falling edge turns upward again, in which case the region ends at the last falling
//! sample and a new region starts from it. A region that has not started falling when the
//! signal drops below the threshold, or that is still open at the end of the scan, is
//! discarded.
use std::iter::StepBy;
use std::ops::Range;

use log::{debug, trace};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::peak::{DetectedPeak, Peak};
use crate::signal::SignalAccess;

const DEFAULT_PRECISION: f64 = 1000.0;

/// All the ways segmentation parameters can be invalid
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SegmentationError {
    #[error("The scan step must be at least 1")]
    ZeroStep,
    #[error("The rounding precision must be positive and finite, received {0}")]
    NonPositivePrecision(f64),
    #[error("The scan range {0}..{1} does not fit in a signal of {2} points")]
    InvalidRange(usize, usize, usize),
}

/// Where the segmenter is relative to the current region
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    #[default]
    Closed,
    Rising,
    Falling,
}

/// The streaming state machine behind [`PeakSegmenter`].
///
/// Feed it samples in scan order with [`PeakSegmentation::step`].
#[derive(Debug, Clone)]
pub struct PeakSegmentation {
    threshold: f64,
    precision: f64,
    state: SegmentState,
    /// The last rounded value above the threshold
    last_value: f64,
    /// The index of the last sample that was not consumed by an emission
    last_index: usize,
    peak: Peak,
}

impl PeakSegmentation {
    pub fn new(threshold: f64, precision: f64) -> Self {
        Self::starting_at(threshold, precision, 0)
    }

    /// Create a state machine for a scan beginning at sample `start`
    pub fn starting_at(threshold: f64, precision: f64, start: usize) -> Self {
        Self {
            threshold,
            precision,
            state: SegmentState::Closed,
            last_value: 0.0,
            last_index: start,
            peak: Peak::seeded_at(start),
        }
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    /// Round `value` to the segmenter's precision
    #[inline]
    pub fn quantize(&self, value: f64) -> f64 {
        libm::round(value * self.precision) / self.precision
    }

    /// Finish the current region at `end` and start a fresh one at `seed`
    fn emit(&mut self, end: usize, seed: usize) -> Peak {
        let mut done = self.peak;
        done.end = end;
        done.set_integration_window(done.start, end);
        self.peak = Peak::seeded_at(seed);
        self.state = SegmentState::Closed;
        done
    }

    /// Advance over the sample at `index`, returning a peak if this sample closed one.
    pub fn step(&mut self, index: usize, value: f64) -> Option<Peak> {
        let y = self.quantize(value);

        if y <= self.threshold {
            let emitted = match self.state {
                SegmentState::Falling => Some(self.emit(index, index)),
                SegmentState::Rising | SegmentState::Closed => None,
            };
            self.state = SegmentState::Closed;
            self.last_index = index;
            return emitted;
        }

        if y > self.last_value {
            match self.state {
                SegmentState::Rising => self.peak.max = index,
                SegmentState::Closed => self.peak.start = self.last_index,
                SegmentState::Falling => {
                    // A second rise, the valley sample closes this region
                    return Some(self.emit(self.last_index, index));
                }
            }
            self.state = SegmentState::Rising;
        } else if y < self.last_value {
            self.state = SegmentState::Falling;
        }

        self.last_index = index;
        self.last_value = y;
        None
    }
}

/// Lazily segment a signal, yielding each [`Peak`] as soon as it is closed
pub struct PeakSegments<'a, S: SignalAccess + ?Sized> {
    signal: &'a S,
    indices: StepBy<Range<usize>>,
    state: PeakSegmentation,
}

impl<'a, S: SignalAccess + ?Sized> PeakSegments<'a, S> {
    pub fn new(signal: &'a S, segmenter: &PeakSegmenter) -> Self {
        let (start, end) = segmenter.scan_bounds(signal.len());
        Self {
            signal,
            indices: (start..end).step_by(segmenter.step.max(1)),
            state: PeakSegmentation::starting_at(segmenter.threshold, segmenter.precision, start),
        }
    }
}

impl<S: SignalAccess + ?Sized> Iterator for PeakSegments<'_, S> {
    type Item = Peak;

    fn next(&mut self) -> Option<Self::Item> {
        for i in self.indices.by_ref() {
            if let Some(peak) = self.state.step(i, self.signal.y(i)) {
                return Some(peak);
            }
        }
        None
    }
}

/// Configuration for splitting a signal into peak regions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeakSegmenter {
    /// Samples at or below this value are never part of a rise or fall
    pub threshold: f64,
    /// Values are rounded to multiples of `1 / precision` before comparison
    pub precision: f64,
    /// The first index to scan
    pub start: usize,
    /// The index to stop scanning at, exclusive. `0` scans to the end of the signal
    pub end: usize,
    /// The stride between scanned samples
    pub step: usize,
}

impl Default for PeakSegmenter {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            precision: DEFAULT_PRECISION,
            start: 0,
            end: 0,
            step: 1,
        }
    }
}

/// A builder for configuring [`PeakSegmenter`]
#[derive(Debug, Clone, Default)]
pub struct PeakSegmenterBuilder {
    inner: PeakSegmenter,
}

impl PeakSegmenterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threshold(&mut self, threshold: f64) -> &mut Self {
        self.inner.threshold = threshold;
        self
    }

    pub fn precision(&mut self, precision: f64) -> &mut Self {
        self.inner.precision = precision;
        self
    }

    pub fn start(&mut self, start: usize) -> &mut Self {
        self.inner.start = start;
        self
    }

    pub fn end(&mut self, end: usize) -> &mut Self {
        self.inner.end = end;
        self
    }

    pub fn step(&mut self, step: usize) -> &mut Self {
        self.inner.step = step;
        self
    }

    pub fn build(&self) -> PeakSegmenter {
        self.inner
    }
}

impl From<PeakSegmenterBuilder> for PeakSegmenter {
    fn from(value: PeakSegmenterBuilder) -> Self {
        value.build()
    }
}

impl PeakSegmenter {
    pub fn new(threshold: f64, precision: f64, start: usize, end: usize, step: usize) -> Self {
        Self {
            threshold,
            precision,
            start,
            end,
            step,
        }
    }

    pub fn builder() -> PeakSegmenterBuilder {
        PeakSegmenterBuilder::new()
    }

    /// The scanned index range for a signal of `n` points, clipped to the signal.
    /// A zero step is scanned as `1`.
    fn scan_bounds(&self, n: usize) -> (usize, usize) {
        let end = if self.end == 0 { n } else { self.end.min(n) };
        (self.start.min(end), end)
    }

    /// Check that this configuration can scan a signal of `n` points as given
    pub fn validate(&self, n: usize) -> Result<(), SegmentationError> {
        if self.step == 0 {
            return Err(SegmentationError::ZeroStep);
        }
        if !(self.precision > 0.0 && self.precision.is_finite()) {
            return Err(SegmentationError::NonPositivePrecision(self.precision));
        }
        let end = if self.end == 0 { n } else { self.end };
        if self.start > end || end > n {
            return Err(SegmentationError::InvalidRange(self.start, end, n));
        }
        Ok(())
    }

    /// Iterate over the peaks of `signal` as they are found
    pub fn iter<'a, S: SignalAccess + ?Sized>(&self, signal: &'a S) -> PeakSegments<'a, S> {
        PeakSegments::new(signal, self)
    }

    /// Split `signal` into peak regions, in scan order.
    ///
    /// Out of range scan bounds are clipped to the signal.
    pub fn segment<S: SignalAccess + ?Sized>(&self, signal: &S) -> Vec<Peak> {
        let peaks: Vec<Peak> = self.iter(signal).collect();
        debug!(
            "Segmented {} peaks from {} points above {}",
            peaks.len(),
            signal.len(),
            self.threshold
        );
        for peak in peaks.iter() {
            trace!("Region {}..{}", peak.start, peak.end);
        }
        peaks
    }

    /// Like [`PeakSegmenter::segment`], but check the configuration first
    pub fn try_segment<S: SignalAccess + ?Sized>(
        &self,
        signal: &S,
    ) -> Result<Vec<Peak>, SegmentationError> {
        self.validate(signal.len())?;
        Ok(self.segment(signal))
    }

    /// Segment `signal`, wrapping each region as a [`DetectedPeak`] for the later stages
    pub fn detect<S: SignalAccess + ?Sized>(&self, signal: &S) -> Vec<DetectedPeak> {
        self.segment(signal)
            .into_iter()
            .map(DetectedPeak::new)
            .collect()
    }
}

/// Split `signal` into peak regions between `start` and `end` (`0` meaning the
/// whole signal), visiting every `step`-th sample.
pub fn pick_peaks<S: SignalAccess + ?Sized>(
    signal: &S,
    threshold: f64,
    precision: f64,
    start: usize,
    end: usize,
    step: usize,
) -> Vec<Peak> {
    PeakSegmenter::new(threshold, precision, start, end, step).segment(signal)
}
