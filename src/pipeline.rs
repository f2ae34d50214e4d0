//! Run the full normalise, smooth, detect, locate and integrate sequence over a signal.
use log::{debug, warn};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::baseline::{fit_baseline, BaselineError};
use crate::integrate::Baseline;
use crate::normalize::{normalise, try_normalise, NormalizationError};
use crate::peak::{DetectedPeak, IntegratedPeak};
use crate::polynomial::Polynomial;
use crate::segment::{PeakSegmenter, SegmentationError};
use crate::signal::SignalAccess;
use crate::smooth::{smooth_function, try_smooth_function, Kernel, SmoothingError};

/// All the ways a checked pipeline run can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Failed to normalise the signal: {0}")]
    Normalization(#[from] NormalizationError),
    #[error("Failed to smooth the signal: {0}")]
    Smoothing(#[from] SmoothingError),
    #[error("Invalid segmentation parameters: {0}")]
    Segmentation(#[from] SegmentationError),
    #[error("Failed to estimate the baseline: {0}")]
    Baseline(#[from] BaselineError),
}

/// How to choose the baseline subtracted during integration
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BaselinePolicy {
    /// Integrate the signal as is
    #[default]
    None,
    /// Subtract a fixed level
    Constant(f64),
    /// Subtract a known polynomial
    Polynomial(Polynomial),
    /// Fit a polynomial of this order through the samples outside the detected peaks
    Fitted { order: usize },
}

/// The configuration for a complete peak picking run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeakPipeline {
    /// Rescale the signal so its maximum becomes this value before anything else
    pub normalise_to: Option<f64>,
    /// The number of kernel offsets to smooth with, `None` to skip smoothing
    pub smoothing_points: Option<usize>,
    pub kernel: Kernel,
    pub segmenter: PeakSegmenter,
    pub baseline: BaselinePolicy,
}

impl Default for PeakPipeline {
    fn default() -> Self {
        Self {
            normalise_to: Some(1.0),
            smoothing_points: None,
            kernel: Kernel::default(),
            segmenter: PeakSegmenter::default(),
            baseline: BaselinePolicy::default(),
        }
    }
}

/// A builder for configuring [`PeakPipeline`]
#[derive(Debug, Clone, Default)]
pub struct PeakPipelineBuilder {
    inner: PeakPipeline,
}

impl PeakPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalise_to(&mut self, max: Option<f64>) -> &mut Self {
        self.inner.normalise_to = max;
        self
    }

    pub fn smoothing(&mut self, points: Option<usize>, kernel: Kernel) -> &mut Self {
        self.inner.smoothing_points = points;
        self.inner.kernel = kernel;
        self
    }

    pub fn segmenter(&mut self, segmenter: PeakSegmenter) -> &mut Self {
        self.inner.segmenter = segmenter;
        self
    }

    pub fn threshold(&mut self, threshold: f64) -> &mut Self {
        self.inner.segmenter.threshold = threshold;
        self
    }

    pub fn baseline(&mut self, baseline: BaselinePolicy) -> &mut Self {
        self.inner.baseline = baseline;
        self
    }

    pub fn build(&self) -> PeakPipeline {
        self.inner.clone()
    }
}

impl From<PeakPipelineBuilder> for PeakPipeline {
    fn from(value: PeakPipelineBuilder) -> Self {
        value.inner
    }
}

impl PeakPipeline {
    pub fn builder() -> PeakPipelineBuilder {
        PeakPipelineBuilder::new()
    }

    fn resolve_baseline<S: SignalAccess + ?Sized>(
        &self,
        signal: &S,
        detected: &[DetectedPeak],
    ) -> Result<Baseline, BaselineError> {
        let baseline = match &self.baseline {
            BaselinePolicy::None => Baseline::None,
            BaselinePolicy::Constant(c) => Baseline::Constant(*c),
            BaselinePolicy::Polynomial(p) => Baseline::Polynomial(p.clone()),
            BaselinePolicy::Fitted { order } => {
                let peaks: Vec<_> = detected.iter().map(|p| p.into_inner()).collect();
                Baseline::Polynomial(fit_baseline(signal, &peaks, *order)?)
            }
        };
        Ok(baseline)
    }

    fn enrich<S: SignalAccess + ?Sized>(
        signal: &S,
        detected: Vec<DetectedPeak>,
        baseline: &Baseline,
    ) -> Vec<IntegratedPeak> {
        detected
            .into_iter()
            .map(|peak| peak.locate(signal).integrate(signal, baseline))
            .collect()
    }

    /// Process `signal` in place and return its enriched peaks.
    ///
    /// Numeric problems are not reported: a zero maximum fills the signal with NaN and a
    /// baseline that cannot be fit is replaced by no baseline.
    pub fn run<S: SignalAccess + ?Sized>(&self, signal: &mut S) -> Vec<IntegratedPeak> {
        if let Some(max) = self.normalise_to {
            normalise(signal, 0.0, max);
        }
        if let Some(points) = self.smoothing_points {
            smooth_function(signal, points, &self.kernel);
        }
        let detected = self.segmenter.detect(signal);
        let baseline = match self.resolve_baseline(signal, &detected) {
            Ok(baseline) => baseline,
            Err(err) => {
                warn!("{err}, integrating without a baseline");
                Baseline::None
            }
        };
        let peaks = Self::enrich(signal, detected, &baseline);
        debug!("Picked {} peaks from {} points", peaks.len(), signal.len());
        peaks
    }

    /// Like [`PeakPipeline::run`], but stop at the first stage that cannot proceed cleanly.
    pub fn try_run<S: SignalAccess + ?Sized>(
        &self,
        signal: &mut S,
    ) -> Result<Vec<IntegratedPeak>, PipelineError> {
        self.segmenter.validate(signal.len())?;
        if let Some(max) = self.normalise_to {
            try_normalise(signal, 0.0, max)?;
        }
        if let Some(points) = self.smoothing_points {
            try_smooth_function(signal, points, &self.kernel)?;
        }
        let detected = self.segmenter.detect(signal);
        let baseline = self.resolve_baseline(signal, &detected)?;
        let peaks = Self::enrich(signal, detected, &baseline);
        debug!("Picked {} peaks from {} points", peaks.len(), signal.len());
        Ok(peaks)
    }
}
