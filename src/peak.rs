//! Peak records and the stages they pass through.
//!
//! [`Peak`] is the plain record describing a region of a signal. The staged wrappers
//! [`DetectedPeak`], [`LocatedPeak`] and [`IntegratedPeak`] can only be produced by the
//! step that fills in their fields, so holding an [`IntegratedPeak`] guarantees that
//! [`Peak::integ_num`] was computed, and holding a [`LocatedPeak`] guarantees that
//! [`Peak::max`] and [`Peak::min`] point at the extrema of the region.
use std::fmt;
use std::ops::Deref;

use mzpeaks::peak::MZPoint;
use mzpeaks::CentroidPeak;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::extrema::{find_maximum, find_minimum};
use crate::integrate::{integrate_peak, Baseline};
use crate::signal::SignalAccess;

/// A region of a signal identified as a rise followed by a fall.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Peak {
    /// The first sample index of the detected region
    pub start: usize,
    /// The sample index closing the detected region
    pub end: usize,
    /// The first sample index of the integration window
    pub int_start: usize,
    /// The last sample index of the integration window
    pub int_end: usize,
    /// The index of the tallest sample in the region, only meaningful once located
    pub max: usize,
    /// The index of the shortest sample in the region, only meaningful once located
    pub min: usize,

    /// Reserved for analytic peak shape fits
    pub deconv_x: f64,
    /// Reserved for analytic peak shape fits
    pub deconv_y: f64,

    /// The numerically integrated area
    pub integ_num: f64,
    /// Reserved for an analytically integrated area
    pub integ_analyt: f64,
}

impl Peak {
    /// Create a peak spanning `start..end`, integrated over the same window
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            int_start: start,
            int_end: end,
            max: start,
            min: start,
            ..Default::default()
        }
    }

    /// A zero-width peak anchored at `index`
    pub(crate) fn seeded_at(index: usize) -> Self {
        Self {
            start: index,
            max: index,
            end: index,
            ..Default::default()
        }
    }

    /// Widen or narrow the window used by integration without changing the detected region
    pub fn set_integration_window(&mut self, int_start: usize, int_end: usize) {
        self.int_start = int_start;
        self.int_end = int_end;
    }

    /// The number of samples between `start` and `end`
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }
}

impl fmt::Display for Peak {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Peak({}..{}, max={}, min={}, area={})",
            self.start, self.end, self.max, self.min, self.integ_num
        )
    }
}

/// A [`Peak`] as emitted by the segmenter. Only the region bounds are meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectedPeak(Peak);

impl DetectedPeak {
    pub(crate) fn new(peak: Peak) -> Self {
        Self(peak)
    }

    /// Find the tallest and shortest samples of the region
    pub fn locate<S: SignalAccess + ?Sized>(self, signal: &S) -> LocatedPeak {
        let mut peak = self.0;
        peak.max = find_maximum(signal, &peak);
        peak.min = find_minimum(signal, &peak);
        LocatedPeak(peak)
    }

    pub fn into_inner(self) -> Peak {
        self.0
    }
}

impl Deref for DetectedPeak {
    type Target = Peak;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A [`Peak`] whose [`Peak::max`] and [`Peak::min`] have been located
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocatedPeak(Peak);

impl LocatedPeak {
    /// Override the integration window before integrating
    pub fn with_integration_window(mut self, int_start: usize, int_end: usize) -> Self {
        self.0.set_integration_window(int_start, int_end);
        self
    }

    /// Integrate the area of the peak over its integration window after subtracting `baseline`
    pub fn integrate<S: SignalAccess + ?Sized>(self, signal: &S, baseline: &Baseline) -> IntegratedPeak {
        let mut peak = self.0;
        integrate_peak(signal, &mut peak, baseline);
        IntegratedPeak(peak)
    }

    /// The index of the tallest sample
    pub fn apex(&self) -> usize {
        self.0.max
    }

    pub fn into_inner(self) -> Peak {
        self.0
    }
}

impl Deref for LocatedPeak {
    type Target = Peak;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A fully enriched [`Peak`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntegratedPeak(Peak);

impl IntegratedPeak {
    pub fn area(&self) -> f64 {
        self.0.integ_num
    }

    pub fn apex(&self) -> usize {
        self.0.max
    }

    /// Summarize the peak as a centroid at the apex coordinate, carrying the integrated
    /// area as its intensity.
    pub fn to_centroid<S: SignalAccess + ?Sized>(&self, signal: &S, index: u32) -> CentroidPeak {
        CentroidPeak::new(signal.x(self.apex()), self.area() as f32, index)
    }

    /// The apex sample as an `(x, y)` point
    pub fn apex_point<S: SignalAccess + ?Sized>(&self, signal: &S) -> MZPoint {
        MZPoint {
            mz: signal.x(self.apex()),
            intensity: signal.y(self.apex()) as f32,
        }
    }

    pub fn into_inner(self) -> Peak {
        self.0
    }
}

impl Deref for IntegratedPeak {
    type Target = Peak;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for IntegratedPeak {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Convert a batch of peaks into centroids, numbered in order
pub fn centroids<S: SignalAccess + ?Sized>(signal: &S, peaks: &[IntegratedPeak]) -> Vec<CentroidPeak> {
    peaks
        .iter()
        .enumerate()
        .map(|(i, p)| p.to_centroid(signal, i as u32))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signal::Spectrum;

    fn bump() -> Spectrum {
        Spectrum::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![0.0, 1.0, 3.0, 1.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_constructor_sets_integration_window() {
        let mut peak = Peak::new(2, 9);
        assert_eq!((peak.int_start, peak.int_end), (2, 9));
        assert_eq!(peak.width(), 7);
        peak.set_integration_window(1, 11);
        assert_eq!((peak.start, peak.end), (2, 9));
        assert_eq!((peak.int_start, peak.int_end), (1, 11));
        assert!(peak.contains(9) && !peak.contains(10));
        assert_eq!(peak.deconv_x, 0.0);
        assert_eq!(peak.integ_analyt, 0.0);
    }

    #[test]
    fn test_stages() {
        let spectrum = bump();
        let detected = DetectedPeak::new(Peak::new(0, 4));
        let located = detected.locate(&spectrum);
        assert_eq!(located.apex(), 2);
        assert_eq!(located.min, 0);

        let integrated = located.integrate(&spectrum, &Baseline::None);
        assert!((integrated.area() - 5.0).abs() < 1e-12);
        assert_eq!(integrated.into_inner().integ_num, integrated.area());

        let centroid = integrated.to_centroid(&spectrum, 3);
        assert_eq!(centroid.mz, 2.0);
        assert_eq!(centroid.intensity, 5.0);
        assert_eq!(centroid.index, 3);
        assert_eq!(integrated.apex_point(&spectrum).intensity, 3.0);

        let all = centroids(&spectrum, &[integrated, integrated]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].index, 1);
    }

    #[test]
    fn test_narrowed_integration_window() {
        let spectrum = bump();
        let integrated = DetectedPeak::new(Peak::new(0, 4))
            .locate(&spectrum)
            .with_integration_window(1, 3)
            .integrate(&spectrum, &Baseline::None);
        assert_eq!((integrated.start, integrated.end), (0, 4));
        assert!((integrated.area() - 4.0).abs() < 1e-12);
    }
}
