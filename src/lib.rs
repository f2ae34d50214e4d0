//! `peakpick` is a library for locating and quantifying peaks in one-dimensional
//! sampled signals such as spectra or chromatograms.
//!
//! A signal goes through up to five stages:
//! 1. [`normalise`] rescales it relative to its maximum
//! 2. [`smooth_function`] convolves it with a symmetric [`smooth::SmoothingKernel`]
//! 3. [`PeakSegmenter`] walks it once and emits the index range of each rise-and-fall
//! 4. [`find_maximum`] and [`find_minimum`] locate the extrema inside each range
//! 5. [`integrate`] and friends compute the area of each range above a [`Baseline`]
//!
//! [`PeakPipeline`] strings these together, carrying each peak through the
//! [`DetectedPeak`], [`LocatedPeak`] and [`IntegratedPeak`] stages. Every stage is
//! also usable on its own.
//!
//! The default functions never fail. Degenerate input produces non-finite values,
//! a zero area or an empty peak list. Each stage has a `try_` counterpart returning a
//! typed error instead.
//!
//! # Usage
//! ```
//! use peakpick::{PeakPipeline, Spectrum};
//!
//! let mut spectrum = Spectrum::new(
//!     vec![0.0, 1.0, 2.0, 3.0, 4.0],
//!     vec![0.0, 1.0, 3.0, 1.0, 0.0],
//! ).unwrap();
//! let pipeline = PeakPipeline::builder()
//!     .normalise_to(None)
//!     .threshold(0.5)
//!     .build();
//! let peaks = pipeline.run(&mut spectrum);
//! assert_eq!(peaks.len(), 1);
//! assert_eq!(peaks[0].apex(), 2);
//! assert_eq!(peaks[0].area(), 5.0);
//! for peak in peaks.iter() {
//!     println!("{}", peak);
//! }
//! ```
//!
//! ## Features
//! - `parallelism` (default) runs the per-sample loops with `rayon`
//! - `serde` derives `Serialize` and `Deserialize` for configuration and peak types
pub mod arrayops;
pub mod baseline;
pub mod extrema;
pub mod integrate;
pub mod normalize;
pub mod peak;
pub mod pipeline;
pub mod polynomial;
pub mod prelude;
pub mod search;
pub mod segment;
pub mod signal;
pub mod smooth;
pub mod text;

#[cfg(test)]
mod test_data;

pub use crate::baseline::fit_baseline;
pub use crate::extrema::{find_maximum, find_minimum};
pub use crate::integrate::{
    integrate, integrate_peak, integrate_with_baseline, integrate_with_offset,
    integrate_with_polynomial, try_integrate, Baseline,
};
pub use crate::normalize::{normalise, try_normalise};
pub use crate::peak::{DetectedPeak, IntegratedPeak, LocatedPeak, Peak};
pub use crate::pipeline::{BaselinePolicy, PeakPipeline, PipelineError};
pub use crate::polynomial::Polynomial;
pub use crate::segment::{pick_peaks, PeakSegmenter};
pub use crate::signal::{SignalAccess, Spectrum};
pub use crate::smooth::{smooth_function, try_smooth_function, Kernel};
