//! Locate the tallest and shortest samples of a peak region.
use crate::peak::Peak;
use crate::signal::SignalAccess;

/// Scan `start..end` of `ys`, only replacing the current best when `better` holds strictly
fn scan_extremum<F: Fn(f64, f64) -> bool>(ys: &[f64], start: usize, end: usize, better: F) -> usize {
    let end = end.min(ys.len());
    if start >= end {
        return start;
    }
    let mut best_i = start;
    let mut best = ys[start];
    for (i, y) in ys[start..end].iter().copied().enumerate().skip(1) {
        if better(y, best) {
            best = y;
            best_i = start + i;
        }
    }
    best_i
}

/// Find the index of the tallest sample in `peak.start..peak.end`.
///
/// Ties resolve to the earliest index. An empty region yields `peak.start`.
pub fn find_maximum<S: SignalAccess + ?Sized>(signal: &S, peak: &Peak) -> usize {
    scan_extremum(signal.y_array(), peak.start, peak.end, |y, best| y > best)
}

/// Find the index of the shortest sample in `peak.start..peak.end`.
///
/// Ties resolve to the earliest index. An empty region yields `peak.start`.
pub fn find_minimum<S: SignalAccess + ?Sized>(signal: &S, peak: &Peak) -> usize {
    scan_extremum(signal.y_array(), peak.start, peak.end, |y, best| y < best)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signal::Spectrum;
    use rstest::rstest;

    #[rstest]
    #[case(0, 5, 2, 0)]
    #[case(3, 5, 3, 4)]
    #[case(1, 3, 2, 1)]
    #[case(2, 2, 2, 2)]
    fn test_bump(#[case] start: usize, #[case] end: usize, #[case] max: usize, #[case] min: usize) {
        let spectrum = Spectrum::from_y(vec![0.0, 1.0, 3.0, 1.0, 0.0]);
        let peak = Peak::new(start, end);
        assert_eq!(find_maximum(&spectrum, &peak), max);
        assert_eq!(find_minimum(&spectrum, &peak), min);
    }

    #[test]
    fn test_ties_resolve_earliest() {
        let spectrum = Spectrum::from_y(vec![1.0, 4.0, 2.0, 4.0, 1.0, 2.0]);
        let peak = Peak::new(0, 6);
        assert_eq!(find_maximum(&spectrum, &peak), 1);
        assert_eq!(find_minimum(&spectrum, &peak), 0);
    }

    #[test]
    fn test_end_past_signal_is_truncated() {
        let spectrum = Spectrum::from_y(vec![0.0, 2.0, 5.0]);
        let peak = Peak::new(1, 10);
        assert_eq!(find_maximum(&spectrum, &peak), 2);
        assert_eq!(find_minimum(&spectrum, &peak), 1);
        assert_eq!(find_maximum(&spectrum, &Peak::new(7, 10)), 7);
    }

    #[test]
    fn test_negative_signal() {
        let spectrum = Spectrum::from_y(vec![-5.0, -2.0, -3.0]);
        let peak = Peak::new(0, 3);
        assert_eq!(find_maximum(&spectrum, &peak), 1);
        assert_eq!(find_minimum(&spectrum, &peak), 0);
    }
}
