use num_traits::{Float, ToPrimitive};

/// Build an evenly spaced axis from `start` up to (but excluding) `end`.
pub fn gridspace<T: Float + ToPrimitive>(start: T, end: T, step: T) -> Vec<T> {
    let distance = end - start;
    let steps = (distance / step).to_usize().unwrap_or_default();
    let mut result = Vec::with_capacity(steps);
    for i in 0..steps {
        result.push(start + T::from(i).unwrap() * step);
    }
    result
}

/// The smallest and largest values of `values`, ignoring NaN.
///
/// An empty slice gives `(inf, -inf)`.
pub fn minmax<T: Float>(values: &[T]) -> (T, T) {
    let mut max = -T::infinity();
    let mut min = T::infinity();

    for v in values.iter() {
        if *v > max {
            max = *v;
        }
        if *v < min {
            min = *v
        }
    }
    (min, max)
}

/// Check if the values in `it` are monotonically ascending or flat
pub fn is_increasing<F: Float>(it: &[F]) -> bool {
    it.windows(2).all(|w| w[0] <= w[1])
}
