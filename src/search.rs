//! Coordinate searches over sorted arrays.
use num_traits::Float;

/// Binary search for `q`, returning the insertion point when it is absent.
pub fn binsearch<T: Float>(array: &[T], q: T) -> usize {
    match array.binary_search_by(|x| x.partial_cmp(&q).unwrap_or(std::cmp::Ordering::Less)) {
        Ok(i) => i,
        Err(i) => i,
    }
}

/// Perform a linear local search looking to the left (decreasing) of `start_index`
/// for the value closest to `target_val`.
pub fn nearest_left<T: Float>(vec: &[T], target_val: T, start_index: usize) -> usize {
    let mut nearest_index = start_index;
    let mut best_distance = (vec[start_index] - target_val).abs();
    let mut next_index = start_index;
    while next_index > 0 && vec[next_index] > target_val {
        next_index -= 1;
        let dist = (vec[next_index] - target_val).abs();
        if dist < best_distance {
            best_distance = dist;
            nearest_index = next_index;
        }
    }
    nearest_index
}

/// Perform a linear local search looking to the right (increasing) of `start_index`
/// for the value closest to `target_val`.
pub fn nearest_right<T: Float>(vec: &[T], target_val: T, start_index: usize) -> usize {
    let n = vec.len() - 1;
    let mut nearest_index = start_index;
    let mut best_distance = (vec[start_index] - target_val).abs();
    let mut next_index = start_index;
    while next_index < n && vec[next_index] < target_val {
        next_index += 1;
        let dist = (vec[next_index] - target_val).abs();
        if dist < best_distance {
            best_distance = dist;
            nearest_index = next_index;
        }
    }
    nearest_index
}

/// Find the index of the value in the sorted array `vec` closest to `target_val`.
///
/// Values outside the array's range snap to the first or last index. An empty
/// array yields `0`.
pub fn nearest<T: Float>(vec: &[T], target_val: T) -> usize {
    if vec.is_empty() {
        return 0;
    }
    let n = vec.len() - 1;

    if target_val >= vec[n] {
        return n;
    } else if target_val <= vec[0] {
        return 0;
    }

    let near = binsearch(vec, target_val).min(n);
    if vec[near] <= target_val {
        nearest_right(vec, target_val, near)
    } else {
        nearest_left(vec, target_val, near)
    }
}
