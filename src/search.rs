//! # Interpolation Search
//!
//! Bracketing-interval lookup on sorted breakpoint sequences.

use crate::error::{DeltaError, Result};

/// Find the interval `i` such that `values[i] <= v <= values[i + 1]`.
///
/// `values` must be non-decreasing with at least two entries. When `v` sits
/// exactly on a breakpoint the index of that breakpoint is returned, except for
/// the final breakpoint which maps to `len - 2`. Values strictly outside
/// `[values[0], values[len - 1]]` are a [`DeltaError::Domain`] error.
///
/// Bisection keeps `values[first] <= v` and halves `[first, last]` until the
/// interval width is one: O(log n).
pub fn interval_index(values: &[f64], v: f64) -> Result<usize> {
    let n = values.len();
    if n < 2 {
        return Err(DeltaError::ShapeMismatch(format!(
            "interval search needs at least 2 breakpoints, got {}",
            n
        )));
    }

    let (min, max) = (values[0], values[n - 1]);
    if !(min..=max).contains(&v) {
        return Err(DeltaError::Domain { value: v, min, max });
    }

    let mut first = 0;
    let mut last = n - 1;
    while last - first > 1 {
        let mid = (first + last) / 2;
        if values[mid] <= v {
            first = mid;
        } else {
            last = mid;
        }
    }

    Ok(first)
}
