//! Piecewise-linear interpolation over a monotonic axis
//!
//! Query points outside the axis are extrapolated along the nearest edge
//! segment, matching the MATLAB-style interp1 the synthesis time base
//! depends on.

/// Interpolate `(x, y)` samples at the query points `xi`, writing into `yi`.
///
/// `x` must be strictly increasing and hold at least two points; `yi` must
/// be at least as long as `xi`.
pub fn interp1(x: &[f64], y: &[f64], xi: &[f64], yi: &mut [f64]) {
    debug_assert!(x.len() >= 2);
    debug_assert_eq!(x.len(), y.len());
    debug_assert!(yi.len() >= xi.len());

    for (out, &q) in yi.iter_mut().zip(xi.iter()) {
        *out = interp1_point(x, y, q);
    }
}

/// Interpolate a single query point against `(x, y)`.
pub fn interp1_point(x: &[f64], y: &[f64], q: f64) -> f64 {
    let last = x.len() - 1;
    // partition_point finds the first knot above q; clamp to a valid segment
    // so out-of-range queries extrapolate along the edge slope.
    let seg = x.partition_point(|&v| v <= q).clamp(1, last) - 1;
    let t = (q - x[seg]) / (x[seg + 1] - x[seg]);
    y[seg] + t * (y[seg + 1] - y[seg])
}
