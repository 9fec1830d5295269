use kurbo::Point;

use crate::foundation::core::SweepRange;
use crate::foundation::error::ScriptResult;

/// Number of evenly spaced samples used whenever a function is evaluated
/// over a sweep.
///
/// The count is fixed so two evaluations of the same function over the same
/// domain always produce identical ranges. 101 points keeps the midpoint of
/// a symmetric domain on the grid.
pub const SAMPLE_COUNT: usize = 101;

/// Evenly spaced values across `range`, endpoints included.
///
/// Computed through the normalized parameter so the endpoints land exactly
/// on the range bounds.
pub(crate) fn linspace(range: SweepRange, count: usize) -> Vec<f64> {
    if count <= 1 {
        return vec![range.from];
    }
    let span = range.span();
    (0..count)
        .map(|i| range.from + span * (i as f64 / (count - 1) as f64))
        .collect()
}

/// Min/max of `f` sampled at [`SAMPLE_COUNT`] points across `domain`.
pub(crate) fn sampled_range(
    domain: SweepRange,
    mut f: impl FnMut(f64) -> ScriptResult<f64>,
) -> ScriptResult<SweepRange> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for x in linspace(domain, SAMPLE_COUNT) {
        let y = f(x)?;
        lo = lo.min(y);
        hi = hi.max(y);
    }
    Ok(SweepRange { from: lo, to: hi })
}

/// Point on a circle given center, radius, and angle in radians.
pub(crate) fn point_on_circle(center: Point, radius: f64, angle_rad: f64) -> Point {
    Point::new(
        center.x + radius * angle_rad.cos(),
        center.y + radius * angle_rad.sin(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
