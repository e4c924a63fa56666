use crate::{modes::ApproximationMethod, types::Point};

/// Reduce a closed border according to `method`.
pub fn approximate(points: Vec<Point>, method: ApproximationMethod) -> Vec<Point> {
    match method {
        ApproximationMethod::None => points,
        ApproximationMethod::Simple => compress_runs(&points),
    }
}

/// Keep only the points where the step direction changes around the loop.
///
/// Consecutive border points of an 8-connected trace differ by a unit step, so
/// a straight horizontal, vertical or diagonal run collapses to its two end
/// points.
fn compress_runs(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let step = |from: Point, to: Point| ((to.x - from.x).signum(), (to.y - from.y).signum());

    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    // A loop always turns somewhere; this only guards degenerate input.
    if kept.is_empty() {
        vec![points[0]]
    } else {
        kept
    }
}
