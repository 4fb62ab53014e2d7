use crate::models::ScoredCandidate;

/// Raw points as a percentage of the best achievable score, in [0, 100]
///
/// A profile that asks for nothing (`max_points == 0`) is fully satisfied by
/// every property, so the result is 100.
#[inline]
pub fn percent_close(points: u32, max_points: u32) -> f64 {
    if max_points == 0 {
        return 100.0;
    }

    // Multiply first so exact percentages land on inclusive thresholds
    (points as f64 * 100.0 / max_points as f64).clamp(0.0, 100.0)
}

/// Fill in `percent_close` for every ranked candidate
pub fn apply_closeness(ranked: &mut [ScoredCandidate], max_points: u32) {
    for candidate in ranked.iter_mut() {
        candidate.percent_close = percent_close(candidate.points, max_points);
    }
}
