//! Significance stars.

/// Thresholds checked in order; the first with `p < threshold` wins.
pub const STAR_THRESHOLDS: [(f64, &str); 3] = [(0.01, "***"), (0.05, "**"), (0.1, "*")];

/// Legend line matching [`STAR_THRESHOLDS`].
pub const STAR_LEGEND: &str = "* p<.1, ** p<.05, ***p<.01";

/// Stars for a p-value. NaN and p ≥ 0.1 get none.
pub fn significance_stars(p_value: f64) -> &'static str {
    STAR_THRESHOLDS
        .iter()
        .find(|(threshold, _)| p_value < *threshold)
        .map_or("", |(_, stars)| stars)
}
