//! # Percentage Arithmetic
//!
//! Every score, coverage figure, and rate reported by the engines is an
//! integer percentage rounded half-up (0.5 rounds toward +∞). A zero
//! denominator yields 0 instead of NaN.

/// Round half-up toward positive infinity: `2.5 → 3`, `-2.5 → -2`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// `round(part / total * 100)`, or 0 when `total == 0`.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    round_half_up(part as f64 / total as f64 * 100.0).clamp(0, i64::from(u32::MAX)) as u32
}

/// Rounded arithmetic mean, or 0 for an empty input.
pub fn rounded_mean(values: impl IntoIterator<Item = f64>) -> i64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return 0;
    }
    round_half_up(sum / count as f64)
}
