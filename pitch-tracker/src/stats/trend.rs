// Rolling strike-percentage trend for charting a live pitch log.

use crate::model::StrikeTally;

use super::{count_strikes, strike_percent};

/// Default window, and number of points returned.
pub const TREND_WINDOW: usize = 20;

/// Strike percentage over the window ending at `pitch_number` (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    pub pitch_number: usize,
    pub percent: u32,
}

/// For every pitch `i`, the strike percentage over the trailing
/// `min(window, i + 1)` pitches. Only the last `window` points are returned.
///
/// This is O(n * window), fine for a single outing or practice.
pub fn rolling_strike_window<T: StrikeTally>(log: &[T], window: usize) -> Vec<TrendPoint> {
    let window = window.max(1);
    let first_kept = log.len().saturating_sub(window);

    (first_kept..log.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &log[start..=i];
            let strikes = count_strikes(slice);
            TrendPoint {
                pitch_number: i + 1,
                percent: strike_percent(slice.len() as u32, strikes),
            }
        })
        .collect()
}
