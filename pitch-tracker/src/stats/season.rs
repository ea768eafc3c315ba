// Season aggregates and workload summaries over a pitcher's game history.

use crate::model::Pitcher;

use super::SplitCounts;

/// Outings summed for the "last 5 days" workload figure.
pub const WORKLOAD_OUTINGS: usize = 5;

/// Outings listed individually in the workload summary.
pub const RECENT_OUTINGS: usize = 3;

/// Season-to-date strike percentages across every recorded outing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeasonStats {
    pub games: usize,
    pub total_pitches: u32,
    pub strike_percent: u32,
    pub vs_lhb: u32,
    pub vs_rhb: u32,
}

/// Sum every GameRecord's totals and splits, then take percentages.
/// A pitcher with no games gets all zeroes.
pub fn season_stats(pitcher: &Pitcher) -> SeasonStats {
    let totals: SplitCounts = pitcher.games.iter().map(SplitCounts::from_record).sum();
    SeasonStats {
        games: pitcher.games.len(),
        total_pitches: totals.pitches,
        strike_percent: totals.strike_percent(),
        vs_lhb: totals.vs_lhb_percent(),
        vs_rhb: totals.vs_rhb_percent(),
    }
}

/// Recent pitch workload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workload {
    /// Total pitches over the most recent [`WORKLOAD_OUTINGS`] outings.
    ///
    /// Labelled "last 5 days" in the coach's view, but it counts outings,
    /// not calendar days.
    pub last_five_total: u32,
    /// Pitch counts of the most recent outings, newest first.
    pub last_outings: Vec<u32>,
}

pub fn workload_summary(pitcher: &Pitcher) -> Workload {
    let games = &pitcher.games;
    let last_five_total = games
        .iter()
        .rev()
        .take(WORKLOAD_OUTINGS)
        .map(|g| g.total_pitches)
        .sum();
    let last_outings = games
        .iter()
        .rev()
        .take(RECENT_OUTINGS)
        .map(|g| g.total_pitches)
        .collect();
    Workload { last_five_total, last_outings }
}
