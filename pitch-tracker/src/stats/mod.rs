// Statistics engine: pure functions over pitch logs and finalized records.
//
// Nothing in here holds state. Every function takes records by reference and
// returns freshly computed values, so the game and training state machines
// (and any view) can call them as often as they like.

pub mod pitch_mix;
pub mod season;
pub mod trend;

use crate::model::{GameRecord, Handedness, PitchEvent, StrikeTally};

pub use pitch_mix::{
    best_pitches, recent_sessions, session_stats, PitchTypeStat, SessionStats, HISTORY_SESSIONS,
};
pub use season::{season_stats, workload_summary, SeasonStats, Workload};
pub use trend::{rolling_strike_window, TrendPoint, TREND_WINDOW};

// ---------------------------------------------------------------------------
// Percentages
// ---------------------------------------------------------------------------

/// `round(100 * strikes / pitches)`, or 0 when no pitches were thrown.
///
/// Always in `[0, 100]`: strikes beyond the pitch count are clamped.
pub fn strike_percent(pitches: u32, strikes: u32) -> u32 {
    if pitches == 0 {
        return 0;
    }
    let strikes = strikes.min(pitches);
    (100.0 * strikes as f64 / pitches as f64).round() as u32
}

/// Count the strikes in any log of strike-tallied pitches.
pub fn count_strikes<T: StrikeTally>(log: &[T]) -> u32 {
    log.iter().filter(|p| p.is_strike()).count() as u32
}

/// Color band for a strike percentage, used to flag command problems at a
/// glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeBand {
    /// Under 50%.
    Red,
    /// 50% up to 64%.
    Yellow,
    /// 65% and above.
    Green,
}

impl StrikeBand {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            0..=49 => StrikeBand::Red,
            50..=64 => StrikeBand::Yellow,
            _ => StrikeBand::Green,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrikeBand::Red => "red",
            StrikeBand::Yellow => "yellow",
            StrikeBand::Green => "green",
        }
    }
}

// ---------------------------------------------------------------------------
// Handedness splits
// ---------------------------------------------------------------------------

/// Pitch and strike totals, overall and split by batter handedness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCounts {
    pub pitches: u32,
    pub strikes: u32,
    pub lhb_pitches: u32,
    pub lhb_strikes: u32,
    pub rhb_pitches: u32,
    pub rhb_strikes: u32,
}

impl SplitCounts {
    /// Tally a live pitch log.
    pub fn from_pitches(pitches: &[PitchEvent]) -> Self {
        let mut counts = SplitCounts::default();
        for pitch in pitches {
            let strike = u32::from(pitch.is_strike());
            counts.pitches += 1;
            counts.strikes += strike;
            match pitch.batter_hand {
                Handedness::Left => {
                    counts.lhb_pitches += 1;
                    counts.lhb_strikes += strike;
                }
                Handedness::Right => {
                    counts.rhb_pitches += 1;
                    counts.rhb_strikes += strike;
                }
            }
        }
        counts
    }

    /// Lift the totals out of a finalized outing.
    pub fn from_record(record: &GameRecord) -> Self {
        SplitCounts {
            pitches: record.total_pitches,
            strikes: record.strikes,
            lhb_pitches: record.lhb_pitches,
            lhb_strikes: record.lhb_strikes,
            rhb_pitches: record.rhb_pitches,
            rhb_strikes: record.rhb_strikes,
        }
    }

    pub fn strike_percent(&self) -> u32 {
        strike_percent(self.pitches, self.strikes)
    }

    pub fn vs_lhb_percent(&self) -> u32 {
        strike_percent(self.lhb_pitches, self.lhb_strikes)
    }

    pub fn vs_rhb_percent(&self) -> u32 {
        strike_percent(self.rhb_pitches, self.rhb_strikes)
    }
}

impl std::ops::AddAssign for SplitCounts {
    fn add_assign(&mut self, other: Self) {
        self.pitches += other.pitches;
        self.strikes += other.strikes;
        self.lhb_pitches += other.lhb_pitches;
        self.lhb_strikes += other.lhb_strikes;
        self.rhb_pitches += other.rhb_pitches;
        self.rhb_strikes += other.rhb_strikes;
    }
}

impl std::iter::Sum for SplitCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(SplitCounts::default(), |mut acc, c| {
            acc += c;
            acc
        })
    }
}
