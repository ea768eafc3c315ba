// End-of-game summary: team totals, per-pitcher lines and who can still
// pitch today.

use crate::model::{GameRecord, InningsPitched, Pitcher, PitcherId};
use crate::stats::SplitCounts;

use super::state::Game;

/// One completed outing as listed in the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct OutingLine {
    pub pitcher_id: PitcherId,
    pub pitcher_name: String,
    pub total_pitches: u32,
    pub innings: InningsPitched,
    pub strike_percent: u32,
}

/// A team pitcher and their remaining budget.
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    pub pitcher_id: PitcherId,
    pub pitcher_name: String,
    pub available_today: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub total_pitches: u32,
    pub strikes: u32,
    pub strike_percent: u32,
    pub batters_faced: u32,
    pub outs: u32,
    pub vs_lhb: u32,
    pub vs_rhb: u32,
    pub lines: Vec<OutingLine>,
    pub available: Vec<Availability>,
    pub unavailable: Vec<Availability>,
}

impl GameSummary {
    /// Team innings in `W.P` notation.
    pub fn innings(&self) -> InningsPitched {
        InningsPitched::from_outs(self.outs)
    }
}

/// Outs implied by an innings-pitched figure in `W.P` notation.
pub fn outs_from_innings(innings: f64) -> u32 {
    let whole = innings.trunc();
    let partial = ((innings - whole) * 10.0).round();
    (whole * 3.0 + partial).max(0.0) as u32
}

/// Summarize a game. Reads only completed outings; `team_pitchers` is the
/// team's current pitcher records, used for the availability lists.
pub fn summarize(game: &Game, team_pitchers: &[&Pitcher]) -> GameSummary {
    let records: Vec<&GameRecord> = game.outings.iter().map(|o| &o.record).collect();
    let splits: SplitCounts = records.iter().map(|r| SplitCounts::from_record(r)).sum();

    let lines = game
        .outings
        .iter()
        .map(|o| OutingLine {
            pitcher_id: o.pitcher_id,
            pitcher_name: o.pitcher_name.clone(),
            total_pitches: o.record.total_pitches,
            innings: o.record.innings,
            strike_percent: o.record.strike_percent,
        })
        .collect();

    let (available, unavailable): (Vec<&Pitcher>, Vec<&Pitcher>) =
        team_pitchers.iter().copied().partition(|p| p.is_available());
    let to_rows = |list: Vec<&Pitcher>| -> Vec<Availability> {
        list.into_iter()
            .map(|p| Availability {
                pitcher_id: p.id,
                pitcher_name: p.full_name.clone(),
                available_today: p.available_today,
            })
            .collect()
    };

    GameSummary {
        total_pitches: splits.pitches,
        strikes: splits.strikes,
        strike_percent: splits.strike_percent(),
        batters_faced: records.iter().map(|r| r.batters_faced).sum(),
        outs: records
            .iter()
            .map(|r| outs_from_innings(r.innings.as_decimal()))
            .sum(),
        vs_lhb: splits.vs_lhb_percent(),
        vs_rhb: splits.vs_rhb_percent(),
        lines,
        available: to_rows(available),
        unavailable: to_rows(unavailable),
    }
}
