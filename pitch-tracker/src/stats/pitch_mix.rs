// Per-pitch-type effectiveness from training sessions.

use crate::model::{PitchType, Pitcher, StrikeTally, TrainingPitch, TrainingSession};

use super::{count_strikes, strike_percent};

/// Training sessions considered when ranking a pitcher's best pitches.
pub const BEST_PITCH_SESSIONS: usize = 3;

/// How many pitch types `best_pitches` returns.
pub const BEST_PITCH_COUNT: usize = 2;

/// Training sessions shown in a pitcher's history view.
pub const HISTORY_SESSIONS: usize = 5;

/// Strike tally for one pitch type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchTypeStat {
    pub pitch_type: PitchType,
    pub count: u32,
    pub strikes: u32,
    pub strike_percent: u32,
}

/// Whole-session numbers plus the per-type breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub total: u32,
    pub strikes: u32,
    pub strike_percent: u32,
    /// Types actually thrown, in [`PitchType::ALL`] order.
    pub by_type: Vec<PitchTypeStat>,
}

impl SessionStats {
    /// Breakdown sorted by strike percentage, best first. Ties keep
    /// [`PitchType::ALL`] order.
    pub fn ranked(&self) -> Vec<PitchTypeStat> {
        let mut ranked = self.by_type.clone();
        ranked.sort_by(|a, b| b.strike_percent.cmp(&a.strike_percent));
        ranked
    }

    pub fn type_stat(&self, pitch_type: PitchType) -> Option<&PitchTypeStat> {
        self.by_type.iter().find(|s| s.pitch_type == pitch_type)
    }
}

/// Tally a set of training pitches, keeping pitch types in the order they
/// were first seen.
fn tally_in_encounter_order<'a>(
    pitches: impl IntoIterator<Item = &'a TrainingPitch>,
) -> Vec<PitchTypeStat> {
    let mut tallies: Vec<PitchTypeStat> = Vec::new();
    for pitch in pitches {
        let idx = match tallies.iter().position(|t| t.pitch_type == pitch.pitch_type) {
            Some(idx) => idx,
            None => {
                tallies.push(PitchTypeStat {
                    pitch_type: pitch.pitch_type,
                    count: 0,
                    strikes: 0,
                    strike_percent: 0,
                });
                tallies.len() - 1
            }
        };
        let tally = &mut tallies[idx];
        tally.count += 1;
        tally.strikes += u32::from(pitch.is_strike());
    }
    for tally in &mut tallies {
        tally.strike_percent = strike_percent(tally.count, tally.strikes);
    }
    tallies
}

/// Stats for a single session's pitches.
pub fn session_stats(pitches: &[TrainingPitch]) -> SessionStats {
    let total = pitches.len() as u32;
    let strikes = count_strikes(pitches);

    let mut by_type = tally_in_encounter_order(pitches);
    by_type.sort_by_key(|s| PitchType::ALL.iter().position(|&t| t == s.pitch_type));

    SessionStats {
        total,
        strikes,
        strike_percent: strike_percent(total, strikes),
        by_type,
    }
}

/// The pitcher's top pitch types over their last [`BEST_PITCH_SESSIONS`]
/// training sessions, ranked by strike percentage. Ties keep the order the
/// types were first thrown in.
pub fn best_pitches(pitcher: &Pitcher) -> Vec<PitchTypeStat> {
    let sessions = &pitcher.training_sessions;
    let window = &sessions[sessions.len().saturating_sub(BEST_PITCH_SESSIONS)..];

    let mut tallies = tally_in_encounter_order(window.iter().flat_map(|s| s.pitches.iter()));
    tallies.sort_by(|a, b| b.strike_percent.cmp(&a.strike_percent));
    tallies.truncate(BEST_PITCH_COUNT);
    tallies
}

/// The most recent `limit` sessions, newest first, each with its stats.
pub fn recent_sessions(pitcher: &Pitcher, limit: usize) -> Vec<(&TrainingSession, SessionStats)> {
    pitcher
        .training_sessions
        .iter()
        .rev()
        .take(limit)
        .map(|s| (s, session_stats(&s.pitches)))
        .collect()
}
