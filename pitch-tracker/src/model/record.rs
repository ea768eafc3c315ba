// Finalized history records: one GameRecord per completed outing and one
// TrainingSession per saved practice. Both are created once and never
// mutated afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pitch::{PitchType, StrikeTally};
use super::team::TeamId;

// ---------------------------------------------------------------------------
// Innings pitched
// ---------------------------------------------------------------------------

/// Innings pitched, stored as the number of outs recorded.
///
/// Displayed and persisted in baseball's fractional notation, where the
/// digit after the point is outs into the next inning: 7 outs is `2.1`,
/// 8 outs is `2.2`. It is not a decimal fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct InningsPitched(u32);

impl InningsPitched {
    pub fn from_outs(outs: u32) -> Self {
        InningsPitched(outs)
    }

    pub fn outs(self) -> u32 {
        self.0
    }

    /// `floor(outs / 3) + (outs % 3) / 10`, e.g. 7 outs -> 2.1.
    pub fn as_decimal(self) -> f64 {
        (self.0 / 3) as f64 + (self.0 % 3) as f64 / 10.0
    }

    /// Recover the outs count from fractional notation:
    /// `floor(ip) * 3 + round((ip % 1) * 10)`.
    ///
    /// Returns `None` for negative or non-finite values and for a fractional
    /// digit above 2, which cannot occur in innings notation.
    pub fn from_decimal(ip: f64) -> Option<Self> {
        if !ip.is_finite() || ip < 0.0 {
            return None;
        }
        let whole = ip.floor();
        let partial = ((ip - whole) * 10.0).round();
        if partial > 2.0 {
            return None;
        }
        Some(InningsPitched(whole as u32 * 3 + partial as u32))
    }
}

impl From<InningsPitched> for f64 {
    fn from(ip: InningsPitched) -> f64 {
        ip.as_decimal()
    }
}

impl TryFrom<f64> for InningsPitched {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        InningsPitched::from_decimal(value)
            .ok_or_else(|| format!("invalid innings pitched value {value}"))
    }
}

impl fmt::Display for InningsPitched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 3, self.0 % 3)
    }
}

// ---------------------------------------------------------------------------
// GameRecord
// ---------------------------------------------------------------------------

/// Snapshot of one completed outing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: DateTime<Utc>,
    pub team_id: TeamId,
    pub total_pitches: u32,
    pub innings: InningsPitched,
    pub strike_percent: u32,
    pub strikes: u32,
    pub batters_faced: u32,
    pub lhb_pitches: u32,
    pub lhb_strikes: u32,
    pub rhb_pitches: u32,
    pub rhb_strikes: u32,
    pub balls_in_play: u32,
    pub first_pitch_strikes: u32,
    pub three_ball_counts: u32,
}

// ---------------------------------------------------------------------------
// Training records
// ---------------------------------------------------------------------------

/// Coach's call on a training pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingOutcome {
    Strike,
    Ball,
}

impl TrainingOutcome {
    pub fn from_strike(is_strike: bool) -> Self {
        if is_strike {
            TrainingOutcome::Strike
        } else {
            TrainingOutcome::Ball
        }
    }
}

/// One pitch thrown during a practice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPitch {
    #[serde(rename = "type")]
    pub pitch_type: PitchType,
    pub outcome: TrainingOutcome,
    pub timestamp: DateTime<Utc>,
}

impl StrikeTally for TrainingPitch {
    fn is_strike(&self) -> bool {
        self.outcome == TrainingOutcome::Strike
    }
}

/// A saved practice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    pub date: DateTime<Utc>,
    /// Target pitch count chosen at session start.
    pub target: u32,
    pub pitches: Vec<TrainingPitch>,
    #[serde(default)]
    pub notes: String,
}
