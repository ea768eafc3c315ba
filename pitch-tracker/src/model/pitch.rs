// Pitch-level vocabulary: outcomes, batter handedness, pitch types and the
// events appended to live pitch logs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Strike tally
// ---------------------------------------------------------------------------

/// Anything that can be counted as a strike or not for aggregate stats.
///
/// Implemented by both live-game pitch events and training pitches so the
/// statistics engine can compute percentages and trends over either log.
pub trait StrikeTally {
    fn is_strike(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Game pitch outcomes
// ---------------------------------------------------------------------------

/// The result of a single pitch in a live game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PitchOutcome {
    Ball,
    Strike,
    BallInPlay,
    Out,
}

impl PitchOutcome {
    /// Whether the outcome counts toward the strike tally.
    ///
    /// A ball in play or a recorded out is credited as a strike.
    pub fn is_strike(self) -> bool {
        !matches!(self, PitchOutcome::Ball)
    }

    /// Parse a short outcome label (`ball`, `strike`, `bip`, `out`).
    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ball" | "b" => Some(PitchOutcome::Ball),
            "strike" | "k" | "s" => Some(PitchOutcome::Strike),
            "bip" | "ballinplay" | "inplay" => Some(PitchOutcome::BallInPlay),
            "out" | "o" => Some(PitchOutcome::Out),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PitchOutcome::Ball => "ball",
            PitchOutcome::Strike => "strike",
            PitchOutcome::BallInPlay => "ballInPlay",
            PitchOutcome::Out => "out",
        }
    }
}

/// Which side of the plate the batter stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Handedness {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "L" | "LHB" | "LEFT" => Some(Handedness::Left),
            "R" | "RHB" | "RIGHT" => Some(Handedness::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handedness::Left => f.write_str("L"),
            Handedness::Right => f.write_str("R"),
        }
    }
}

/// One pitch appended to an outing's log. Never modified after it is
/// appended; undo drops the last entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchEvent {
    pub outcome: PitchOutcome,
    pub batter_hand: Handedness,
    pub timestamp: DateTime<Utc>,
}

impl StrikeTally for PitchEvent {
    fn is_strike(&self) -> bool {
        self.outcome.is_strike()
    }
}

// ---------------------------------------------------------------------------
// Pitch types
// ---------------------------------------------------------------------------

/// The recognized pitch types a pitcher can carry in their arsenal and throw
/// in training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchType {
    #[serde(rename = "4-Seam")]
    FourSeam,
    #[serde(rename = "2-Seam")]
    TwoSeam,
    Curve,
    Slider,
    Change,
    Splitter,
    Cutter,
    Knuckle,
}

impl PitchType {
    /// All recognized pitch types in display order.
    pub const ALL: [PitchType; 8] = [
        PitchType::FourSeam,
        PitchType::TwoSeam,
        PitchType::Curve,
        PitchType::Slider,
        PitchType::Change,
        PitchType::Splitter,
        PitchType::Cutter,
        PitchType::Knuckle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PitchType::FourSeam => "4-Seam",
            PitchType::TwoSeam => "2-Seam",
            PitchType::Curve => "Curve",
            PitchType::Slider => "Slider",
            PitchType::Change => "Change",
            PitchType::Splitter => "Splitter",
            PitchType::Cutter => "Cutter",
            PitchType::Knuckle => "Knuckle",
        }
    }

    /// Parse a pitch type label, case-insensitively. Accepts the display
    /// labels plus a few common shorthands ("4s", "cb", "ch").
    pub fn from_label(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "4-seam" | "4seam" | "4s" | "fourseam" => Some(PitchType::FourSeam),
            "2-seam" | "2seam" | "2s" | "twoseam" => Some(PitchType::TwoSeam),
            "curve" | "cb" | "curveball" => Some(PitchType::Curve),
            "slider" | "sl" => Some(PitchType::Slider),
            "change" | "ch" | "changeup" => Some(PitchType::Change),
            "splitter" | "split" => Some(PitchType::Splitter),
            "cutter" | "ct" => Some(PitchType::Cutter),
            "knuckle" | "kn" | "knuckleball" => Some(PitchType::Knuckle),
            _ => None,
        }
    }
}

impl fmt::Display for PitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
