// Pitchers, their arsenal and their accumulated history.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::pitch::PitchType;
use super::record::{GameRecord, TrainingSession};

/// Pitcher identifier, unique across the whole process (pitchers outlive
/// team membership).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PitcherId(pub u64);

impl fmt::Display for PitcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitcher {
    pub id: PitcherId,
    pub full_name: String,
    pub birthday: NaiveDate,
    /// Pitch types this pitcher throws, in the order they were selected.
    pub arsenal: Vec<PitchType>,
    /// Completed outings, oldest first.
    pub games: Vec<GameRecord>,
    /// Saved training sessions, oldest first.
    pub training_sessions: Vec<TrainingSession>,
    /// Remaining pitch budget for the day. Only completed outings draw it
    /// down, and it may go negative.
    pub available_today: i32,
}

impl Pitcher {
    /// Age in whole years on `today`. One less than the year difference when
    /// the birthday has not come around yet this year.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let mut age = today.year() - self.birthday.year();
        if (today.month(), today.day()) < (self.birthday.month(), self.birthday.day()) {
            age -= 1;
        }
        age.max(0) as u32
    }

    /// Whether the pitcher has budget left to start an outing today.
    pub fn is_available(&self) -> bool {
        self.available_today > 0
    }

    /// The most recent completed outing, if any.
    pub fn last_game(&self) -> Option<&GameRecord> {
        self.games.last()
    }
}
