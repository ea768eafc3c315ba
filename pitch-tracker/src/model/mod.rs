// Domain model: teams, pitchers, pitch events and finalized records.

pub mod pitch;
pub mod pitcher;
pub mod record;
pub mod team;

pub use pitch::{Handedness, PitchEvent, PitchOutcome, PitchType, StrikeTally};
pub use pitcher::{Pitcher, PitcherId};
pub use record::{
    GameRecord, InningsPitched, TrainingOutcome, TrainingPitch, TrainingSession,
};
pub use team::{Organization, Team, TeamId};
