// Domain errors surfaced synchronously to the caller.
//
// Storage failures are not part of this enum: they are caught at the
// persistence boundary (see `persistence::StoreError`) and never reach
// roster, game or training logic.

use thiserror::Error;

use crate::model::{PitcherId, TeamId};

/// Coarse classification used by callers to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CapacityExceeded,
    InvalidPrecondition,
    NotFound,
    InvalidInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("maximum {limit} {entity} reached")]
    CapacityExceeded { entity: &'static str, limit: usize },

    #[error("select batter handedness before recording a pitch")]
    HandednessRequired,

    #[error("no pitcher is currently on the mound")]
    NoActiveOuting,

    #[error("an outing is already in progress; end it before changing pitchers")]
    OutingInProgress,

    #[error("pitcher {0} has no pitches available today")]
    PitcherUnavailable(PitcherId),

    #[error("pitcher {pitcher} is not on team {team}")]
    PitcherNotOnTeam { team: TeamId, pitcher: PitcherId },

    #[error("a game is already in progress")]
    GameInProgress,

    #[error("no game is in progress")]
    NoActiveGame,

    #[error("a training session is already in progress")]
    TrainingInProgress,

    #[error("no training session is in progress")]
    NoActiveTraining,

    #[error("invalid session: minimum {minimum} pitches required, {thrown} thrown")]
    BelowMinimumPitches { thrown: usize, minimum: usize },

    #[error("training session is not accepting pitches")]
    SessionNotRecording,

    #[error("training summary is not ready; end the session first")]
    SummaryNotReady,

    #[error("unknown team {0}")]
    UnknownTeam(TeamId),

    #[error("unknown pitcher {0}")]
    UnknownPitcher(PitcherId),

    #[error("invalid value for `{field}`: {message}")]
    InvalidInput { field: &'static str, message: String },
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            TrackerError::UnknownTeam(_) | TrackerError::UnknownPitcher(_) => ErrorKind::NotFound,
            TrackerError::InvalidInput { .. } => ErrorKind::InvalidInput,
            TrackerError::HandednessRequired
            | TrackerError::NoActiveOuting
            | TrackerError::OutingInProgress
            | TrackerError::PitcherUnavailable(_)
            | TrackerError::PitcherNotOnTeam { .. }
            | TrackerError::GameInProgress
            | TrackerError::NoActiveGame
            | TrackerError::TrainingInProgress
            | TrackerError::NoActiveTraining
            | TrackerError::BelowMinimumPitches { .. }
            | TrackerError::SessionNotRecording
            | TrackerError::SummaryNotReady => ErrorKind::InvalidPrecondition,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
