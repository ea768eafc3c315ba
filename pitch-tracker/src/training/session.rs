// Practice session: pitch-type log with coach-called strikes and balls,
// a one-time advisory and a hard ceiling.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::TrainingLimits;
use crate::decision::{Decider, Question};
use crate::error::{Result, TrackerError};
use crate::model::{PitchType, Pitcher, PitcherId, TrainingOutcome, TrainingPitch, TrainingSession};
use crate::stats::{session_stats, SessionStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPhase {
    /// Accepting pitches.
    Recording,
    /// Ended; waiting for notes and save.
    Summary,
}

/// Notices raised while recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// The advisory pitch count was reached. Shown once per session.
    ApproachingLimit { thrown: usize },
    /// The ceiling was reached and the session ended itself.
    LimitReached { thrown: usize },
}

/// How far along the session is relative to its limits and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressZone {
    UnderMinimum,
    Building,
    OnTarget,
    OverAdvisory,
}

/// Snapshot of an in-progress practice session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingState {
    pub pitcher_id: PitcherId,
    pub pitcher_name: String,
    pub started_at: DateTime<Utc>,
    /// Clamped into the session limits at start.
    pub target: usize,
    pub limits: TrainingLimits,
    pub phase: TrainingPhase,
    pub pitches: Vec<TrainingPitch>,
    /// Set once the advisory has fired; never cleared within the session.
    pub warning_shown: bool,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingStep {
    pub state: TrainingState,
    pub advisories: Vec<Advisory>,
    /// The pitch hit the ceiling and moved the session to its summary.
    pub finalized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    Summary(TrainingState),
    /// Below minimum and the discard was confirmed. Nothing is kept.
    Discarded,
}

/// The pitcher with the session appended, and the session itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedSession {
    pub pitcher: Pitcher,
    pub session: TrainingSession,
}

impl TrainingState {
    /// Start a session for `pitcher`. Any pitcher can train regardless of
    /// their game availability.
    pub fn start(
        pitcher: &Pitcher,
        requested_target: usize,
        limits: TrainingLimits,
        now: DateTime<Utc>,
    ) -> Self {
        let target = limits.clamp_target(requested_target);
        if target != requested_target {
            debug!("Training target {} clamped to {}", requested_target, target);
        }
        info!("Training started: pitcher {}, target {}", pitcher.id, target);
        TrainingState {
            pitcher_id: pitcher.id,
            pitcher_name: pitcher.full_name.clone(),
            started_at: now,
            target,
            limits,
            phase: TrainingPhase::Recording,
            pitches: Vec::new(),
            warning_shown: false,
            notes: String::new(),
        }
    }

    pub fn thrown(&self) -> usize {
        self.pitches.len()
    }

    /// Log a pitch of `pitch_type`; `decider` calls it a strike or a ball.
    pub fn record_pitch(
        &self,
        pitch_type: PitchType,
        decider: &mut dyn Decider,
        now: DateTime<Utc>,
    ) -> Result<TrainingStep> {
        if self.phase != TrainingPhase::Recording {
            return Err(TrackerError::SessionNotRecording);
        }

        let strike = decider.ask(&Question::TrainingStrike { pitch_type });
        let mut next = self.clone();
        next.pitches.push(TrainingPitch {
            pitch_type,
            outcome: TrainingOutcome::from_strike(strike),
            timestamp: now,
        });
        let thrown = next.thrown();
        debug!("Training pitch {}: {} {:?}", thrown, pitch_type, strike);

        let mut advisories = Vec::new();
        if thrown == self.limits.advisory_at && !next.warning_shown {
            next.warning_shown = true;
            advisories.push(Advisory::ApproachingLimit { thrown });
        }

        let mut finalized = false;
        if thrown >= self.limits.max_pitches {
            next.phase = TrainingPhase::Summary;
            finalized = true;
            advisories.push(Advisory::LimitReached { thrown });
            info!("Training session reached {} pitches and ended", thrown);
        }

        Ok(TrainingStep { state: next, advisories, finalized })
    }

    /// Drop the last logged pitch.
    pub fn undo_last_pitch(&self) -> Result<TrainingState> {
        if self.phase != TrainingPhase::Recording {
            return Err(TrackerError::SessionNotRecording);
        }
        let mut next = self.clone();
        next.pitches.pop();
        Ok(next)
    }

    /// Stop recording.
    ///
    /// Under the minimum the session can only be thrown away: `decider` is
    /// asked to confirm the discard, and declining leaves the session as it
    /// was and returns [`TrackerError::BelowMinimumPitches`].
    pub fn end_session(&self, decider: &mut dyn Decider) -> Result<SessionEnd> {
        if self.phase == TrainingPhase::Summary {
            return Ok(SessionEnd::Summary(self.clone()));
        }

        let thrown = self.thrown();
        let minimum = self.limits.min_pitches;
        if thrown < minimum {
            if decider.ask(&Question::DiscardSession { thrown, minimum }) {
                info!("Training session discarded at {} pitches", thrown);
                return Ok(SessionEnd::Discarded);
            }
            warn!("Training end declined: {} of {} minimum pitches", thrown, minimum);
            return Err(TrackerError::BelowMinimumPitches { thrown, minimum });
        }

        let mut next = self.clone();
        next.phase = TrainingPhase::Summary;
        info!("Training session ended with {} pitches", thrown);
        Ok(SessionEnd::Summary(next))
    }

    /// Stats for the pitches logged so far. `ranked()` on the result gives
    /// the summary ordering.
    pub fn stats(&self) -> SessionStats {
        session_stats(&self.pitches)
    }

    /// Set coach notes, silently cut to the configured character limit.
    pub fn set_notes(&self, notes: &str) -> TrainingState {
        let mut next = self.clone();
        next.notes = notes.chars().take(self.limits.notes_max_chars).collect();
        next
    }

    pub fn progress_zone(&self) -> ProgressZone {
        let thrown = self.thrown();
        if thrown < self.limits.min_pitches {
            ProgressZone::UnderMinimum
        } else if thrown < self.target {
            ProgressZone::Building
        } else if thrown < self.limits.advisory_at {
            ProgressZone::OnTarget
        } else {
            ProgressZone::OverAdvisory
        }
    }

    /// Append the finished session to `pitcher`'s history. Game availability
    /// is not touched.
    pub fn save_summary(&self, pitcher: &Pitcher, now: DateTime<Utc>) -> Result<SavedSession> {
        if self.phase != TrainingPhase::Summary {
            return Err(TrackerError::SummaryNotReady);
        }
        if pitcher.id != self.pitcher_id {
            return Err(TrackerError::UnknownPitcher(self.pitcher_id));
        }

        let session = TrainingSession {
            date: now,
            target: u32::try_from(self.target).unwrap_or(u32::MAX),
            pitches: self.pitches.clone(),
            notes: self.notes.clone(),
        };
        let mut updated = pitcher.clone();
        updated.training_sessions.push(session.clone());
        info!(
            "Training session saved: pitcher {}, {} pitches",
            pitcher.id,
            session.pitches.len()
        );
        Ok(SavedSession { pitcher: updated, session })
    }
}
