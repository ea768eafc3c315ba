// Live game: inning counter, the pitcher currently on the mound and the
// outings already completed.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::decision::{Decider, Question};
use crate::error::{Result, TrackerError};
use crate::model::{GameRecord, Handedness, PitchOutcome, Pitcher, PitcherId, Team, TeamId};
use crate::stats::{rolling_strike_window, TrendPoint, TREND_WINDOW};

use super::outing::{AtBatResolution, Outing};

/// Where the game currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No pitcher on the mound.
    SelectingPitcher,
    /// Pitcher chosen, next batter's handedness not yet set.
    AwaitingHandedness,
    AwaitingOutcome,
}

/// A finished outing as listed in the game summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedOuting {
    pub pitcher_id: PitcherId,
    pub pitcher_name: String,
    pub record: GameRecord,
}

/// Snapshot of a game in progress.
///
/// Every transition borrows the current snapshot and returns a new one; the
/// caller decides when to swap it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub team_id: TeamId,
    pub started_at: DateTime<Utc>,
    /// 1-based.
    pub inning: u32,
    pub outings: Vec<CompletedOuting>,
    pub current: Option<Outing>,
}

/// Result of recording one pitch.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchApplied {
    pub game: Game,
    pub resolution: AtBatResolution,
    /// The end-of-inning question was asked and answered yes.
    pub inning_advanced: bool,
}

/// Result of ending an outing: the next game snapshot, the pitcher with the
/// outing added to their history and their budget drawn down, and the record
/// itself.
#[derive(Debug, Clone, PartialEq)]
pub struct OutingEnded {
    pub game: Game,
    pub pitcher: Pitcher,
    pub record: GameRecord,
}

/// Running numbers for the pitcher on the mound.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStats {
    pub balls: u32,
    pub strikes: u32,
    pub outs_this_inning: u32,
    pub total_pitches: u32,
    pub strike_percent: u32,
    pub vs_lhb: u32,
    pub vs_rhb: u32,
    pub balls_in_play: u32,
    pub first_pitch_strikes: u32,
    pub at_bats: u32,
    pub first_pitch_strike_percent: u32,
    pub three_ball_counts: u32,
    pub trend: Vec<TrendPoint>,
}

impl Game {
    pub fn new(team_id: TeamId, started_at: DateTime<Utc>) -> Self {
        Game {
            team_id,
            started_at,
            inning: 1,
            outings: Vec::new(),
            current: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        match &self.current {
            None => GamePhase::SelectingPitcher,
            Some(o) if o.batter_hand.is_none() => GamePhase::AwaitingHandedness,
            Some(_) => GamePhase::AwaitingOutcome,
        }
    }

    fn outing(&self) -> Result<&Outing> {
        self.current.as_ref().ok_or(TrackerError::NoActiveOuting)
    }

    /// Put a pitcher on the mound. They must be on this game's team and have
    /// pitches left today.
    pub fn start_outing(&self, team: &Team, pitcher: &Pitcher) -> Result<Game> {
        if self.current.is_some() {
            return Err(TrackerError::OutingInProgress);
        }
        if team.id != self.team_id || !team.has_pitcher(pitcher.id) {
            return Err(TrackerError::PitcherNotOnTeam {
                team: self.team_id,
                pitcher: pitcher.id,
            });
        }
        if !pitcher.is_available() {
            warn!(
                "Pitcher {} cannot start: {} available",
                pitcher.id, pitcher.available_today
            );
            return Err(TrackerError::PitcherUnavailable(pitcher.id));
        }

        let mut next = self.clone();
        next.current = Some(Outing::new(pitcher.id, pitcher.full_name.clone()));
        info!(
            "Outing started: pitcher {} ({} available), inning {}",
            pitcher.id, pitcher.available_today, self.inning
        );
        Ok(next)
    }

    pub fn set_batter_hand(&self, hand: Handedness) -> Result<Game> {
        self.outing()?;
        let mut next = self.clone();
        if let Some(outing) = next.current.as_mut() {
            outing.batter_hand = Some(hand);
        }
        Ok(next)
    }

    /// Record a pitch against the current batter.
    ///
    /// Rejected without any change when no batter handedness is set. When the
    /// pitch records an out that brings the outing's cumulative outs to a
    /// multiple of three, `decider` is asked whether the inning is over.
    pub fn record_pitch(
        &self,
        outcome: PitchOutcome,
        at: DateTime<Utc>,
        decider: &mut dyn Decider,
    ) -> Result<PitchApplied> {
        let hand = self
            .outing()?
            .batter_hand
            .ok_or(TrackerError::HandednessRequired)?;

        let mut next = self.clone();
        let Some(outing) = next.current.as_mut() else {
            return Err(TrackerError::NoActiveOuting);
        };
        let resolution = outing.apply(outcome, hand, at);
        let outs = outing.outs;
        debug!(
            "Pitch {:?} vs {}: {:?}, count {}-{}, outs {}",
            outcome, hand, resolution, outing.balls, outing.strikes, outs
        );

        let mut inning_advanced = false;
        if resolution.is_out() && outs % 3 == 0 {
            let question = Question::EndOfInning { inning: next.inning };
            if decider.ask(&question) {
                next.inning += 1;
                inning_advanced = true;
                info!("Inning advanced to {}", next.inning);
            }
        }

        Ok(PitchApplied { game: next, resolution, inning_advanced })
    }

    /// Remove the most recent pitch from the log. The count, outs and at-bat
    /// counters keep their current values.
    pub fn undo_last_pitch(&self) -> Result<Game> {
        self.outing()?;
        let mut next = self.clone();
        if let Some(removed) = next.current.as_mut().and_then(Outing::undo_last_pitch) {
            debug!("Undid pitch {:?}", removed.outcome);
        }
        Ok(next)
    }

    /// Advance the inning without waiting for a third out.
    pub fn end_inning(&self) -> Game {
        let mut next = self.clone();
        next.inning += 1;
        info!("Inning manually advanced to {}", next.inning);
        next
    }

    /// Close the current outing and return to pitcher selection.
    ///
    /// `pitcher` must be the record of the pitcher on the mound. Their
    /// available budget drops by the outing's pitch count and may go
    /// negative.
    pub fn end_outing(&self, pitcher: &Pitcher, now: DateTime<Utc>) -> Result<OutingEnded> {
        let outing = self.outing()?;
        if outing.pitcher_id != pitcher.id {
            return Err(TrackerError::UnknownPitcher(outing.pitcher_id));
        }

        let record = outing.to_record(self.team_id, now);
        let mut updated = pitcher.clone();
        updated.available_today = updated
            .available_today
            .saturating_sub(i32::try_from(record.total_pitches).unwrap_or(i32::MAX));
        updated.games.push(record.clone());

        let mut next = self.clone();
        next.current = None;
        next.outings.push(CompletedOuting {
            pitcher_id: pitcher.id,
            pitcher_name: pitcher.full_name.clone(),
            record: record.clone(),
        });

        info!(
            "Outing ended: pitcher {} threw {} ({} IP), {} left today",
            pitcher.id, record.total_pitches, record.innings, updated.available_today
        );
        Ok(OutingEnded { game: next, pitcher: updated, record })
    }

    /// Live numbers for the current outing, or `None` between pitchers.
    pub fn live_stats(&self) -> Option<LiveStats> {
        let outing = self.current.as_ref()?;
        let splits = outing.splits();
        Some(LiveStats {
            balls: outing.balls,
            strikes: outing.strikes,
            outs_this_inning: outing.outs_this_inning(),
            total_pitches: splits.pitches,
            strike_percent: splits.strike_percent(),
            vs_lhb: splits.vs_lhb_percent(),
            vs_rhb: splits.vs_rhb_percent(),
            balls_in_play: outing.balls_in_play,
            first_pitch_strikes: outing.first_pitch_strikes,
            at_bats: outing.at_bats,
            first_pitch_strike_percent: outing.first_pitch_strike_percent(),
            three_ball_counts: outing.three_ball_counts,
            trend: rolling_strike_window(&outing.pitches, TREND_WINDOW),
        })
    }
}
