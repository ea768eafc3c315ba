// Application state and orchestration.
//
// `Tracker` owns the roster and the at-most-one live game and training
// session. Every committed mutation updates memory first and then queues a
// full-collection write on the persistence handle without waiting for it.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::decision::Decider;
use crate::error::{Result, TrackerError};
use crate::game::{summarize, AtBatResolution, Game, GameSummary};
use crate::model::{
    GameRecord, Handedness, Organization, PitchOutcome, PitchType, Pitcher, PitcherId, Team,
    TeamId, TrainingSession,
};
use crate::persistence::{self, PersistHandle, PersistenceGateway};
use crate::roster::Roster;
use crate::stats::{
    best_pitches, recent_sessions, season_stats, workload_summary, PitchTypeStat, SeasonStats,
    SessionStats, Workload, HISTORY_SESSIONS,
};
use crate::training::{Advisory, SessionEnd, TrainingState};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// What happened on a recorded game pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchReport {
    pub resolution: AtBatResolution,
    pub inning_advanced: bool,
}

/// What happened on a recorded training pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingReport {
    pub advisories: Vec<Advisory>,
    pub finalized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingEnd {
    /// Session is in its summary phase; stats ranked best first.
    Summary(SessionStats),
    Discarded,
}

/// Everything the pitcher detail view shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PitcherReport {
    pub pitcher_id: PitcherId,
    pub full_name: String,
    pub age: u32,
    pub available_today: i32,
    pub season: SeasonStats,
    pub workload: Workload,
    pub best_pitches: Vec<PitchTypeStat>,
    pub last_outing: Option<GameRecord>,
    /// Newest first.
    pub training_history: Vec<(TrainingSession, SessionStats)>,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

pub struct Tracker {
    config: Config,
    roster: Roster,
    game: Option<Game>,
    training: Option<TrainingState>,
    persist: PersistHandle,
}

impl Tracker {
    pub fn new(config: Config, roster: Roster, persist: PersistHandle) -> Self {
        Tracker {
            config,
            roster,
            game: None,
            training: None,
            persist,
        }
    }

    /// A tracker with an empty roster and no storage behind it.
    pub fn in_memory(config: Config) -> Self {
        let roster = Roster::new(config.roster);
        Self::new(config, roster, PersistHandle::detached())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn training(&self) -> Option<&TrainingState> {
        self.training.as_ref()
    }

    fn persist_teams(&self) {
        self.persist.save(self.roster.teams());
    }

    fn persist_pitchers(&self) {
        self.persist.save(self.roster.pitchers());
    }

    fn pitcher(&self, id: PitcherId) -> Result<&Pitcher> {
        self.roster.pitcher(id).ok_or(TrackerError::UnknownPitcher(id))
    }

    fn team(&self, id: TeamId) -> Result<&Team> {
        self.roster.team(id).ok_or(TrackerError::UnknownTeam(id))
    }

    // -- Roster --------------------------------------------------------------

    pub fn add_team(
        &mut self,
        name: &str,
        organization: Organization,
        age_group: &str,
    ) -> Result<TeamId> {
        let id = self.roster.add_team(name, organization, age_group)?;
        self.persist_teams();
        Ok(id)
    }

    /// Delete a team after confirmation. The team playing the current game
    /// cannot be deleted.
    pub fn remove_team(&mut self, team_id: TeamId, decider: &mut dyn Decider) -> Result<bool> {
        if self.game.as_ref().is_some_and(|g| g.team_id == team_id) {
            return Err(TrackerError::GameInProgress);
        }
        let removed = self.roster.remove_team(team_id, decider)?;
        if removed {
            self.persist_teams();
        }
        Ok(removed)
    }

    pub fn add_pitcher(
        &mut self,
        team_id: TeamId,
        full_name: &str,
        birthday: NaiveDate,
        arsenal: &[PitchType],
    ) -> Result<PitcherId> {
        let id = self.roster.add_pitcher(team_id, full_name, birthday, arsenal)?;
        self.persist_pitchers();
        self.persist_teams();
        Ok(id)
    }

    pub fn remove_pitcher(
        &mut self,
        team_id: TeamId,
        pitcher_id: PitcherId,
        decider: &mut dyn Decider,
    ) -> Result<bool> {
        let removed = self.roster.remove_pitcher(team_id, pitcher_id, decider)?;
        if removed {
            self.persist_teams();
        }
        Ok(removed)
    }

    // -- Game ----------------------------------------------------------------

    fn current_game(&self) -> Result<&Game> {
        self.game.as_ref().ok_or(TrackerError::NoActiveGame)
    }

    pub fn start_game(&mut self, team_id: TeamId, now: DateTime<Utc>) -> Result<()> {
        if self.game.is_some() {
            return Err(TrackerError::GameInProgress);
        }
        self.team(team_id)?;
        self.game = Some(Game::new(team_id, now));
        info!("Game started for team {}", team_id);
        Ok(())
    }

    /// Pitchers on the game's team who can take the mound.
    pub fn selectable_pitchers(&self) -> Result<Vec<&Pitcher>> {
        let game = self.current_game()?;
        self.roster.available_pitchers(game.team_id)
    }

    pub fn select_pitcher(&mut self, pitcher_id: PitcherId) -> Result<()> {
        let game = self.current_game()?;
        let team = self.team(game.team_id)?;
        let pitcher = self.pitcher(pitcher_id)?;
        let next = game.start_outing(team, pitcher)?;
        self.game = Some(next);
        Ok(())
    }

    pub fn set_batter_hand(&mut self, hand: Handedness) -> Result<()> {
        let next = self.current_game()?.set_batter_hand(hand)?;
        self.game = Some(next);
        Ok(())
    }

    pub fn record_pitch(
        &mut self,
        outcome: PitchOutcome,
        now: DateTime<Utc>,
        decider: &mut dyn Decider,
    ) -> Result<PitchReport> {
        let applied = match self.current_game()?.record_pitch(outcome, now, decider) {
            Ok(applied) => applied,
            Err(e) => {
                warn!("Pitch rejected: {}", e);
                return Err(e);
            }
        };
        let report = PitchReport {
            resolution: applied.resolution,
            inning_advanced: applied.inning_advanced,
        };
        self.game = Some(applied.game);
        Ok(report)
    }

    pub fn undo_pitch(&mut self) -> Result<()> {
        let next = self.current_game()?.undo_last_pitch()?;
        self.game = Some(next);
        Ok(())
    }

    pub fn end_inning(&mut self) -> Result<u32> {
        let next = self.current_game()?.end_inning();
        let inning = next.inning;
        self.game = Some(next);
        Ok(inning)
    }

    /// Close the current outing, charge the pitcher's budget and record the
    /// outing in their history.
    pub fn end_outing(&mut self, now: DateTime<Utc>) -> Result<GameRecord> {
        let game = self.current_game()?;
        let pitcher_id = game
            .current
            .as_ref()
            .map(|o| o.pitcher_id)
            .ok_or(TrackerError::NoActiveOuting)?;
        let ended = game.end_outing(self.pitcher(pitcher_id)?, now)?;

        self.roster.replace_pitcher(ended.pitcher)?;
        self.game = Some(ended.game);
        self.persist_pitchers();
        Ok(ended.record)
    }

    /// Finish the game and return its summary. The pitcher on the mound, if
    /// any, must be taken out first.
    pub fn end_game(&mut self) -> Result<GameSummary> {
        let game = self.current_game()?;
        if game.current.is_some() {
            return Err(TrackerError::OutingInProgress);
        }
        let team_pitchers = self.roster.team_pitchers(game.team_id)?;
        let summary = summarize(game, &team_pitchers);
        info!(
            "Game ended for team {}: {} pitches over {} outings",
            game.team_id,
            summary.total_pitches,
            summary.lines.len()
        );
        self.game = None;
        Ok(summary)
    }

    // -- Training ------------------------------------------------------------

    fn current_training(&self) -> Result<&TrainingState> {
        self.training.as_ref().ok_or(TrackerError::NoActiveTraining)
    }

    /// Start a practice session. `target` defaults to the configured one.
    pub fn start_training(
        &mut self,
        pitcher_id: PitcherId,
        target: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        if self.training.is_some() {
            return Err(TrackerError::TrainingInProgress);
        }
        let limits = self.config.training;
        let pitcher = self.pitcher(pitcher_id)?;
        let state = TrainingState::start(
            pitcher,
            target.unwrap_or(limits.default_target),
            limits,
            now,
        );
        let target = state.target;
        self.training = Some(state);
        Ok(target)
    }

    pub fn record_training_pitch(
        &mut self,
        pitch_type: PitchType,
        decider: &mut dyn Decider,
        now: DateTime<Utc>,
    ) -> Result<TrainingReport> {
        let step = self.current_training()?.record_pitch(pitch_type, decider, now)?;
        self.training = Some(step.state);
        Ok(TrainingReport {
            advisories: step.advisories,
            finalized: step.finalized,
        })
    }

    pub fn undo_training_pitch(&mut self) -> Result<()> {
        let next = self.current_training()?.undo_last_pitch()?;
        self.training = Some(next);
        Ok(())
    }

    /// End recording. A discarded session is dropped entirely; declining the
    /// discard leaves it running and returns the error.
    pub fn end_training(&mut self, decider: &mut dyn Decider) -> Result<TrainingEnd> {
        match self.current_training()?.end_session(decider)? {
            SessionEnd::Summary(state) => {
                let stats = state.stats();
                self.training = Some(state);
                Ok(TrainingEnd::Summary(stats))
            }
            SessionEnd::Discarded => {
                self.training = None;
                Ok(TrainingEnd::Discarded)
            }
        }
    }

    pub fn set_training_notes(&mut self, notes: &str) -> Result<()> {
        let next = self.current_training()?.set_notes(notes);
        self.training = Some(next);
        Ok(())
    }

    /// Save the ended session to the pitcher's history and close it.
    pub fn save_training(&mut self, now: DateTime<Utc>) -> Result<TrainingSession> {
        let state = self.current_training()?;
        let saved = state.save_summary(self.pitcher(state.pitcher_id)?, now)?;

        self.roster.replace_pitcher(saved.pitcher)?;
        self.training = None;
        self.persist_pitchers();
        Ok(saved.session)
    }

    // -- Reads ---------------------------------------------------------------

    pub fn pitcher_report(&self, pitcher_id: PitcherId, today: NaiveDate) -> Result<PitcherReport> {
        let pitcher = self.pitcher(pitcher_id)?;
        Ok(PitcherReport {
            pitcher_id,
            full_name: pitcher.full_name.clone(),
            age: pitcher.age_on(today),
            available_today: pitcher.available_today,
            season: season_stats(pitcher),
            workload: workload_summary(pitcher),
            best_pitches: best_pitches(pitcher),
            last_outing: pitcher.last_game().cloned(),
            training_history: recent_sessions(pitcher, HISTORY_SESSIONS)
                .into_iter()
                .map(|(session, stats)| (session.clone(), stats))
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Startup recovery
// ---------------------------------------------------------------------------

/// Build the roster from whatever the gateway holds. Malformed records are
/// skipped; an unavailable store yields an empty roster.
pub fn recover_from_store(config: &Config, gateway: &dyn PersistenceGateway) -> Roster {
    let teams: Vec<Team> = persistence::load(gateway);
    let pitchers: Vec<Pitcher> = persistence::load(gateway);

    for team in &teams {
        let missing = team
            .pitcher_ids
            .iter()
            .filter(|id| !pitchers.iter().any(|p| p.id == **id))
            .count();
        if missing > 0 {
            warn!("Team {} references {} unknown pitchers", team.id, missing);
        }
    }

    info!("Recovered {} teams and {} pitchers", teams.len(), pitchers.len());
    Roster::from_parts(teams, pitchers, config.roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{AlwaysNo, AlwaysYes};
    use crate::persistence::{Collection, MemoryGateway};

    fn tracker_with_pitcher() -> (Tracker, TeamId, PitcherId) {
        let mut t = Tracker::in_memory(Config::default());
        let team = t.add_team("Hawks", Organization::LittleLeague, "12U").unwrap();
        let p = t
            .add_pitcher(
                team,
                "Alex Moreno",
                NaiveDate::from_ymd_opt(2012, 5, 20).unwrap(),
                &[PitchType::FourSeam, PitchType::Curve],
            )
            .unwrap();
        (t, team, p)
    }

    #[test]
    fn game_flow_updates_pitcher() {
        let (mut t, team, p) = tracker_with_pitcher();
        t.start_game(team, Utc::now()).unwrap();
        assert_eq!(t.selectable_pitchers().unwrap().len(), 1);
        t.select_pitcher(p).unwrap();
        t.set_batter_hand(Handedness::Left).unwrap();
        t.record_pitch(PitchOutcome::Strike, Utc::now(), &mut AlwaysNo).unwrap();
        t.record_pitch(PitchOutcome::BallInPlay, Utc::now(), &mut AlwaysNo).unwrap();

        let record = t.end_outing(Utc::now()).unwrap();
        assert_eq!(record.total_pitches, 2);
        assert_eq!(t.roster().pitcher(p).unwrap().available_today, 83);

        let summary = t.end_game().unwrap();
        assert_eq!(summary.total_pitches, 2);
        assert!(t.game().is_none());
    }

    #[test]
    fn end_game_requires_pitcher_off_mound() {
        let (mut t, team, p) = tracker_with_pitcher();
        t.start_game(team, Utc::now()).unwrap();
        t.select_pitcher(p).unwrap();
        assert_eq!(t.end_game().unwrap_err(), TrackerError::OutingInProgress);
        assert!(t.game().is_some());
    }

    #[test]
    fn one_game_at_a_time() {
        let (mut t, team, _) = tracker_with_pitcher();
        t.start_game(team, Utc::now()).unwrap();
        assert_eq!(t.start_game(team, Utc::now()).unwrap_err(), TrackerError::GameInProgress);
        assert_eq!(
            t.remove_team(team, &mut AlwaysYes).unwrap_err(),
            TrackerError::GameInProgress
        );
    }

    #[test]
    fn pitch_without_game() {
        let (mut t, _, _) = tracker_with_pitcher();
        assert_eq!(
            t.record_pitch(PitchOutcome::Ball, Utc::now(), &mut AlwaysNo).unwrap_err(),
            TrackerError::NoActiveGame
        );
    }

    #[test]
    fn training_flow_does_not_touch_budget() {
        let (mut t, _, p) = tracker_with_pitcher();
        assert_eq!(t.start_training(p, Some(100), Utc::now()).unwrap(), 60);
        for _ in 0..20 {
            t.record_training_pitch(PitchType::Curve, &mut AlwaysYes, Utc::now()).unwrap();
        }
        let TrainingEnd::Summary(stats) = t.end_training(&mut AlwaysNo).unwrap() else {
            panic!("expected summary");
        };
        assert_eq!(stats.total, 20);
        t.set_training_notes("sharp curve").unwrap();
        let session = t.save_training(Utc::now()).unwrap();
        assert_eq!(session.notes, "sharp curve");
        assert!(t.training().is_none());

        let pitcher = t.roster().pitcher(p).unwrap();
        assert_eq!(pitcher.training_sessions.len(), 1);
        assert_eq!(pitcher.available_today, 85);
    }

    #[test]
    fn pitcher_report_collects_views() {
        let (mut t, _, p) = tracker_with_pitcher();
        t.start_training(p, None, Utc::now()).unwrap();
        for i in 0..15 {
            let mut call = |_: &crate::decision::Question| i % 3 != 0;
            t.record_training_pitch(PitchType::FourSeam, &mut call, Utc::now()).unwrap();
        }
        t.end_training(&mut AlwaysNo).unwrap();
        t.save_training(Utc::now()).unwrap();

        let report = t
            .pitcher_report(p, NaiveDate::from_ymd_opt(2024, 5, 19).unwrap())
            .unwrap();
        assert_eq!(report.age, 11);
        assert_eq!(report.best_pitches.len(), 1);
        assert_eq!(report.best_pitches[0].strike_percent, 67);
        assert_eq!(report.training_history.len(), 1);
        assert!(report.last_outing.is_none());
        assert_eq!(report.season, SeasonStats::default());
    }

    #[test]
    fn pitcher_report_keeps_newest_sessions() {
        let (mut t, _, p) = tracker_with_pitcher();
        let start = Utc::now();
        for session in 0..HISTORY_SESSIONS + 1 {
            let at = start + chrono::Duration::minutes(session as i64);
            t.start_training(p, None, at).unwrap();
            for _ in 0..15 {
                t.record_training_pitch(PitchType::Slider, &mut AlwaysYes, at).unwrap();
            }
            t.end_training(&mut AlwaysNo).unwrap();
            t.save_training(at).unwrap();
        }

        let report = t.pitcher_report(p, start.date_naive()).unwrap();
        assert_eq!(report.training_history.len(), HISTORY_SESSIONS);
        let newest = start + chrono::Duration::minutes(HISTORY_SESSIONS as i64);
        assert_eq!(report.training_history[0].0.date, newest);
        assert!(report.training_history.iter().all(|(_, stats)| stats.total == 15));
    }

    #[test]
    fn recovery_rebuilds_roster() {
        let gw = MemoryGateway::new();
        let (t, team, p) = tracker_with_pitcher();
        gw.save_all(
            Collection::Teams,
            &persistence::encode_all(t.roster().teams()).unwrap(),
        )
        .unwrap();
        gw.save_all(
            Collection::Pitchers,
            &persistence::encode_all(t.roster().pitchers()).unwrap(),
        )
        .unwrap();

        let roster = recover_from_store(&Config::default(), &gw);
        assert_eq!(roster.team(team).unwrap().pitcher_ids, vec![p]);
        assert_eq!(roster.pitcher(p).unwrap().full_name, "Alex Moreno");
    }
}
