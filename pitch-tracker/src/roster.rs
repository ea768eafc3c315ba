// Roster manager: teams, pitchers, cardinality limits and id allocation.

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::RosterLimits;
use crate::decision::{Decider, Question};
use crate::error::{Result, TrackerError};
use crate::model::{Organization, PitchType, Pitcher, PitcherId, Team, TeamId};

// ---------------------------------------------------------------------------
// Id allocation
// ---------------------------------------------------------------------------

/// Millisecond-timestamp ids that never repeat within a process, even when
/// two entities are created in the same millisecond.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    /// Start above every id already in use.
    pub fn seeded(existing: impl IntoIterator<Item = u64>) -> Self {
        IdAllocator {
            last: existing.into_iter().max().unwrap_or(0),
        }
    }

    pub fn next_at(&mut self, now_millis: u64) -> u64 {
        self.last = now_millis.max(self.last + 1);
        self.last
    }

    pub fn next(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now)
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Every team and every pitcher known to the tracker.
///
/// Pitchers live in a global set; teams only reference them by id. Removing
/// a team or dropping a pitcher from a team never deletes pitcher records.
/// All mutators validate first, so a rejected call leaves the roster exactly
/// as it was.
#[derive(Debug, Clone)]
pub struct Roster {
    teams: Vec<Team>,
    pitchers: Vec<Pitcher>,
    limits: RosterLimits,
    ids: IdAllocator,
}

impl Roster {
    pub fn new(limits: RosterLimits) -> Self {
        Self::from_parts(Vec::new(), Vec::new(), limits)
    }

    /// Rebuild a roster from recovered records.
    pub fn from_parts(teams: Vec<Team>, pitchers: Vec<Pitcher>, limits: RosterLimits) -> Self {
        let ids = IdAllocator::seeded(
            teams
                .iter()
                .map(|t| t.id.0)
                .chain(pitchers.iter().map(|p| p.id.0)),
        );
        Roster { teams, pitchers, limits, ids }
    }

    pub fn limits(&self) -> &RosterLimits {
        &self.limits
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn pitchers(&self) -> &[Pitcher] {
        &self.pitchers
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn pitcher(&self, id: PitcherId) -> Option<&Pitcher> {
        self.pitchers.iter().find(|p| p.id == id)
    }

    /// The team's pitchers in roster order. Ids with no matching record are
    /// skipped.
    pub fn team_pitchers(&self, team_id: TeamId) -> Result<Vec<&Pitcher>> {
        let team = self.team(team_id).ok_or(TrackerError::UnknownTeam(team_id))?;
        Ok(team
            .pitcher_ids
            .iter()
            .filter_map(|id| self.pitcher(*id))
            .collect())
    }

    /// Team pitchers who may start an outing today.
    pub fn available_pitchers(&self, team_id: TeamId) -> Result<Vec<&Pitcher>> {
        Ok(self
            .team_pitchers(team_id)?
            .into_iter()
            .filter(|p| p.is_available())
            .collect())
    }

    // -- Teams ---------------------------------------------------------------

    pub fn add_team(
        &mut self,
        name: &str,
        organization: Organization,
        age_group: &str,
    ) -> Result<TeamId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::InvalidInput {
                field: "team name",
                message: "must not be empty".into(),
            });
        }
        if self.teams.len() >= self.limits.max_teams {
            warn!("Rejected team '{}': {} teams already", name, self.teams.len());
            return Err(TrackerError::CapacityExceeded {
                entity: "teams",
                limit: self.limits.max_teams,
            });
        }

        let id = TeamId(self.ids.next());
        self.teams.push(Team {
            id,
            name: name.to_string(),
            organization,
            age_group: age_group.trim().to_string(),
            pitcher_ids: Vec::new(),
        });
        info!("Added team {} '{}' ({})", id, name, organization);
        Ok(id)
    }

    /// Delete a team after confirmation. Returns `Ok(false)` when declined.
    pub fn remove_team(&mut self, team_id: TeamId, decider: &mut dyn Decider) -> Result<bool> {
        let team = self.team(team_id).ok_or(TrackerError::UnknownTeam(team_id))?;
        let question = Question::DeleteTeam { team_name: team.name.clone() };
        if !decider.ask(&question) {
            info!("Team {} deletion declined", team_id);
            return Ok(false);
        }

        self.teams.retain(|t| t.id != team_id);
        info!("Removed team {}", team_id);
        Ok(true)
    }

    // -- Pitchers ------------------------------------------------------------

    /// Create a pitcher with a full daily budget and add them to the team.
    /// Duplicate arsenal entries are collapsed, keeping first occurrence.
    pub fn add_pitcher(
        &mut self,
        team_id: TeamId,
        full_name: &str,
        birthday: NaiveDate,
        arsenal: &[PitchType],
    ) -> Result<PitcherId> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(TrackerError::InvalidInput {
                field: "pitcher name",
                message: "must not be empty".into(),
            });
        }
        let max = self.limits.max_pitchers_per_team;
        let team_idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TrackerError::UnknownTeam(team_id))?;
        if self.teams[team_idx].pitcher_ids.len() >= max {
            warn!("Rejected pitcher '{}': team {} is full", full_name, team_id);
            return Err(TrackerError::CapacityExceeded { entity: "pitchers", limit: max });
        }

        let mut unique = Vec::with_capacity(arsenal.len());
        for pitch_type in arsenal {
            if !unique.contains(pitch_type) {
                unique.push(*pitch_type);
            }
        }

        let id = PitcherId(self.ids.next());
        self.pitchers.push(Pitcher {
            id,
            full_name: full_name.to_string(),
            birthday,
            arsenal: unique,
            games: Vec::new(),
            training_sessions: Vec::new(),
            available_today: self.limits.daily_pitch_budget,
        });
        self.teams[team_idx].pitcher_ids.push(id);
        info!("Added pitcher {} '{}' to team {}", id, full_name, team_id);
        Ok(id)
    }

    /// Take a pitcher off a team's list after confirmation. The pitcher record
    /// itself is kept. Returns `Ok(false)` when declined.
    pub fn remove_pitcher(
        &mut self,
        team_id: TeamId,
        pitcher_id: PitcherId,
        decider: &mut dyn Decider,
    ) -> Result<bool> {
        let team = self.team(team_id).ok_or(TrackerError::UnknownTeam(team_id))?;
        if !team.has_pitcher(pitcher_id) {
            return Err(TrackerError::PitcherNotOnTeam { team: team_id, pitcher: pitcher_id });
        }
        let pitcher_name = self
            .pitcher(pitcher_id)
            .map(|p| p.full_name.clone())
            .unwrap_or_else(|| format!("pitcher {pitcher_id}"));

        if !decider.ask(&Question::RemovePitcher { pitcher_name }) {
            info!("Removal of pitcher {} declined", pitcher_id);
            return Ok(false);
        }

        if let Some(team) = self.teams.iter_mut().find(|t| t.id == team_id) {
            team.pitcher_ids.retain(|id| *id != pitcher_id);
        }
        info!("Removed pitcher {} from team {}", pitcher_id, team_id);
        Ok(true)
    }

    /// Swap in an updated pitcher record (e.g. after an outing or a saved
    /// training session).
    pub fn replace_pitcher(&mut self, pitcher: Pitcher) -> Result<()> {
        let slot = self
            .pitchers
            .iter_mut()
            .find(|p| p.id == pitcher.id)
            .ok_or(TrackerError::UnknownPitcher(pitcher.id))?;
        *slot = pitcher;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{AlwaysNo, AlwaysYes, Scripted};

    fn bday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 5, 20).unwrap()
    }

    fn roster_with_team() -> (Roster, TeamId) {
        let mut roster = Roster::new(RosterLimits::default());
        let id = roster.add_team("Hawks", Organization::LittleLeague, "12U").unwrap();
        (roster, id)
    }

    #[test]
    fn id_allocator_is_strictly_increasing() {
        let mut ids = IdAllocator::seeded([500]);
        assert_eq!(ids.next_at(100), 501);
        assert_eq!(ids.next_at(100), 502);
        assert_eq!(ids.next_at(9_000), 9_000);
        assert_eq!(ids.next_at(9_000), 9_001);
    }

    #[test]
    fn sixth_team_rejected_and_roster_unchanged() {
        let mut roster = Roster::new(RosterLimits::default());
        for i in 0..5 {
            roster
                .add_team(&format!("Team {i}"), Organization::Usssa, "10U")
                .unwrap();
        }
        let before: Vec<TeamId> = roster.teams().iter().map(|t| t.id).collect();

        let err = roster.add_team("Extra", Organization::Usssa, "10U").unwrap_err();
        assert_eq!(err, TrackerError::CapacityExceeded { entity: "teams", limit: 5 });

        let after: Vec<TeamId> = roster.teams().iter().map(|t| t.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn empty_team_name_rejected() {
        let mut roster = Roster::new(RosterLimits::default());
        let err = roster.add_team("  ", Organization::Usssa, "10U").unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput { field: "team name", .. }));
        assert!(roster.teams().is_empty());
    }

    #[test]
    fn new_pitcher_gets_full_budget_and_empty_history() {
        let (mut roster, team) = roster_with_team();
        let id = roster
            .add_pitcher(
                team,
                "Alex Moreno",
                bday(),
                &[PitchType::FourSeam, PitchType::Curve, PitchType::FourSeam],
            )
            .unwrap();

        let p = roster.pitcher(id).unwrap();
        assert_eq!(p.available_today, 85);
        assert!(p.games.is_empty());
        assert!(p.training_sessions.is_empty());
        assert_eq!(p.arsenal, vec![PitchType::FourSeam, PitchType::Curve]);
        assert_eq!(roster.team(team).unwrap().pitcher_ids, vec![id]);
    }

    #[test]
    fn sixteenth_pitcher_rejected_and_state_unchanged() {
        let (mut roster, team) = roster_with_team();
        for i in 0..15 {
            roster.add_pitcher(team, &format!("P{i}"), bday(), &[]).unwrap();
        }
        let err = roster.add_pitcher(team, "One Too Many", bday(), &[]).unwrap_err();
        assert_eq!(err, TrackerError::CapacityExceeded { entity: "pitchers", limit: 15 });
        assert_eq!(roster.team(team).unwrap().pitcher_ids.len(), 15);
        assert_eq!(roster.pitchers().len(), 15);
    }

    #[test]
    fn add_pitcher_to_unknown_team() {
        let mut roster = Roster::new(RosterLimits::default());
        let err = roster.add_pitcher(TeamId(42), "Nobody", bday(), &[]).unwrap_err();
        assert_eq!(err, TrackerError::UnknownTeam(TeamId(42)));
        assert!(roster.pitchers().is_empty());
    }

    #[test]
    fn remove_team_respects_decision_and_keeps_pitchers() {
        let (mut roster, team) = roster_with_team();
        let pid = roster.add_pitcher(team, "Casey Lin", bday(), &[]).unwrap();

        assert!(!roster.remove_team(team, &mut AlwaysNo).unwrap());
        assert!(roster.team(team).is_some());

        let mut decider = Scripted::new([true]);
        assert!(roster.remove_team(team, &mut decider).unwrap());
        assert!(roster.team(team).is_none());
        assert!(roster.pitcher(pid).is_some(), "no cascade to pitchers");
        assert_eq!(
            decider.asked,
            vec![Question::DeleteTeam { team_name: "Hawks".into() }]
        );
    }

    #[test]
    fn remove_pitcher_only_touches_team_list() {
        let (mut roster, team) = roster_with_team();
        let keep = roster.add_pitcher(team, "Keep Me", bday(), &[]).unwrap();
        let drop = roster.add_pitcher(team, "Drop Me", bday(), &[]).unwrap();

        assert!(!roster.remove_pitcher(team, drop, &mut AlwaysNo).unwrap());
        assert!(roster.remove_pitcher(team, drop, &mut AlwaysYes).unwrap());

        assert_eq!(roster.team(team).unwrap().pitcher_ids, vec![keep]);
        assert!(roster.pitcher(drop).is_some());
        assert_eq!(
            roster.remove_pitcher(team, drop, &mut AlwaysYes).unwrap_err(),
            TrackerError::PitcherNotOnTeam { team, pitcher: drop }
        );
    }

    #[test]
    fn available_pitchers_filters_spent_budgets() {
        let (mut roster, team) = roster_with_team();
        let fresh = roster.add_pitcher(team, "Fresh Arm", bday(), &[]).unwrap();
        let tired = roster.add_pitcher(team, "Tired Arm", bday(), &[]).unwrap();

        let mut spent = roster.pitcher(tired).unwrap().clone();
        spent.available_today = 0;
        roster.replace_pitcher(spent).unwrap();

        let ids: Vec<PitcherId> = roster
            .available_pitchers(team)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![fresh]);
    }

    #[test]
    fn from_parts_allocates_above_recovered_ids() {
        let far_future = u64::MAX / 2;
        let team = Team {
            id: TeamId(far_future),
            name: "Recovered".into(),
            organization: Organization::Pony,
            age_group: "14U".into(),
            pitcher_ids: vec![],
        };
        let mut roster = Roster::from_parts(vec![team], vec![], RosterLimits::default());
        let id = roster.add_team("New", Organization::Pony, "14U").unwrap();
        assert!(id.0 > far_future);
    }
}
