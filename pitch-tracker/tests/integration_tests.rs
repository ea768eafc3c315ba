// Integration tests for the pitch tracker.
//
// These tests drive the library crate's public API end-to-end: roster
// management, a full game with a pitcher change, training sessions, and
// persistence through both the SQLite and in-memory gateways.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use pitch_tracker::app::{self, TrainingEnd, Tracker};
use pitch_tracker::config::Config;
use pitch_tracker::decision::{AlwaysNo, AlwaysYes, Question, Scripted};
use pitch_tracker::error::TrackerError;
use pitch_tracker::game::{AtBatResolution, GamePhase};
use pitch_tracker::model::{Handedness, Organization, PitchOutcome, PitchType, PitcherId, TeamId};
use pitch_tracker::persistence::{
    self, Collection, MemoryGateway, PersistenceGateway, SqliteGateway,
};
use pitch_tracker::training::Advisory;

// ===========================================================================
// Test helpers
// ===========================================================================

fn game_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 9, 17, 0, 0).unwrap()
}

fn birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 6, 1).unwrap()
}

/// A tracker with one team and two pitchers, no storage.
fn tracker_with_staff() -> (Tracker, TeamId, PitcherId, PitcherId) {
    let mut t = Tracker::in_memory(Config::default());
    let team = t.add_team("Hawks", Organization::LittleLeague, "12U").unwrap();
    let ace = t
        .add_pitcher(team, "Ace Ortiz", birthday(), &[PitchType::FourSeam, PitchType::Curve])
        .unwrap();
    let reliever = t
        .add_pitcher(team, "Rory Bell", birthday(), &[PitchType::Change])
        .unwrap();
    (t, team, ace, reliever)
}

/// Record `outcome`, naming a batter first if the previous at-bat ended.
fn pitch(t: &mut Tracker, outcome: PitchOutcome, hand: Handedness, decider: &mut Scripted) {
    if t.game().unwrap().phase() == GamePhase::AwaitingHandedness {
        t.set_batter_hand(hand).unwrap();
    }
    t.record_pitch(outcome, game_time(), decider).unwrap();
}

fn temp_db_path(name: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
        "pitch_tracker_it_{}_{}.db",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn remove_db(path: &std::path::Path) {
    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
}

// ===========================================================================
// Game flow
// ===========================================================================

#[test]
fn forty_two_pitch_outing_charges_budget_and_summarizes() {
    let (mut t, team, ace, reliever) = tracker_with_staff();
    t.start_game(team, game_time()).unwrap();
    t.select_pitcher(ace).unwrap();

    // 14 strikeouts on 42 pitches; advance the inning each time it is offered.
    let mut decider = Scripted::always(true);
    for _ in 0..42 {
        pitch(&mut t, PitchOutcome::Strike, Handedness::Right, &mut decider);
    }
    assert_eq!(
        decider.count_asked(|q| matches!(q, Question::EndOfInning { .. })),
        4
    );
    assert_eq!(t.game().unwrap().inning, 5);

    let record = t.end_outing(game_time()).unwrap();
    assert_eq!(record.total_pitches, 42);
    assert_eq!(record.strikes, 42);
    assert_eq!(record.batters_faced, 14);
    assert_eq!(record.innings.outs(), 14);
    assert_eq!(t.roster().pitcher(ace).unwrap().available_today, 43);

    // The reliever walks a lefty on four pitches.
    t.select_pitcher(reliever).unwrap();
    let mut decider = Scripted::always(false);
    for _ in 0..3 {
        pitch(&mut t, PitchOutcome::Ball, Handedness::Left, &mut decider);
    }
    let report = t.record_pitch(PitchOutcome::Ball, game_time(), &mut decider).unwrap();
    assert_eq!(report.resolution, AtBatResolution::Walk);
    t.end_outing(game_time()).unwrap();

    let summary = t.end_game().unwrap();
    assert_eq!(summary.total_pitches, 46);
    assert_eq!(summary.strikes, 42);
    assert_eq!(summary.batters_faced, 15);
    assert_eq!(summary.outs, 14);
    assert_eq!(summary.vs_lhb, 0);
    assert_eq!(summary.vs_rhb, 100);
    assert_eq!(summary.lines.len(), 2);
    assert_eq!(summary.available.len(), 2);
    assert!(summary.unavailable.is_empty());
    assert!(t.game().is_none());

    let report = t.pitcher_report(ace, game_time().date_naive()).unwrap();
    assert_eq!(report.last_outing.unwrap().total_pitches, 42);
    assert_eq!(report.season.total_pitches, 42);
}

#[test]
fn game_rules_are_enforced_at_the_tracker() {
    let (mut t, team, ace, _) = tracker_with_staff();
    assert!(matches!(t.select_pitcher(ace), Err(TrackerError::NoActiveGame)));

    t.start_game(team, game_time()).unwrap();
    assert!(matches!(
        t.start_game(team, game_time()),
        Err(TrackerError::GameInProgress)
    ));
    assert!(matches!(
        t.remove_team(team, &mut AlwaysYes),
        Err(TrackerError::GameInProgress)
    ));

    t.select_pitcher(ace).unwrap();
    assert!(matches!(
        t.record_pitch(PitchOutcome::Strike, game_time(), &mut AlwaysNo),
        Err(TrackerError::HandednessRequired)
    ));
    assert!(matches!(t.end_game(), Err(TrackerError::OutingInProgress)));
}

#[test]
fn exhausted_pitcher_cannot_be_selected() {
    let (mut t, team, ace, _) = tracker_with_staff();
    t.start_game(team, game_time()).unwrap();
    t.select_pitcher(ace).unwrap();

    let mut decider = Scripted::always(false);
    for _ in 0..85 {
        pitch(&mut t, PitchOutcome::Ball, Handedness::Right, &mut decider);
    }
    t.end_outing(game_time()).unwrap();
    assert_eq!(t.roster().pitcher(ace).unwrap().available_today, 0);

    assert!(matches!(
        t.select_pitcher(ace),
        Err(TrackerError::PitcherUnavailable(_))
    ));
    let selectable: Vec<PitcherId> =
        t.selectable_pitchers().unwrap().iter().map(|p| p.id).collect();
    assert!(!selectable.contains(&ace));

    let summary = t.end_game().unwrap();
    assert_eq!(summary.unavailable.len(), 1);
    assert_eq!(summary.unavailable[0].pitcher_id, ace);
}

// ===========================================================================
// Roster limits
// ===========================================================================

#[test]
fn sixth_team_and_sixteenth_pitcher_are_rejected() {
    let mut t = Tracker::in_memory(Config::default());
    let mut first = None;
    for i in 0..5 {
        let id = t
            .add_team(&format!("Team {i}"), Organization::Pony, "13U")
            .unwrap();
        first.get_or_insert(id);
    }
    assert!(matches!(
        t.add_team("Sixth", Organization::Pony, "13U"),
        Err(TrackerError::CapacityExceeded { limit: 5, .. })
    ));

    let team = first.unwrap();
    for i in 0..15 {
        t.add_pitcher(team, &format!("Pitcher {i}"), birthday(), &[])
            .unwrap();
    }
    assert!(matches!(
        t.add_pitcher(team, "One Too Many", birthday(), &[]),
        Err(TrackerError::CapacityExceeded { limit: 15, .. })
    ));
    assert_eq!(t.roster().team(team).unwrap().pitcher_ids.len(), 15);
}

#[test]
fn removing_a_team_keeps_its_pitchers() {
    let (mut t, team, ace, _) = tracker_with_staff();
    assert!(!t.remove_team(team, &mut AlwaysNo).unwrap());
    assert!(t.remove_team(team, &mut AlwaysYes).unwrap());
    assert!(t.roster().team(team).is_none());
    assert!(t.roster().pitcher(ace).is_some());
}

// ===========================================================================
// Training
// ===========================================================================

#[test]
fn training_finalizes_itself_at_sixty_pitches() {
    let (mut t, _, ace, _) = tracker_with_staff();
    assert_eq!(t.start_training(ace, Some(90), game_time()).unwrap(), 60);

    let mut advisories = Vec::new();
    let mut finalized_at = None;
    for i in 1..=60 {
        let report = t
            .record_training_pitch(PitchType::Curve, &mut AlwaysYes, game_time())
            .unwrap();
        advisories.extend(report.advisories);
        if report.finalized {
            finalized_at = Some(i);
        }
    }
    assert_eq!(finalized_at, Some(60));
    assert_eq!(
        advisories,
        vec![
            Advisory::ApproachingLimit { thrown: 45 },
            Advisory::LimitReached { thrown: 60 },
        ]
    );
    assert!(matches!(
        t.record_training_pitch(PitchType::Curve, &mut AlwaysYes, game_time()),
        Err(TrackerError::SessionNotRecording)
    ));

    match t.end_training(&mut AlwaysNo).unwrap() {
        TrainingEnd::Summary(stats) => {
            assert_eq!(stats.total, 60);
            assert_eq!(stats.strike_percent, 100);
        }
        TrainingEnd::Discarded => panic!("a full session should not be discarded"),
    }
    t.set_training_notes("Kept the curve down.").unwrap();
    let session = t.save_training(game_time() + Duration::minutes(30)).unwrap();
    assert_eq!(session.pitches.len(), 60);
    assert_eq!(session.notes, "Kept the curve down.");

    let pitcher = t.roster().pitcher(ace).unwrap();
    assert_eq!(pitcher.training_sessions.len(), 1);
    assert_eq!(pitcher.available_today, 85);
    assert!(t.training().is_none());
}

#[test]
fn short_training_session_can_only_be_discarded() {
    let (mut t, _, ace, _) = tracker_with_staff();
    t.start_training(ace, None, game_time()).unwrap();
    for _ in 0..14 {
        t.record_training_pitch(PitchType::FourSeam, &mut AlwaysNo, game_time())
            .unwrap();
    }

    assert!(matches!(
        t.end_training(&mut AlwaysNo),
        Err(TrackerError::BelowMinimumPitches { thrown: 14, minimum: 15 })
    ));
    assert_eq!(t.training().unwrap().thrown(), 14);
    assert!(matches!(
        t.save_training(game_time()),
        Err(TrackerError::SummaryNotReady)
    ));

    assert_eq!(t.end_training(&mut AlwaysYes).unwrap(), TrainingEnd::Discarded);
    assert!(t.training().is_none());
    assert!(t.roster().pitcher(ace).unwrap().training_sessions.is_empty());
}

// ===========================================================================
// Persistence
// ===========================================================================

#[tokio::test]
async fn sqlite_store_round_trips_through_recovery() {
    let path = temp_db_path("round_trip");
    let path_str = path.to_str().unwrap().to_string();
    let config = Config { db_path: path_str.clone(), ..Config::default() };

    let (team, ace) = {
        let mut gateway = SqliteGateway::new(path_str.clone());
        assert!(gateway.init());
        let roster = app::recover_from_store(&config, &gateway);
        assert!(roster.teams().is_empty());

        let (handle, writer) = persistence::spawn_writer(Box::new(gateway));
        let mut t = Tracker::new(config.clone(), roster, handle.clone());
        let team = t.add_team("Hawks", Organization::Usssa, "11U").unwrap();
        let ace = t
            .add_pitcher(team, "Ace Ortiz", birthday(), &[PitchType::Slider])
            .unwrap();

        t.start_game(team, game_time()).unwrap();
        t.select_pitcher(ace).unwrap();
        let mut decider = Scripted::always(false);
        for _ in 0..10 {
            pitch(&mut t, PitchOutcome::Ball, Handedness::Left, &mut decider);
        }
        t.end_outing(game_time()).unwrap();

        handle.flush().await;
        drop(t);
        drop(handle);
        let report = writer.await.unwrap();
        assert!(!report.degraded);
        assert!(report.written >= 3);
        (team, ace)
    };

    let mut gateway = SqliteGateway::new(path_str);
    assert!(gateway.init());
    let roster = app::recover_from_store(&config, &gateway);
    assert_eq!(roster.team(team).unwrap().pitcher_ids, vec![ace]);
    let pitcher = roster.pitcher(ace).unwrap();
    assert_eq!(pitcher.available_today, 75);
    assert_eq!(pitcher.games.len(), 1);
    assert_eq!(pitcher.arsenal, vec![PitchType::Slider]);

    // New ids keep increasing past what was recovered.
    let mut t = Tracker::new(config, roster, persistence::PersistHandle::detached());
    let second = t.add_team("Owls", Organization::Aau, "12U").unwrap();
    assert!(second.0 > team.0);

    drop(gateway);
    remove_db(&path);
}

#[tokio::test]
async fn failed_write_switches_to_memory_only() {
    let gateway = MemoryGateway::new();
    gateway.fail_writes(true);
    let (handle, writer) = persistence::spawn_writer(Box::new(gateway.clone()));

    let mut t = Tracker::new(
        Config::default(),
        pitch_tracker::roster::Roster::new(Config::default().roster),
        handle.clone(),
    );
    let team = t.add_team("Hawks", Organization::Aabc, "9U").unwrap();
    t.add_pitcher(team, "Lee Park", birthday(), &[]).unwrap();

    handle.flush().await;
    drop(t);
    drop(handle);
    let report = writer.await.unwrap();

    assert!(report.degraded);
    assert_eq!(report.written, 0);
    assert!(report.skipped >= 1);
    assert!(gateway.is_empty(Collection::Teams));
}

#[test]
fn unavailable_store_recovers_an_empty_roster() {
    let mut gateway = MemoryGateway::unavailable();
    assert!(!gateway.init());
    let roster = app::recover_from_store(&Config::default(), &gateway);
    assert!(roster.teams().is_empty());
    assert!(roster.pitchers().is_empty());
}

#[test]
fn malformed_stored_records_are_skipped_on_recovery() {
    let gateway = MemoryGateway::new();
    gateway.insert_raw(Collection::Teams, 1, serde_json::json!({ "name": 42 }));
    gateway.insert_raw(
        Collection::Teams,
        2,
        serde_json::json!({
            "id": 2,
            "name": "Owls",
            "organization": "Pony",
            "age_group": "13U",
            "pitcher_ids": []
        }),
    );

    let roster = app::recover_from_store(&Config::default(), &gateway);
    assert_eq!(roster.teams().len(), 1);
    assert_eq!(roster.teams()[0].name, "Owls");
}
