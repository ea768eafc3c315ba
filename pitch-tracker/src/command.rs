// Line-oriented command shell.
//
// Parses text commands into `UserCommand`s, applies them to a `Tracker`
// and renders the result as plain lines. Yes/no questions raised by the
// engine are put to the same terminal.

use std::io::{BufRead, Write};

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::app::{PitcherReport, TrainingEnd, Tracker};
use crate::decision::{Decider, Question};
use crate::error::TrackerError;
use crate::game::{AtBatResolution, GameSummary};
use crate::model::{Handedness, Organization, PitchOutcome, PitchType, PitcherId, TeamId};
use crate::stats::{SessionStats, StrikeBand};
use crate::training::{Advisory, ProgressZone};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Help,
    Quit,
    ListTeams,
    AddTeam {
        name: String,
        organization: Organization,
        age_group: String,
    },
    RemoveTeam(TeamId),
    ListPitchers(TeamId),
    AddPitcher {
        team_id: TeamId,
        full_name: String,
        birthday: NaiveDate,
        arsenal: Vec<PitchType>,
    },
    RemovePitcher {
        team_id: TeamId,
        pitcher_id: PitcherId,
    },
    ShowPitcher(PitcherId),
    StartGame(TeamId),
    SelectPitcher(PitcherId),
    SetBatter(Handedness),
    Pitch(PitchOutcome),
    UndoPitch,
    EndInning,
    EndOuting,
    EndGame,
    Live,
    StartTraining {
        pitcher_id: PitcherId,
        target: Option<usize>,
    },
    Throw(PitchType),
    UndoThrow,
    EndTraining,
    Notes(String),
    SaveTraining,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help` for the list")]
    Unknown(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("`{value}` is not a valid {argument}")]
    InvalidArgument { argument: &'static str, value: String },
}

pub const HELP: &str = "\
teams                                  list teams
add-team <name>, <organization>, <age group>
remove-team <team id>
pitchers <team id>                     list a team's pitchers
add-pitcher <team id>, <full name>, <YYYY-MM-DD>[, <pitch type> ...]
remove-pitcher <team id>, <pitcher id>
pitcher <pitcher id>                   stats, workload and training history
game <team id>                         start a game
mound <pitcher id>                     put a pitcher in
bat L|R                                set batter handedness
ball | strike | bip | out              record a pitch (b, k, o)
undo | inning | end-outing | end-game | live
train <pitcher id>[, <target>]         start a practice session
throw <pitch type>                     log a training pitch
train-undo | train-end | save
notes <text>
quit";

fn args(rest: &str) -> Vec<&str> {
    if rest.trim().is_empty() {
        return Vec::new();
    }
    rest.split(',').map(str::trim).collect()
}

fn required<'a>(
    args: &[&'a str],
    idx: usize,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    args.get(idx)
        .copied()
        .filter(|s| !s.is_empty())
        .ok_or(CommandError::MissingArgument { command, argument })
}

fn parse_id(value: &str, argument: &'static str) -> Result<u64, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        argument,
        value: value.to_string(),
    })
}

fn parse_organization(value: &str) -> Result<Organization, CommandError> {
    if let Ok(n) = value.parse::<usize>() {
        if let Some(org) = n.checked_sub(1).and_then(|i| Organization::ALL.get(i)) {
            return Ok(*org);
        }
    }
    Organization::from_label(value).ok_or(CommandError::InvalidArgument {
        argument: "organization",
        value: value.to_string(),
    })
}

fn parse_pitch_type(value: &str) -> Result<PitchType, CommandError> {
    PitchType::from_label(value).ok_or(CommandError::InvalidArgument {
        argument: "pitch type",
        value: value.to_string(),
    })
}

fn team_arg(args: &[&str], idx: usize, command: &'static str) -> Result<TeamId, CommandError> {
    parse_id(required(args, idx, command, "a team id")?, "team id").map(TeamId)
}

fn pitcher_arg(
    args: &[&str],
    idx: usize,
    command: &'static str,
) -> Result<PitcherId, CommandError> {
    parse_id(required(args, idx, command, "a pitcher id")?, "pitcher id").map(PitcherId)
}

/// Parse one input line. Blank lines parse to `None`.
pub fn parse_line(line: &str) -> Result<Option<UserCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let word = word.to_ascii_lowercase();
    if let Some(outcome) = PitchOutcome::from_label(&word) {
        return Ok(Some(UserCommand::Pitch(outcome)));
    }
    let a = args(rest);

    let command = match word.as_str() {
        "help" | "?" => UserCommand::Help,
        "quit" | "exit" => UserCommand::Quit,
        "teams" => UserCommand::ListTeams,
        "add-team" => UserCommand::AddTeam {
            name: required(&a, 0, "add-team", "a team name")?.to_string(),
            organization: parse_organization(required(&a, 1, "add-team", "an organization")?)?,
            age_group: required(&a, 2, "add-team", "an age group")?.to_string(),
        },
        "remove-team" => UserCommand::RemoveTeam(team_arg(&a, 0, "remove-team")?),
        "pitchers" => UserCommand::ListPitchers(team_arg(&a, 0, "pitchers")?),
        "add-pitcher" => {
            let team_id = team_arg(&a, 0, "add-pitcher")?;
            let full_name = required(&a, 1, "add-pitcher", "a full name")?.to_string();
            let date = required(&a, 2, "add-pitcher", "a birthday")?;
            let birthday = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                CommandError::InvalidArgument {
                    argument: "birthday (YYYY-MM-DD)",
                    value: date.to_string(),
                }
            })?;
            let arsenal = a
                .get(3)
                .map(|list| {
                    list.split_whitespace()
                        .map(parse_pitch_type)
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?
                .unwrap_or_default();
            UserCommand::AddPitcher { team_id, full_name, birthday, arsenal }
        }
        "remove-pitcher" => UserCommand::RemovePitcher {
            team_id: team_arg(&a, 0, "remove-pitcher")?,
            pitcher_id: pitcher_arg(&a, 1, "remove-pitcher")?,
        },
        "pitcher" => UserCommand::ShowPitcher(pitcher_arg(&a, 0, "pitcher")?),
        "game" => UserCommand::StartGame(team_arg(&a, 0, "game")?),
        "mound" => UserCommand::SelectPitcher(pitcher_arg(&a, 0, "mound")?),
        "bat" => {
            let hand = required(&a, 0, "bat", "L or R")?;
            let hand = Handedness::from_label(hand).ok_or(CommandError::InvalidArgument {
                argument: "handedness",
                value: hand.to_string(),
            })?;
            UserCommand::SetBatter(hand)
        }
        "undo" => UserCommand::UndoPitch,
        "inning" => UserCommand::EndInning,
        "end-outing" => UserCommand::EndOuting,
        "end-game" => UserCommand::EndGame,
        "live" => UserCommand::Live,
        "train" => {
            let pitcher_id = pitcher_arg(&a, 0, "train")?;
            let target = a
                .get(1)
                .map(|t| {
                    t.parse::<usize>().map_err(|_| CommandError::InvalidArgument {
                        argument: "target",
                        value: t.to_string(),
                    })
                })
                .transpose()?;
            UserCommand::StartTraining { pitcher_id, target }
        }
        "throw" => {
            UserCommand::Throw(parse_pitch_type(required(&a, 0, "throw", "a pitch type")?)?)
        }
        "train-undo" => UserCommand::UndoThrow,
        "train-end" => UserCommand::EndTraining,
        "notes" => UserCommand::Notes(rest.trim().to_string()),
        "save" => UserCommand::SaveTraining,
        _ => return Err(CommandError::Unknown(word)),
    };
    Ok(Some(command))
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Apply a command and describe the result. `Help` and `Quit` are handled
/// by the shell loop and render nothing here.
pub fn execute(
    tracker: &mut Tracker,
    command: UserCommand,
    decider: &mut dyn Decider,
    now: DateTime<Utc>,
) -> Result<Vec<String>, TrackerError> {
    debug!("Executing {:?}", command);
    let mut out = Vec::new();

    match command {
        UserCommand::Help | UserCommand::Quit => {}
        UserCommand::ListTeams => {
            if tracker.roster().teams().is_empty() {
                out.push("No teams yet.".to_string());
            }
            for team in tracker.roster().teams() {
                out.push(format!(
                    "[{}] {} - {} {} ({} pitchers)",
                    team.id,
                    team.name,
                    team.organization,
                    team.age_group,
                    team.pitcher_ids.len()
                ));
            }
        }
        UserCommand::AddTeam { name, organization, age_group } => {
            let id = tracker.add_team(&name, organization, &age_group)?;
            out.push(format!("Added team [{id}] {name}"));
        }
        UserCommand::RemoveTeam(id) => {
            let removed = tracker.remove_team(id, decider)?;
            out.push(if removed { "Team deleted." } else { "Kept team." }.to_string());
        }
        UserCommand::ListPitchers(team_id) => {
            let today = now.date_naive();
            for p in tracker.roster().team_pitchers(team_id)? {
                out.push(format!(
                    "[{}] {} (age {}) - {} available today",
                    p.id,
                    p.full_name,
                    p.age_on(today),
                    p.available_today
                ));
            }
            if out.is_empty() {
                out.push("No pitchers on this team.".to_string());
            }
        }
        UserCommand::AddPitcher { team_id, full_name, birthday, arsenal } => {
            let id = tracker.add_pitcher(team_id, &full_name, birthday, &arsenal)?;
            out.push(format!("Added pitcher [{id}] {full_name}"));
        }
        UserCommand::RemovePitcher { team_id, pitcher_id } => {
            let removed = tracker.remove_pitcher(team_id, pitcher_id, decider)?;
            out.push(if removed { "Pitcher removed from team." } else { "Kept pitcher." }.to_string());
        }
        UserCommand::ShowPitcher(id) => {
            let report = tracker.pitcher_report(id, now.date_naive())?;
            out.extend(render_report(&report));
        }
        UserCommand::StartGame(team_id) => {
            tracker.start_game(team_id, now)?;
            out.push("Game started. Choose a pitcher:".to_string());
            for p in tracker.selectable_pitchers()? {
                out.push(format!("  [{}] {} - {} available", p.id, p.full_name, p.available_today));
            }
        }
        UserCommand::SelectPitcher(id) => {
            tracker.select_pitcher(id)?;
            out.push("Pitcher on the mound. Set the batter with `bat L|R`.".to_string());
        }
        UserCommand::SetBatter(hand) => {
            tracker.set_batter_hand(hand)?;
            out.push(format!("Batter: {hand}"));
        }
        UserCommand::Pitch(outcome) => {
            let report = tracker.record_pitch(outcome, now, decider)?;
            let what = match report.resolution {
                AtBatResolution::None => None,
                AtBatResolution::BallInPlay => Some("Ball in play."),
                AtBatResolution::Out => Some("Out."),
                AtBatResolution::Strikeout => Some("Strikeout."),
                AtBatResolution::Walk => Some("Walk."),
            };
            out.extend(what.map(str::to_string));
            if report.inning_advanced {
                out.push(format!("Inning {}.", tracker.game().map_or(0, |g| g.inning)));
            }
            out.extend(render_live(tracker));
        }
        UserCommand::UndoPitch => {
            tracker.undo_pitch()?;
            out.push("Last pitch removed (count unchanged).".to_string());
        }
        UserCommand::EndInning => {
            let inning = tracker.end_inning()?;
            out.push(format!("Inning {inning}."));
        }
        UserCommand::EndOuting => {
            let record = tracker.end_outing(now)?;
            out.push(format!(
                "Outing over: {} pitches, {} IP, {}% strikes",
                record.total_pitches, record.innings, record.strike_percent
            ));
        }
        UserCommand::EndGame => {
            let summary = tracker.end_game()?;
            out.extend(render_summary(&summary));
        }
        UserCommand::Live => {
            let lines = render_live(tracker);
            if lines.is_empty() {
                out.push("No pitcher on the mound.".to_string());
            }
            out.extend(lines);
        }
        UserCommand::StartTraining { pitcher_id, target } => {
            let target = tracker.start_training(pitcher_id, target, now)?;
            out.push(format!("Training started, target {target} pitches."));
        }
        UserCommand::Throw(pitch_type) => {
            let report = tracker.record_training_pitch(pitch_type, decider, now)?;
            for advisory in &report.advisories {
                out.push(match advisory {
                    Advisory::ApproachingLimit { thrown } => {
                        format!("{thrown} pitches thrown. Consider ending the session soon.")
                    }
                    Advisory::LimitReached { thrown } => {
                        format!("Maximum {thrown} pitches reached. Session ended.")
                    }
                });
            }
            if let Some(state) = tracker.training() {
                let zone = match state.progress_zone() {
                    ProgressZone::UnderMinimum => "under minimum",
                    ProgressZone::Building => "building",
                    ProgressZone::OnTarget => "on target",
                    ProgressZone::OverAdvisory => "past advisory",
                };
                out.push(format!("{}/{} ({zone})", state.thrown(), state.target));
            }
            if report.finalized {
                if let Some(state) = tracker.training() {
                    out.extend(render_session(&state.stats()));
                }
            }
        }
        UserCommand::UndoThrow => {
            tracker.undo_training_pitch()?;
            out.push("Last training pitch removed.".to_string());
        }
        UserCommand::EndTraining => match tracker.end_training(decider)? {
            TrainingEnd::Summary(stats) => {
                out.extend(render_session(&stats));
                out.push("Add `notes` then `save`.".to_string());
            }
            TrainingEnd::Discarded => out.push("Session discarded.".to_string()),
        },
        UserCommand::Notes(text) => {
            tracker.set_training_notes(&text)?;
            out.push("Notes set.".to_string());
        }
        UserCommand::SaveTraining => {
            let session = tracker.save_training(now)?;
            out.push(format!("Saved session of {} pitches.", session.pitches.len()));
        }
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn pct(percent: u32) -> String {
    format!("{percent}% ({})", StrikeBand::from_percent(percent).label())
}

fn render_live(tracker: &Tracker) -> Vec<String> {
    let Some(game) = tracker.game() else {
        return Vec::new();
    };
    let Some(live) = game.live_stats() else {
        return Vec::new();
    };
    vec![
        format!(
            "Inning {} | Outs {} | Count {}-{} | Pitches {} | Strikes {} | BIP {}",
            game.inning,
            live.outs_this_inning,
            live.balls,
            live.strikes,
            live.total_pitches,
            pct(live.strike_percent),
            live.balls_in_play
        ),
        format!(
            "1st pitch strikes {}/{} ({}%) | 3-ball counts {} | vs RHB {} | vs LHB {}",
            live.first_pitch_strikes,
            live.at_bats,
            live.first_pitch_strike_percent,
            live.three_ball_counts,
            pct(live.vs_rhb),
            pct(live.vs_lhb)
        ),
    ]
}

fn render_session(stats: &SessionStats) -> Vec<String> {
    let mut lines = vec![format!(
        "Session: {} pitches, strikes {}",
        stats.total,
        pct(stats.strike_percent)
    )];
    for s in stats.ranked() {
        lines.push(format!("  {}: {} thrown, {}", s.pitch_type, s.count, pct(s.strike_percent)));
    }
    lines
}

pub fn render_summary(summary: &GameSummary) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Team: {} pitches, strikes {}, {} batters faced, {} outs ({} IP)",
            summary.total_pitches,
            pct(summary.strike_percent),
            summary.batters_faced,
            summary.outs,
            summary.innings()
        ),
        format!("vs RHB {} | vs LHB {}", pct(summary.vs_rhb), pct(summary.vs_lhb)),
    ];
    for line in &summary.lines {
        lines.push(format!(
            "  {}: {} pitches | {} IP | {}",
            line.pitcher_name,
            line.total_pitches,
            line.innings,
            pct(line.strike_percent)
        ));
    }
    if !summary.unavailable.is_empty() {
        lines.push("Unavailable today:".to_string());
        for p in &summary.unavailable {
            lines.push(format!("  {} - {} pitches", p.pitcher_name, p.available_today));
        }
    }
    if !summary.available.is_empty() {
        lines.push("Available today:".to_string());
        for p in &summary.available {
            lines.push(format!("  {} - {} pitches", p.pitcher_name, p.available_today));
        }
    }
    lines
}

pub fn render_report(report: &PitcherReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "[{}] {} (age {}) - {} available today",
            report.pitcher_id, report.full_name, report.age, report.available_today
        ),
        format!(
            "Season: {} games, {} pitches, strikes {}, vs LHB {}, vs RHB {}",
            report.season.games,
            report.season.total_pitches,
            pct(report.season.strike_percent),
            pct(report.season.vs_lhb),
            pct(report.season.vs_rhb)
        ),
        format!(
            "Last 5 outings: {} pitches | recent: {}",
            report.workload.last_five_total,
            report
                .workload
                .last_outings
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    ];
    if let Some(last) = &report.last_outing {
        lines.push(format!(
            "Last outing {}: {} pitches, {} IP, {}% strikes",
            last.date.date_naive(),
            last.total_pitches,
            last.innings,
            last.strike_percent
        ));
    }
    if !report.best_pitches.is_empty() {
        let best: Vec<String> = report
            .best_pitches
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {} {}%", i + 1, s.pitch_type, s.strike_percent))
            .collect();
        lines.push(format!("Best pitches: {}", best.join(" | ")));
    }
    for (session, stats) in &report.training_history {
        lines.push(format!(
            "  {}: {} pitches, {}% strikes{}",
            session.date.date_naive(),
            stats.total,
            stats.strike_percent,
            if session.notes.is_empty() {
                String::new()
            } else {
                format!(" - {}", session.notes)
            }
        ));
    }
    lines
}

// ---------------------------------------------------------------------------
// Shell loop
// ---------------------------------------------------------------------------

/// Put a question to the terminal. Anything but y/yes (including end of
/// input) is a no.
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &Question) -> bool {
    if write!(output, "{question} [y/n] ").and_then(|_| output.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(e) => {
            warn!("Failed to read answer: {}", e);
            false
        }
    }
}

/// Run the shell until `quit` or end of input.
pub fn run_shell<R: BufRead, W: Write>(
    tracker: &mut Tracker,
    mut input: R,
    mut output: W,
) -> anyhow::Result<()> {
    writeln!(output, "Pitch tracker ready. Type `help` for commands.")?;
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).context("failed to read command")? == 0 {
            break;
        }

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(output, "{e}")?;
                continue;
            }
        };

        match command {
            UserCommand::Quit => break,
            UserCommand::Help => {
                writeln!(output, "{HELP}")?;
                continue;
            }
            _ => {}
        }

        let result = {
            let mut decider = |q: &Question| ask(&mut input, &mut output, q);
            execute(tracker, command, &mut decider, Utc::now())
        };
        match result {
            Ok(lines) => {
                for line in lines {
                    writeln!(output, "{line}")?;
                }
            }
            Err(e) => writeln!(output, "error: {e}")?,
        }
    }
    Ok(())
}
