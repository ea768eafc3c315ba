// One pitcher's stint on the mound: ball/strike count, outs and at-bat
// counters driven by a stream of pitch outcomes.

use chrono::{DateTime, Utc};

use crate::model::{
    GameRecord, Handedness, InningsPitched, PitchEvent, PitchOutcome, PitcherId, TeamId,
};
use crate::stats::{strike_percent, SplitCounts};

/// How the at-bat ended on the pitch just recorded, if it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtBatResolution {
    /// Count continues.
    None,
    /// Batter put the ball in play. Not an out.
    BallInPlay,
    /// Out recorded directly.
    Out,
    /// Third strike.
    Strikeout,
    /// Fourth ball.
    Walk,
}

impl AtBatResolution {
    pub fn is_out(self) -> bool {
        matches!(self, AtBatResolution::Out | AtBatResolution::Strikeout)
    }

    pub fn ends_at_bat(self) -> bool {
        self != AtBatResolution::None
    }
}

/// In-progress outing counters.
///
/// `outs` is cumulative for this pitcher's outing and is not reset when an
/// inning ends. `balls`/`strikes` describe the current count only.
#[derive(Debug, Clone, PartialEq)]
pub struct Outing {
    pub pitcher_id: PitcherId,
    pub pitcher_name: String,
    pub pitches: Vec<PitchEvent>,
    pub batter_hand: Option<Handedness>,
    pub balls: u32,
    pub strikes: u32,
    pub outs: u32,
    pub batters_faced: u32,
    pub balls_in_play: u32,
    pub first_pitch_strikes: u32,
    pub at_bats: u32,
    pub three_ball_counts: u32,
}

impl Outing {
    pub fn new(pitcher_id: PitcherId, pitcher_name: impl Into<String>) -> Self {
        Outing {
            pitcher_id,
            pitcher_name: pitcher_name.into(),
            pitches: Vec::new(),
            batter_hand: None,
            balls: 0,
            strikes: 0,
            outs: 0,
            batters_faced: 0,
            balls_in_play: 0,
            first_pitch_strikes: 0,
            at_bats: 0,
            three_ball_counts: 0,
        }
    }

    /// Apply one pitch thrown to a batter of `hand`.
    ///
    /// Ball-in-play takes precedence over an out, an out over a strikeout, and
    /// a strikeout over a walk; only one can resolve the at-bat.
    pub(crate) fn apply(
        &mut self,
        outcome: PitchOutcome,
        hand: Handedness,
        at: DateTime<Utc>,
    ) -> AtBatResolution {
        let fresh_count = self.balls == 0 && self.strikes == 0;
        self.pitches.push(PitchEvent { outcome, batter_hand: hand, timestamp: at });

        if outcome == PitchOutcome::Ball {
            self.balls += 1;
            if self.balls == 3 {
                self.three_ball_counts += 1;
            }
        } else {
            self.strikes += 1;
            if fresh_count {
                self.first_pitch_strikes += 1;
            }
        }

        let resolution = if outcome == PitchOutcome::BallInPlay {
            self.balls_in_play += 1;
            AtBatResolution::BallInPlay
        } else if outcome == PitchOutcome::Out {
            self.outs += 1;
            AtBatResolution::Out
        } else if self.strikes >= 3 {
            self.outs += 1;
            AtBatResolution::Strikeout
        } else if self.balls >= 4 {
            AtBatResolution::Walk
        } else {
            AtBatResolution::None
        };

        if resolution.ends_at_bat() {
            self.batters_faced += 1;
            self.at_bats += 1;
            self.balls = 0;
            self.strikes = 0;
            self.batter_hand = None;
        }
        resolution
    }

    /// Drop the last logged pitch. Counters are left as they are.
    pub(crate) fn undo_last_pitch(&mut self) -> Option<PitchEvent> {
        self.pitches.pop()
    }

    pub fn total_pitches(&self) -> u32 {
        self.pitches.len() as u32
    }

    pub fn splits(&self) -> SplitCounts {
        SplitCounts::from_pitches(&self.pitches)
    }

    /// Outs in the current inning as shown on the scoreboard.
    pub fn outs_this_inning(&self) -> u32 {
        self.outs % 3
    }

    pub fn innings(&self) -> InningsPitched {
        InningsPitched::from_outs(self.outs)
    }

    /// Percentage of at-bats that started with a strike.
    pub fn first_pitch_strike_percent(&self) -> u32 {
        strike_percent(self.at_bats, self.first_pitch_strikes)
    }

    /// Freeze the outing into a history record.
    pub fn to_record(&self, team_id: TeamId, date: DateTime<Utc>) -> GameRecord {
        let splits = self.splits();
        GameRecord {
            date,
            team_id,
            total_pitches: splits.pitches,
            innings: self.innings(),
            strike_percent: splits.strike_percent(),
            strikes: splits.strikes,
            batters_faced: self.batters_faced,
            lhb_pitches: splits.lhb_pitches,
            lhb_strikes: splits.lhb_strikes,
            rhb_pitches: splits.rhb_pitches,
            rhb_strikes: splits.rhb_strikes,
            balls_in_play: self.balls_in_play,
            first_pitch_strikes: self.first_pitch_strikes,
            three_ball_counts: self.three_ball_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PitchOutcome::*;

    fn throw(outing: &mut Outing, outcomes: &[PitchOutcome]) -> Vec<AtBatResolution> {
        outcomes
            .iter()
            .map(|&o| outing.apply(o, Handedness::Right, Utc::now()))
            .collect()
    }

    fn fresh() -> Outing {
        Outing::new(PitcherId(1), "Test Arm")
    }

    #[test]
    fn four_balls_is_a_walk() {
        let mut o = fresh();
        o.batter_hand = Some(Handedness::Right);
        let res = throw(&mut o, &[Ball, Ball, Ball, Ball]);
        assert_eq!(res.last(), Some(&AtBatResolution::Walk));
        assert_eq!(o.batters_faced, 1);
        assert_eq!(o.at_bats, 1);
        assert_eq!(o.three_ball_counts, 1);
        assert_eq!((o.balls, o.strikes), (0, 0));
        assert_eq!(o.batter_hand, None);
        assert_eq!(o.outs, 0);
    }

    #[test]
    fn three_strikes_is_an_out() {
        let mut o = fresh();
        let res = throw(&mut o, &[Strike, Strike, Strike]);
        assert_eq!(
            res,
            vec![AtBatResolution::None, AtBatResolution::None, AtBatResolution::Strikeout]
        );
        assert_eq!(o.outs, 1);
        assert_eq!((o.balls, o.strikes), (0, 0));
        assert_eq!(o.first_pitch_strikes, 1);
        // The next strike starts a new count rather than a fourth strike.
        throw(&mut o, &[Strike]);
        assert_eq!(o.strikes, 1);
        assert_eq!(o.outs, 1);
    }

    #[test]
    fn ball_in_play_never_records_an_out() {
        let mut o = fresh();
        let res = throw(&mut o, &[Ball, Strike, BallInPlay]);
        assert_eq!(res[2], AtBatResolution::BallInPlay);
        assert_eq!(o.outs, 0);
        assert_eq!(o.balls_in_play, 1);
        assert_eq!(o.batters_faced, 1);
        assert_eq!(o.splits().strikes, 2);
    }

    #[test]
    fn ball_in_play_on_two_strikes_is_not_a_strikeout() {
        let mut o = fresh();
        let res = throw(&mut o, &[Strike, Strike, BallInPlay]);
        assert_eq!(res[2], AtBatResolution::BallInPlay);
        assert_eq!(o.outs, 0);
    }

    #[test]
    fn first_pitch_strike_only_on_fresh_count() {
        let mut o = fresh();
        throw(&mut o, &[Ball, Strike, Out, Out, Strike]);
        // Out on 0-0 counts, as does the strike after it.
        assert_eq!(o.first_pitch_strikes, 2);
        assert_eq!(o.at_bats, 2);
        assert_eq!(o.first_pitch_strike_percent(), 100);
    }

    #[test]
    fn three_ball_count_once_per_at_bat() {
        let mut o = fresh();
        throw(&mut o, &[Ball, Ball, Ball, Strike, Strike, Out]);
        assert_eq!(o.three_ball_counts, 1);
        assert_eq!(o.outs, 1);
    }

    #[test]
    fn undo_leaves_counters() {
        let mut o = fresh();
        throw(&mut o, &[Strike, Strike, Strike]);
        assert!(o.undo_last_pitch().is_some());
        assert_eq!(o.pitches.len(), 2);
        assert_eq!(o.outs, 1, "undo is log-only");
    }

    #[test]
    fn record_captures_counts_and_innings() {
        let mut o = fresh();
        throw(&mut o, &[Out, Out, Out, Out, Ball]);
        o.apply(Strike, Handedness::Left, Utc::now());
        let rec = o.to_record(TeamId(9), Utc::now());
        assert_eq!(rec.total_pitches, 6);
        assert_eq!(rec.innings.to_string(), "1.1");
        assert_eq!(rec.strikes, 5);
        assert_eq!(rec.strike_percent, 83);
        assert_eq!((rec.lhb_pitches, rec.lhb_strikes), (1, 1));
        assert_eq!((rec.rhb_pitches, rec.rhb_strikes), (5, 4));
        assert_eq!(rec.batters_faced, 4);
        assert_eq!(rec.team_id, TeamId(9));
        assert_eq!(o.outs_this_inning(), 1);
    }
}
