// Yes/no decisions the engine delegates to an outside party.
//
// Interactive front ends answer these from the user; tests answer them from
// a fixed policy or a script so every branch is deterministic.

use std::collections::VecDeque;
use std::fmt;

use crate::model::PitchType;

/// A question the engine needs answered before it can continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    /// Delete a team (its pitchers stay in the global set).
    DeleteTeam { team_name: String },
    /// Remove a pitcher from a team's list.
    RemovePitcher { pitcher_name: String },
    /// The third out of an inning was just recorded.
    EndOfInning { inning: u32 },
    /// The training session is under the minimum and can only be dropped.
    DiscardSession { thrown: usize, minimum: usize },
    /// Was this training pitch a strike? `false` records a ball.
    TrainingStrike { pitch_type: PitchType },
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Question::DeleteTeam { team_name } => {
                write!(f, "Delete team {team_name}? This will remove all associated data.")
            }
            Question::RemovePitcher { pitcher_name } => {
                write!(f, "Remove {pitcher_name} from the team?")
            }
            Question::EndOfInning { inning } => write!(f, "End of inning {inning}?"),
            Question::DiscardSession { thrown, minimum } => write!(
                f,
                "Invalid session: minimum {minimum} pitches required ({thrown} thrown). Discard?"
            ),
            Question::TrainingStrike { pitch_type } => {
                write!(f, "{pitch_type}: strike? (no records a ball)")
            }
        }
    }
}

/// Source of yes/no answers.
pub trait Decider {
    fn ask(&mut self, question: &Question) -> bool;
}

/// Answers yes to everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysYes;

impl Decider for AlwaysYes {
    fn ask(&mut self, _question: &Question) -> bool {
        true
    }
}

/// Answers no to everything. Also stands in when no confirmation mechanism
/// is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysNo;

impl Decider for AlwaysNo {
    fn ask(&mut self, _question: &Question) -> bool {
        false
    }
}

/// Replays a fixed sequence of answers and records every question asked.
/// Once the script runs out it answers `fallback`.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    answers: VecDeque<bool>,
    fallback: bool,
    pub asked: Vec<Question>,
}

impl Scripted {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Scripted {
            answers: answers.into_iter().collect(),
            fallback: false,
            asked: Vec::new(),
        }
    }

    /// Answer every question with `answer`, still recording what was asked.
    pub fn always(answer: bool) -> Self {
        Scripted::new(Vec::<bool>::new()).with_fallback(answer)
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// How many times a question matching `pred` was asked.
    pub fn count_asked(&self, pred: impl Fn(&Question) -> bool) -> usize {
        self.asked.iter().filter(|q| pred(q)).count()
    }
}

impl Decider for Scripted {
    fn ask(&mut self, question: &Question) -> bool {
        self.asked.push(question.clone());
        self.answers.pop_front().unwrap_or(self.fallback)
    }
}

impl<F> Decider for F
where
    F: FnMut(&Question) -> bool,
{
    fn ask(&mut self, question: &Question) -> bool {
        self(question)
    }
}
