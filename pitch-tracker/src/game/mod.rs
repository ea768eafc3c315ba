// Game session state machine.
//
// A `Game` moves between pitcher selection, waiting for the batter's
// handedness and waiting for a pitch outcome. Outings are closed into
// `GameRecord`s; the summary is computed from those records alone.

pub mod outing;
pub mod state;
pub mod summary;

pub use outing::{AtBatResolution, Outing};
pub use state::{CompletedOuting, Game, GamePhase, LiveStats, OutingEnded, PitchApplied};
pub use summary::{outs_from_innings, summarize, Availability, GameSummary, OutingLine};
