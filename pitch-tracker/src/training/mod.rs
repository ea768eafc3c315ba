// Training session state machine.

pub mod session;

pub use session::{
    Advisory, ProgressZone, SavedSession, SessionEnd, TrainingPhase, TrainingState, TrainingStep,
};
