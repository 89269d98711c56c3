mod driver;
mod engine;
mod session;

pub use driver::drive;
pub use engine::{
    ActiveSession, Completion, FocusTimer, TimerDurations, TimerMode, TimerState,
};
pub use session::{compost_for, focus_score, FocusSession, SessionMood, SessionPatch};
