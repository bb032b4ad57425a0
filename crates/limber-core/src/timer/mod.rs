mod driver;
mod engine;

pub use driver::{TimerDriver, TICK_INTERVAL};
pub use engine::{Phase, RunState, StretchTimer, TimerSnapshot, SWITCH_SECONDS};
