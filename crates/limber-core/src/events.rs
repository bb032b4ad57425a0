use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerSnapshot;

/// Every state change in the timer produces an Event.
/// Callers subscribe to the driver's channel (or collect the return values
/// of engine commands) to drive history bookkeeping and feedback cues.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A countdown began from idle, or restarted after a finish.
    TimerStarted {
        seconds_per_side: u64,
        sides: u8,
        at: DateTime<Utc>,
    },
    TimerPaused {
        time_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        time_remaining: u64,
        at: DateTime<Utc>,
    },
    /// Side one is done; the switch window has begun.
    SwitchPending {
        switch_seconds: u64,
        at: DateTime<Utc>,
    },
    /// The switch window elapsed; side two is counting down.
    SideSwitched {
        time_remaining: u64,
        at: DateTime<Utc>,
    },
    /// The last phase ran out; the timer is finished.
    TimerFinished { at: DateTime<Utc> },
    TimerReset { at: DateTime<Utc> },
    /// Per-tick state view, emitted by the driver for display.
    StateSnapshot {
        snapshot: TimerSnapshot,
        at: DateTime<Utc>,
    },
}
