//! Stretch timer engine implementation.
//!
//! The engine is a tick-driven state machine over whole seconds. It does not
//! use internal threads or wall-clock time - the caller (normally a
//! [`TimerDriver`](super::TimerDriver)) is responsible for calling `tick()`
//! once per second while the timer is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Finished) -> Running
//! ```
//!
//! A two-sided stretch additionally walks the phase sequence
//! `Side1 -> Switching -> Side2` while running; a one-sided stretch stays in
//! `Side1` for its whole life.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = StretchTimer::new(30, Sides::Two);
//! timer.start();
//! // Once per second:
//! timer.tick(); // Returns Some(Event) on each phase boundary
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::stretch::{Sides, Stretch};

/// Length of the fixed transition window between sides, in seconds.
pub const SWITCH_SECONDS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Which leg of the stretch is currently counting down.
///
/// `Switching` and `Side2` are only reachable for two-sided stretches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Side1,
    Switching,
    Side2,
}

/// Derived view of the timer, rebuilt after every tick or control call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub time_remaining: u64,
    pub run_state: RunState,
    pub phase: Phase,
    pub current_side: u8,
    pub total_sides: u8,
    /// Fraction of total configured time already elapsed, in `[0, 1]`.
    pub progress: f64,
}

/// Core stretch countdown state machine.
///
/// Holds whole-second state for one stretch: a duration per side, a side
/// count, and the countdown position. All mutation happens through `start`,
/// `pause`, `reset` and the per-second `tick`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StretchTimer {
    seconds_per_side: u64,
    sides: Sides,
    state: RunState,
    phase: Phase,
    /// Seconds left in the current phase.
    remaining: u64,
}

impl StretchTimer {
    /// Create a new timer in the `Idle` state, side one ready.
    ///
    /// A zero `seconds_per_side` is a valid degenerate phase: the timer sits
    /// at 0 remaining and crosses its first boundary on the first tick after
    /// `start()`.
    pub fn new(seconds_per_side: u64, sides: Sides) -> Self {
        Self {
            seconds_per_side,
            sides,
            state: RunState::Idle,
            phase: Phase::Side1,
            remaining: seconds_per_side,
        }
    }

    /// Timer for a catalog stretch.
    pub fn for_stretch(stretch: &Stretch) -> Self {
        Self::new(stretch.seconds_per_side, stretch.sides)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_remaining(&self) -> u64 {
        self.remaining
    }

    pub fn seconds_per_side(&self) -> u64 {
        self.seconds_per_side
    }

    pub fn sides(&self) -> Sides {
        self.sides
    }

    /// 1 while side one or the switch window is active, 2 on side two.
    pub fn current_side(&self) -> u8 {
        if self.phase == Phase::Side2 {
            2
        } else {
            1
        }
    }

    /// Configured time across every phase, including the switch window.
    pub fn total_seconds(&self) -> u64 {
        match self.sides {
            Sides::Two => self
                .seconds_per_side
                .saturating_mul(2)
                .saturating_add(SWITCH_SECONDS),
            Sides::One => self.seconds_per_side,
        }
    }

    /// Whole seconds elapsed across all phases so far.
    fn elapsed_seconds(&self) -> u64 {
        match self.phase {
            Phase::Side1 => self.seconds_per_side - self.remaining,
            Phase::Switching => self
                .seconds_per_side
                .saturating_add(SWITCH_SECONDS - self.remaining),
            Phase::Side2 => self
                .seconds_per_side
                .saturating_add(SWITCH_SECONDS)
                .saturating_add(self.seconds_per_side - self.remaining),
        }
    }

    /// 0.0 .. 1.0 progress across the whole stretch.
    ///
    /// 0.0 for a freshly reset timer and exactly 1.0 once finished. A
    /// zero-length stretch reports 0.0 throughout.
    pub fn progress(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 0.0;
        }
        self.elapsed_seconds() as f64 / total as f64
    }

    /// Build a full state snapshot.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            time_remaining: self.remaining,
            run_state: self.state,
            phase: self.phase,
            current_side: self.current_side(),
            total_sides: self.sides.count(),
            progress: self.progress(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume the countdown. Safe from any state.
    ///
    /// Starting a finished timer rewinds to side one first, so the run is
    /// identical to `reset()` followed by `start()`. Calling while already
    /// running is a no-op.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            RunState::Idle | RunState::Finished => {
                if self.state == RunState::Finished {
                    self.phase = Phase::Side1;
                    self.remaining = self.seconds_per_side;
                }
                self.state = RunState::Running;
                Some(Event::TimerStarted {
                    seconds_per_side: self.seconds_per_side,
                    sides: self.sides.count(),
                    at: Utc::now(),
                })
            }
            RunState::Paused => {
                self.state = RunState::Running;
                Some(Event::TimerResumed {
                    time_remaining: self.remaining,
                    at: Utc::now(),
                })
            }
            RunState::Running => None, // Already running.
        }
    }

    /// Stop the countdown without losing position.
    ///
    /// `remaining` and `phase` are preserved exactly, so a later `start()`
    /// resumes from the same second. No-op outside `Running`.
    pub fn pause(&mut self) -> Option<Event> {
        if self.state != RunState::Running {
            return None;
        }
        self.state = RunState::Paused;
        Some(Event::TimerPaused {
            time_remaining: self.remaining,
            at: Utc::now(),
        })
    }

    /// Wind back to `Idle` at side one with a full phase. Safe from any state.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = RunState::Idle;
        self.phase = Phase::Side1;
        self.remaining = self.seconds_per_side;
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Advance the countdown by one second.
    ///
    /// Ignored unless running. The boundary check happens *before* the
    /// decrement: a phase with one (or zero) seconds left transitions on this
    /// tick instead of producing a dangling zero, so `remaining` never goes
    /// negative and the state change is atomic with the clamp.
    ///
    /// Returns `Some(Event)` on each phase boundary.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != RunState::Running {
            return None;
        }
        if self.remaining <= 1 {
            return Some(self.cross_boundary());
        }
        self.remaining -= 1;
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The current phase is exhausted: enter the next one, or finish.
    fn cross_boundary(&mut self) -> Event {
        match (self.phase, self.sides) {
            (Phase::Side1, Sides::Two) => {
                self.phase = Phase::Switching;
                self.remaining = SWITCH_SECONDS;
                Event::SwitchPending {
                    switch_seconds: SWITCH_SECONDS,
                    at: Utc::now(),
                }
            }
            (Phase::Switching, _) => {
                self.phase = Phase::Side2;
                self.remaining = self.seconds_per_side;
                Event::SideSwitched {
                    time_remaining: self.remaining,
                    at: Utc::now(),
                }
            }
            // Side1 with a single side, or Side2: the run is done.
            _ => {
                self.state = RunState::Finished;
                self.remaining = 0;
                Event::TimerFinished { at: Utc::now() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_n(timer: &mut StretchTimer, n: u64) -> Vec<Event> {
        (0..n).filter_map(|_| timer.tick()).collect()
    }

    #[test]
    fn starts_idle_with_full_side() {
        let timer = StretchTimer::new(30, Sides::One);
        assert_eq!(timer.state(), RunState::Idle);
        assert_eq!(timer.phase(), Phase::Side1);
        assert_eq!(timer.time_remaining(), 30);
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn start_pause_resume_preserves_position() {
        let mut timer = StretchTimer::new(10, Sides::One);
        assert!(timer.start().is_some());
        assert_eq!(timer.state(), RunState::Running);

        tick_n(&mut timer, 4);
        assert_eq!(timer.time_remaining(), 6);

        assert!(timer.pause().is_some());
        assert_eq!(timer.state(), RunState::Paused);
        assert_eq!(timer.time_remaining(), 6);

        // Ticks while paused change nothing.
        tick_n(&mut timer, 5);
        assert_eq!(timer.time_remaining(), 6);
        assert_eq!(timer.phase(), Phase::Side1);

        assert!(timer.start().is_some());
        assert_eq!(timer.state(), RunState::Running);
        let events = tick_n(&mut timer, 6);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::TimerFinished { .. }));
        assert_eq!(timer.state(), RunState::Finished);
    }

    #[test]
    fn start_while_running_is_idempotent() {
        let mut timer = StretchTimer::new(10, Sides::One);
        timer.start();
        tick_n(&mut timer, 3);
        assert!(timer.start().is_none());
        assert_eq!(timer.state(), RunState::Running);
        assert_eq!(timer.time_remaining(), 7);
    }

    #[test]
    fn single_side_finishes_after_exact_ticks() {
        let mut timer = StretchTimer::new(30, Sides::One);
        timer.start();
        let events = tick_n(&mut timer, 30);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::TimerFinished { .. }));
        assert_eq!(timer.state(), RunState::Finished);
        assert_eq!(timer.phase(), Phase::Side1);
        assert_eq!(timer.time_remaining(), 0);
        assert_eq!(timer.progress(), 1.0);
    }

    #[test]
    fn two_sided_run_walks_all_phases() {
        let mut timer = StretchTimer::new(20, Sides::Two);
        assert_eq!(timer.total_seconds(), 43);
        timer.start();

        let events = tick_n(&mut timer, 20);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::SwitchPending { .. }));
        assert_eq!(timer.state(), RunState::Running);
        assert_eq!(timer.phase(), Phase::Switching);
        assert_eq!(timer.time_remaining(), SWITCH_SECONDS);
        assert_eq!(timer.current_side(), 1);

        let events = tick_n(&mut timer, 3);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::SideSwitched { .. }));
        assert_eq!(timer.phase(), Phase::Side2);
        assert_eq!(timer.time_remaining(), 20);
        assert_eq!(timer.current_side(), 2);

        let events = tick_n(&mut timer, 20);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::TimerFinished { .. }));
        assert_eq!(timer.state(), RunState::Finished);
        assert_eq!(timer.phase(), Phase::Side2);
        assert_eq!(timer.time_remaining(), 0);
        assert_eq!(timer.current_side(), 2);
        assert_eq!(timer.progress(), 1.0);
    }

    #[test]
    fn progress_tracks_phase_boundaries() {
        let mut timer = StretchTimer::new(20, Sides::Two);
        timer.start();
        tick_n(&mut timer, 20);
        // Side one done, switch window untouched: 20 of 43 seconds elapsed.
        assert!((timer.progress() - 20.0 / 43.0).abs() < 1e-9);
        tick_n(&mut timer, 3);
        assert!((timer.progress() - 23.0 / 43.0).abs() < 1e-9);
    }

    #[test]
    fn restart_after_finish_begins_fresh_run() {
        let mut timer = StretchTimer::new(5, Sides::Two);
        timer.start();
        tick_n(&mut timer, 13);
        assert_eq!(timer.state(), RunState::Finished);

        let event = timer.start();
        assert!(matches!(event, Some(Event::TimerStarted { .. })));
        assert_eq!(timer.state(), RunState::Running);
        assert_eq!(timer.phase(), Phase::Side1);
        assert_eq!(timer.time_remaining(), 5);
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn reset_from_any_state_goes_idle() {
        let mut timer = StretchTimer::new(20, Sides::Two);
        timer.start();
        tick_n(&mut timer, 22); // Mid switch window.
        assert_eq!(timer.phase(), Phase::Switching);

        timer.reset();
        assert_eq!(timer.state(), RunState::Idle);
        assert_eq!(timer.phase(), Phase::Side1);
        assert_eq!(timer.time_remaining(), 20);
        assert_eq!(timer.progress(), 0.0);

        // Also safe while idle and after finish.
        timer.reset();
        assert_eq!(timer.state(), RunState::Idle);
        timer.start();
        tick_n(&mut timer, 43);
        assert_eq!(timer.state(), RunState::Finished);
        timer.reset();
        assert_eq!(timer.state(), RunState::Idle);
        assert_eq!(timer.time_remaining(), 20);
    }

    #[test]
    fn pause_outside_running_is_noop() {
        let mut timer = StretchTimer::new(10, Sides::One);
        assert!(timer.pause().is_none());
        assert_eq!(timer.state(), RunState::Idle);

        timer.start();
        tick_n(&mut timer, 10);
        assert!(timer.pause().is_none());
        assert_eq!(timer.state(), RunState::Finished);
        assert_eq!(timer.time_remaining(), 0);
    }

    #[test]
    fn zero_length_side_completes_on_first_tick() {
        let mut timer = StretchTimer::new(0, Sides::One);
        assert_eq!(timer.time_remaining(), 0);
        assert_eq!(timer.state(), RunState::Idle);
        assert_eq!(timer.progress(), 0.0);

        timer.start();
        let event = timer.tick();
        assert!(matches!(event, Some(Event::TimerFinished { .. })));
        assert_eq!(timer.state(), RunState::Finished);
    }

    #[test]
    fn zero_length_sides_still_walk_the_switch_window() {
        let mut timer = StretchTimer::new(0, Sides::Two);
        timer.start();
        assert!(matches!(timer.tick(), Some(Event::SwitchPending { .. })));
        assert_eq!(timer.time_remaining(), SWITCH_SECONDS);
        tick_n(&mut timer, 2);
        assert!(matches!(timer.tick(), Some(Event::SideSwitched { .. })));
        assert!(matches!(timer.tick(), Some(Event::TimerFinished { .. })));
    }

    #[test]
    fn snapshot_mirrors_engine_state() {
        let mut timer = StretchTimer::new(20, Sides::Two);
        timer.start();
        tick_n(&mut timer, 21);

        let snap = timer.snapshot();
        assert_eq!(snap.run_state, RunState::Running);
        assert_eq!(snap.phase, Phase::Switching);
        assert_eq!(snap.time_remaining, 2);
        assert_eq!(snap.current_side, 1);
        assert_eq!(snap.total_sides, 2);
        assert!(snap.progress > 0.0 && snap.progress < 1.0);
    }

    #[test]
    fn serde_roundtrip_preserves_position() {
        let mut timer = StretchTimer::new(20, Sides::Two);
        timer.start();
        tick_n(&mut timer, 7);
        timer.pause();

        let json = serde_json::to_string(&timer).unwrap();
        let mut restored: StretchTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), RunState::Paused);
        assert_eq!(restored.time_remaining(), 13);

        restored.start();
        assert_eq!(restored.state(), RunState::Running);
        assert_eq!(restored.time_remaining(), 13);
    }
}
