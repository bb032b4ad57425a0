//! Tick scheduling for the stretch timer.
//!
//! The engine itself never sleeps; this driver owns the one recurring
//! one-second callback that advances it. The tick task exists only while the
//! engine is running: pausing, resetting, finishing, swapping in a new timer
//! or dropping the driver all cancel it, so a single driver can never have
//! two tick tasks alive at once and a discarded timer can never keep
//! ticking in the background.
//!
//! Every state change - from control calls and from ticks alike - is
//! published on an unbounded event channel handed out at construction, plus
//! one `StateSnapshot` per tick for display purposes.
//!
//! Must be used from within a Tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::engine::{RunState, StretchTimer, TimerSnapshot};
use crate::events::Event;

/// Period of the recurring tick callback.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Owns a [`StretchTimer`] and the periodic task that ticks it.
pub struct TimerDriver {
    timer: Arc<Mutex<StretchTimer>>,
    events: mpsc::UnboundedSender<Event>,
    tick_task: Option<JoinHandle<()>>,
}

impl TimerDriver {
    /// Wrap a timer and return the driver plus the event stream.
    pub fn new(timer: StretchTimer) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            timer: Arc::new(Mutex::new(timer)),
            events: tx,
            tick_task: None,
        };
        (driver, rx)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> TimerSnapshot {
        self.lock().snapshot()
    }

    /// Clone of the current engine state, e.g. for persistence.
    pub fn timer_state(&self) -> StretchTimer {
        self.lock().clone()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume the countdown and ensure the tick task is alive.
    pub fn start(&mut self) {
        let event = self.lock().start();
        if let Some(event) = event {
            let _ = self.events.send(event);
        }
        let running = self.lock().state() == RunState::Running;
        if running {
            self.spawn_tick_task();
        }
    }

    /// Pause the countdown and cancel the tick task.
    pub fn pause(&mut self) {
        self.cancel_tick_task();
        let event = self.lock().pause();
        if let Some(event) = event {
            let _ = self.events.send(event);
        }
    }

    /// Reset the countdown and cancel the tick task.
    pub fn reset(&mut self) {
        self.cancel_tick_task();
        let event = self.lock().reset();
        if let Some(event) = event {
            let _ = self.events.send(event);
        }
    }

    /// Replace the engine with a fresh one (a new stretch was selected).
    ///
    /// Any in-flight countdown is discarded along with its tick task; the
    /// new timer starts out idle at a full first side.
    pub fn swap(&mut self, timer: StretchTimer) {
        self.cancel_tick_task();
        *self.lock() = timer;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, StretchTimer> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_tick_task(&mut self) {
        if self.tick_task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }
        let timer = Arc::clone(&self.timer);
        let tx = self.events.clone();
        self.tick_task = Some(tokio::spawn(async move {
            let mut interval = time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; skip it so the
            // engine advances one full second after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                let (event, snapshot) = {
                    let mut timer = timer.lock().unwrap_or_else(PoisonError::into_inner);
                    (timer.tick(), timer.snapshot())
                };
                let finished = snapshot.run_state == RunState::Finished;
                if let Some(event) = event {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                let _ = tx.send(Event::StateSnapshot {
                    snapshot,
                    at: Utc::now(),
                });
                if finished {
                    break;
                }
            }
        }));
    }

    fn cancel_tick_task(&mut self) {
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.cancel_tick_task();
    }
}
