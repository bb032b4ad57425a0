//! Hosting-session glue.
//!
//! Wires the timer driver's event stream to session-history bookkeeping and
//! feedback cues, the way a screen hosting the timer would. Collaborator
//! failures (a history write, a cue) are reported to stderr and dropped;
//! timer state transitions proceed regardless.

use tokio::sync::mpsc;

use crate::events::Event;
use crate::feedback::{FeedbackCue, FeedbackSink};
use crate::history::{HistoryRecorder, SessionStatus};
use crate::stretch::Stretch;
use crate::timer::{StretchTimer, TimerDriver, TimerSnapshot};

/// One stretch being timed, with history and feedback collaborators.
///
/// Must be used from within a Tokio runtime (it owns a [`TimerDriver`]).
pub struct StretchSession<H: HistoryRecorder> {
    driver: TimerDriver,
    events: mpsc::UnboundedReceiver<Event>,
    stretch: Stretch,
    history: H,
    feedback: Box<dyn FeedbackSink>,
    open_session: Option<i64>,
}

impl<H: HistoryRecorder> StretchSession<H> {
    /// Fresh session for a stretch: timer idle at a full first side.
    pub fn new(stretch: Stretch, history: H, feedback: Box<dyn FeedbackSink>) -> Self {
        let (driver, events) = TimerDriver::new(StretchTimer::for_stretch(&stretch));
        Self {
            driver,
            events,
            stretch,
            history,
            feedback,
            open_session: None,
        }
    }

    /// Pick up a previously persisted timer position and open session id.
    pub fn resume(
        stretch: Stretch,
        timer: StretchTimer,
        open_session: Option<i64>,
        history: H,
        feedback: Box<dyn FeedbackSink>,
    ) -> Self {
        let (driver, events) = TimerDriver::new(timer);
        Self {
            driver,
            events,
            stretch,
            history,
            feedback,
            open_session,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stretch(&self) -> &Stretch {
        &self.stretch
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.driver.snapshot()
    }

    /// Clone of the engine, e.g. for persistence between runs.
    pub fn timer_state(&self) -> StretchTimer {
        self.driver.timer_state()
    }

    pub fn open_session(&self) -> Option<i64> {
        self.open_session
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Switch to a new stretch, discarding any in-flight countdown.
    ///
    /// An open session for the previous stretch is abandoned; the new timer
    /// initializes idle at side one with a full phase.
    pub fn select_stretch(&mut self, stretch: Stretch) {
        self.close_open_session(SessionStatus::Abandoned);
        self.driver.swap(StretchTimer::for_stretch(&stretch));
        self.stretch = stretch;
    }

    pub fn start(&mut self) {
        self.driver.start();
        self.drain_events();
    }

    pub fn pause(&mut self) {
        self.driver.pause();
        self.drain_events();
    }

    pub fn reset(&mut self) {
        self.driver.reset();
        self.drain_events();
    }

    /// Next event from the driver, with bookkeeping already applied.
    ///
    /// Resolves once per tick while running (a `StateSnapshot` at minimum)
    /// and whenever a control call produced an event that `start`/`pause`/
    /// `reset` did not already drain.
    pub async fn next_event(&mut self) -> Option<Event> {
        let event = self.events.recv().await?;
        self.apply(&event);
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply already-queued events (control calls emit synchronously).
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply(&event);
        }
    }

    fn apply(&mut self, event: &Event) {
        match event {
            Event::TimerStarted { .. } => {
                if self.open_session.is_none() {
                    match self.history.start_session(&self.stretch) {
                        Ok(id) => self.open_session = Some(id),
                        Err(e) => eprintln!("history: failed to open session: {e}"),
                    }
                }
            }
            Event::TimerResumed { .. } => self.record_status(SessionStatus::Resumed),
            Event::TimerPaused { .. } => self.record_status(SessionStatus::Paused),
            Event::TimerFinished { .. } => self.close_open_session(SessionStatus::Completed),
            // Reset discards the countdown position but leaves the session
            // row open; the next start continues the same session.
            Event::TimerReset { .. } => {}
            Event::SwitchPending { .. } | Event::SideSwitched { .. } => {}
            Event::StateSnapshot { .. } => return,
        }
        if let Some(cue) = FeedbackCue::for_event(event) {
            if let Err(e) = self.feedback.play(cue) {
                eprintln!("feedback: cue failed on '{}': {e}", self.feedback.name());
            }
        }
    }

    fn record_status(&mut self, status: SessionStatus) {
        if let Some(id) = self.open_session {
            if let Err(e) = self.history.update_status(id, status) {
                eprintln!("history: failed to record '{}': {e}", status.as_str());
            }
        }
    }

    fn close_open_session(&mut self, status: SessionStatus) {
        if let Some(id) = self.open_session.take() {
            if let Err(e) = self.history.update_status(id, status) {
                eprintln!("history: failed to close session: {e}");
            }
        }
    }
}
