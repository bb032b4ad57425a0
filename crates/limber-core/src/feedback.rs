//! Tactile/audio feedback cues.
//!
//! The engine never performs I/O itself. Control actions and phase
//! boundaries map to cues, and a [`FeedbackSink`] turns a cue into haptics,
//! sound, a terminal bell, or nothing at all. A failed cue is reported and
//! dropped - it must never reach back into timer state.

use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCue {
    /// Light tap when a countdown starts or resumes.
    SessionStart,
    /// Light tap when the countdown pauses.
    SessionPaused,
    /// Firmer tap when the timer is wound back to idle.
    Reset,
    /// Warning pattern when the switch window opens.
    SwitchWarning,
    /// Heavy tap when side two begins.
    SideSwitch,
    /// Success pattern when the stretch is done.
    Completion,
}

impl FeedbackCue {
    /// Cue for an engine event, if the event warrants one.
    pub fn for_event(event: &Event) -> Option<Self> {
        match event {
            Event::TimerStarted { .. } | Event::TimerResumed { .. } => {
                Some(FeedbackCue::SessionStart)
            }
            Event::TimerPaused { .. } => Some(FeedbackCue::SessionPaused),
            Event::TimerReset { .. } => Some(FeedbackCue::Reset),
            Event::SwitchPending { .. } => Some(FeedbackCue::SwitchWarning),
            Event::SideSwitched { .. } => Some(FeedbackCue::SideSwitch),
            Event::TimerFinished { .. } => Some(FeedbackCue::Completion),
            Event::StateSnapshot { .. } => None,
        }
    }
}

/// Every feedback backend implements this trait.
/// Implementations should be cheap and non-blocking.
pub trait FeedbackSink: Send + Sync {
    /// Unique identifier (e.g. "terminal", "null").
    fn name(&self) -> &str;

    /// Play one cue.
    fn play(&self, cue: FeedbackCue) -> Result<(), Box<dyn std::error::Error>>;
}

/// Sink that swallows every cue.
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn name(&self) -> &str {
        "null"
    }

    fn play(&self, _cue: FeedbackCue) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn every_boundary_event_has_a_distinct_cue() {
        let at = Utc::now();
        let cues = [
            FeedbackCue::for_event(&Event::SwitchPending {
                switch_seconds: 3,
                at,
            }),
            FeedbackCue::for_event(&Event::SideSwitched {
                time_remaining: 20,
                at,
            }),
            FeedbackCue::for_event(&Event::TimerFinished { at }),
        ];
        assert_eq!(
            cues,
            [
                Some(FeedbackCue::SwitchWarning),
                Some(FeedbackCue::SideSwitch),
                Some(FeedbackCue::Completion),
            ]
        );
    }

    #[test]
    fn snapshots_are_silent() {
        let snap = crate::timer::StretchTimer::new(10, crate::stretch::Sides::One).snapshot();
        let event = Event::StateSnapshot {
            snapshot: snap,
            at: Utc::now(),
        };
        assert!(FeedbackCue::for_event(&event).is_none());
    }
}
