//! Terminal feedback sink.
//!
//! The closest a terminal gets to haptics: the bell character. Phase
//! boundaries ring once, completion rings twice; control cues stay silent.

use std::io::Write;

use limber_core::{Config, FeedbackCue, FeedbackSink};

pub struct TerminalFeedback {
    enabled: bool,
}

impl TerminalFeedback {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.feedback.enabled && config.feedback.sound,
        }
    }
}

impl FeedbackSink for TerminalFeedback {
    fn name(&self) -> &str {
        "terminal"
    }

    fn play(&self, cue: FeedbackCue) -> Result<(), Box<dyn std::error::Error>> {
        if !self.enabled {
            return Ok(());
        }
        let bells = match cue {
            FeedbackCue::SwitchWarning | FeedbackCue::SideSwitch => 1,
            FeedbackCue::Completion => 2,
            _ => 0,
        };
        if bells > 0 {
            let mut out = std::io::stdout();
            out.write_all("\u{7}".repeat(bells).as_bytes())?;
            out.flush()?;
        }
        Ok(())
    }
}
