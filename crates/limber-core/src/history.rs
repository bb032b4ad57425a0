//! Session history bookkeeping.
//!
//! Each timed run of a stretch is one session row, opened when the countdown
//! first starts and walked through status updates as the timer changes
//! state. Recording is a collaborator concern: a failed write never touches
//! timer state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::stretch::Stretch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Started,
    Paused,
    Resumed,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Started => "started",
            SessionStatus::Paused => "paused",
            SessionStatus::Resumed => "resumed",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }

    /// Terminal statuses close the session and stamp `completed_at`.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Abandoned)
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(SessionStatus::Started),
            "paused" => Ok(SessionStatus::Paused),
            "resumed" => Ok(SessionStatus::Resumed),
            "completed" => Ok(SessionStatus::Completed),
            "abandoned" => Ok(SessionStatus::Abandoned),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("unknown session status '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub stretch_id: i64,
    pub stretch_name: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Session bookkeeping backend.
pub trait HistoryRecorder {
    /// Open a new session row for a stretch, returning its id.
    fn start_session(&mut self, stretch: &Stretch) -> Result<i64, CoreError>;

    /// Update the status of an open session. Terminal statuses also stamp
    /// `completed_at`.
    fn update_status(&mut self, session_id: i64, status: SessionStatus) -> Result<(), CoreError>;

    /// All sessions, newest first.
    fn sessions(&self) -> Result<Vec<SessionRecord>, CoreError>;
}

/// In-memory recorder for tests and embedders without storage.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    next_id: i64,
    records: Vec<SessionRecord>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows oldest first. Each session keeps only its latest status.
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }
}

impl HistoryRecorder for MemoryHistory {
    fn start_session(&mut self, stretch: &Stretch) -> Result<i64, CoreError> {
        self.next_id += 1;
        self.records.push(SessionRecord {
            id: self.next_id,
            stretch_id: stretch.id,
            stretch_name: stretch.name.clone(),
            status: SessionStatus::Started,
            started_at: Utc::now(),
            completed_at: None,
        });
        Ok(self.next_id)
    }

    fn update_status(&mut self, session_id: i64, status: SessionStatus) -> Result<(), CoreError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == session_id)
            .ok_or_else(|| CoreError::Custom(format!("no session with id {session_id}")))?;
        record.status = status;
        if status.is_terminal() {
            record.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    fn sessions(&self) -> Result<Vec<SessionRecord>, CoreError> {
        let mut out = self.records.clone();
        out.reverse();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stretch::builtin;

    #[test]
    fn memory_history_tracks_status_and_completion() {
        let catalog = builtin();
        let mut history = MemoryHistory::new();

        let id = history.start_session(&catalog[0]).unwrap();
        history.update_status(id, SessionStatus::Paused).unwrap();
        history.update_status(id, SessionStatus::Completed).unwrap();

        let sessions = history.sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].status, SessionStatus::Completed);
        assert!(sessions[0].completed_at.is_some());
    }

    #[test]
    fn update_unknown_session_is_an_error() {
        let mut history = MemoryHistory::new();
        assert!(history.update_status(42, SessionStatus::Paused).is_err());
    }

    #[test]
    fn status_string_roundtrip() {
        for status in [
            SessionStatus::Started,
            SessionStatus::Paused,
            SessionStatus::Resumed,
            SessionStatus::Completed,
            SessionStatus::Abandoned,
        ] {
            assert_eq!(status.as_str().parse::<SessionStatus>().unwrap(), status);
        }
    }
}
