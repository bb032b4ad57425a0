//! SQLite-based storage for engagement data.
//!
//! Provides persistent storage for:
//! - Stretch session history (one row per timed run)
//! - Reactions and favorites
//! - Key-value store for application state (e.g. the persisted timer)

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::history::{HistoryRecorder, SessionRecord, SessionStatus};
use crate::stretch::{Reaction, Stretch};

/// Aggregate history statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryStats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub abandoned_sessions: u64,
    pub today_sessions: u64,
    /// Sum of configured stretch time over completed sessions, in seconds.
    pub total_seconds_stretched: u64,
}

/// SQLite database for sessions, reactions and favorites.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/limber/limber.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("limber.db");
        let conn = Connection::open(&path)
            .map_err(|source| DatabaseError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS stretch_history (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                stretch_id    INTEGER NOT NULL,
                stretch_name  TEXT NOT NULL DEFAULT '',
                status        TEXT NOT NULL,
                duration_secs INTEGER NOT NULL DEFAULT 0,
                started_at    TEXT NOT NULL,
                completed_at  TEXT
            );

            CREATE TABLE IF NOT EXISTS stretch_reactions (
                stretch_id  INTEGER PRIMARY KEY,
                reaction    TEXT NOT NULL,
                reacted_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS stretch_favorites (
                stretch_id    INTEGER PRIMARY KEY,
                favorited_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_started_at ON stretch_history(started_at);
            CREATE INDEX IF NOT EXISTS idx_history_status ON stretch_history(status);",
        )?;
        Ok(())
    }

    // ── Session history ──────────────────────────────────────────────

    /// Open a new session row with status `started`.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn insert_session(&self, stretch: &Stretch) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO stretch_history (stretch_id, stretch_name, status, duration_secs, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                stretch.id,
                stretch.name,
                SessionStatus::Started.as_str(),
                stretch.total_seconds(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update a session's status; terminal statuses stamp `completed_at`.
    ///
    /// # Errors
    /// Returns an error if the update fails or the session does not exist.
    pub fn update_session_status(
        &self,
        session_id: i64,
        status: SessionStatus,
    ) -> Result<(), DatabaseError> {
        let changed = if status.is_terminal() {
            self.conn.execute(
                "UPDATE stretch_history SET status = ?1, completed_at = ?2 WHERE id = ?3",
                params![status.as_str(), Utc::now().to_rfc3339(), session_id],
            )?
        } else {
            self.conn.execute(
                "UPDATE stretch_history SET status = ?1 WHERE id = ?2",
                params![status.as_str(), session_id],
            )?
        };
        if changed == 0 {
            return Err(DatabaseError::QueryFailed(format!(
                "no session with id {session_id}"
            )));
        }
        Ok(())
    }

    /// Sessions newest first, optionally limited.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn list_sessions(&self, limit: Option<u32>) -> Result<Vec<SessionRecord>, DatabaseError> {
        let limit = limit.map(i64::from).unwrap_or(-1);
        let mut stmt = self.conn.prepare(
            "SELECT id, stretch_id, stretch_name, status, started_at, completed_at
             FROM stretch_history
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            let status_raw: String = row.get(3)?;
            let started_raw: String = row.get(4)?;
            let completed_raw: Option<String> = row.get(5)?;
            Ok(SessionRecord {
                id: row.get(0)?,
                stretch_id: row.get(1)?,
                stretch_name: row.get(2)?,
                status: status_raw.parse().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
                started_at: parse_utc(&started_raw, 4)?,
                completed_at: completed_raw.as_deref().map(|s| parse_utc(s, 5)).transpose()?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Delete all history rows, returning the count removed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn clear_history(&self) -> Result<usize, DatabaseError> {
        Ok(self.conn.execute("DELETE FROM stretch_history", [])?)
    }

    /// Aggregate statistics over the whole history table.
    ///
    /// # Errors
    /// Returns an error if a query fails.
    pub fn stats(&self) -> Result<HistoryStats, DatabaseError> {
        let mut stats = HistoryStats::default();
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM stretch_history
             GROUP BY status",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
            ))
        })?;
        for row in rows {
            let (status, count, seconds) = row?;
            stats.total_sessions += count;
            match status.as_str() {
                "completed" => {
                    stats.completed_sessions += count;
                    stats.total_seconds_stretched += seconds;
                }
                "abandoned" => stats.abandoned_sessions += count,
                _ => {}
            }
        }

        let today = Utc::now().format("%Y-%m-%d").to_string();
        stats.today_sessions = self.conn.query_row(
            "SELECT COUNT(*) FROM stretch_history WHERE started_at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
            |row| row.get(0),
        )?;
        Ok(stats)
    }

    // ── Reactions ────────────────────────────────────────────────────

    /// Set (or replace) the reaction for a stretch; `None` clears it.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn set_reaction(
        &self,
        stretch_id: i64,
        reaction: Option<Reaction>,
    ) -> Result<(), DatabaseError> {
        match reaction {
            Some(reaction) => {
                self.conn.execute(
                    "INSERT INTO stretch_reactions (stretch_id, reaction, reacted_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(stretch_id) DO UPDATE SET reaction = ?2, reacted_at = ?3",
                    params![stretch_id, reaction.as_str(), Utc::now().to_rfc3339()],
                )?;
            }
            None => {
                self.conn.execute(
                    "DELETE FROM stretch_reactions WHERE stretch_id = ?1",
                    params![stretch_id],
                )?;
            }
        }
        Ok(())
    }

    /// The reaction recorded for a stretch, if any.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn reaction(&self, stretch_id: i64) -> Result<Option<Reaction>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT reaction FROM stretch_reactions WHERE stretch_id = ?1")?;
        let mut rows = stmt.query_map(params![stretch_id], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(raw) => Ok(raw?.parse().ok()),
            None => Ok(None),
        }
    }

    /// Stretch ids carrying a given reaction.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn stretches_by_reaction(&self, reaction: Reaction) -> Result<Vec<i64>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT stretch_id FROM stretch_reactions WHERE reaction = ?1 ORDER BY stretch_id",
        )?;
        let rows = stmt.query_map(params![reaction.as_str()], |row| row.get(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // ── Favorites ────────────────────────────────────────────────────

    /// Mark a stretch as a favorite (idempotent).
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn add_favorite(&self, stretch_id: i64) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO stretch_favorites (stretch_id, favorited_at) VALUES (?1, ?2)",
            params![stretch_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove a favorite; true if a row was deleted.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn remove_favorite(&self, stretch_id: i64) -> Result<bool, DatabaseError> {
        let changed = self.conn.execute(
            "DELETE FROM stretch_favorites WHERE stretch_id = ?1",
            params![stretch_id],
        )?;
        Ok(changed > 0)
    }

    /// All favorite stretch ids.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn favorites(&self) -> Result<Vec<i64>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT stretch_id FROM stretch_favorites ORDER BY stretch_id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // ── Key-value store ──────────────────────────────────────────────

    /// # Errors
    /// Returns an error if the query fails.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(value) => Ok(Some(value?)),
            None => Ok(None),
        }
    }

    /// # Errors
    /// Returns an error if the write fails.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns an error if the delete fails.
    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn parse_utc(raw: &str, column: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl HistoryRecorder for Database {
    fn start_session(&mut self, stretch: &Stretch) -> Result<i64, CoreError> {
        Ok(self.insert_session(stretch)?)
    }

    fn update_status(&mut self, session_id: i64, status: SessionStatus) -> Result<(), CoreError> {
        Ok(self.update_session_status(session_id, status)?)
    }

    fn sessions(&self) -> Result<Vec<SessionRecord>, CoreError> {
        Ok(self.list_sessions(None)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stretch::builtin;

    #[test]
    fn session_lifecycle_roundtrip() {
        let db = Database::open_memory().unwrap();
        let catalog = builtin();

        let id = db.insert_session(&catalog[0]).unwrap();
        db.update_session_status(id, SessionStatus::Paused).unwrap();
        db.update_session_status(id, SessionStatus::Completed)
            .unwrap();

        let sessions = db.list_sessions(None).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, id);
        assert_eq!(sessions[0].status, SessionStatus::Completed);
        assert!(sessions[0].completed_at.is_some());
    }

    #[test]
    fn update_missing_session_fails() {
        let db = Database::open_memory().unwrap();
        assert!(db
            .update_session_status(999, SessionStatus::Paused)
            .is_err());
    }

    #[test]
    fn list_sessions_newest_first_with_limit() {
        let db = Database::open_memory().unwrap();
        let catalog = builtin();
        for stretch in catalog.iter().take(3) {
            db.insert_session(stretch).unwrap();
        }
        let sessions = db.list_sessions(Some(2)).unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].id > sessions[1].id);
    }

    #[test]
    fn stats_count_completed_and_abandoned() {
        let db = Database::open_memory().unwrap();
        let catalog = builtin();

        let a = db.insert_session(&catalog[0]).unwrap();
        db.update_session_status(a, SessionStatus::Completed)
            .unwrap();
        let b = db.insert_session(&catalog[1]).unwrap();
        db.update_session_status(b, SessionStatus::Abandoned)
            .unwrap();
        db.insert_session(&catalog[2]).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.completed_sessions, 1);
        assert_eq!(stats.abandoned_sessions, 1);
        assert_eq!(stats.today_sessions, 3);
        assert_eq!(stats.total_seconds_stretched, catalog[0].total_seconds());
    }

    #[test]
    fn reaction_upsert_and_clear() {
        let db = Database::open_memory().unwrap();
        db.set_reaction(4, Some(Reaction::Like)).unwrap();
        db.set_reaction(4, Some(Reaction::Love)).unwrap();
        assert_eq!(db.reaction(4).unwrap(), Some(Reaction::Love));
        assert_eq!(db.stretches_by_reaction(Reaction::Love).unwrap(), vec![4]);

        db.set_reaction(4, None).unwrap();
        assert_eq!(db.reaction(4).unwrap(), None);
    }

    #[test]
    fn favorites_are_idempotent() {
        let db = Database::open_memory().unwrap();
        db.add_favorite(7).unwrap();
        db.add_favorite(7).unwrap();
        assert_eq!(db.favorites().unwrap(), vec![7]);
        assert!(db.remove_favorite(7).unwrap());
        assert!(!db.remove_favorite(7).unwrap());
        assert!(db.favorites().unwrap().is_empty());
    }

    #[test]
    fn kv_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.kv_get("timer").unwrap(), None);
        db.kv_set("timer", "{}").unwrap();
        db.kv_set("timer", "{\"state\":\"idle\"}").unwrap();
        assert_eq!(db.kv_get("timer").unwrap().as_deref(), Some("{\"state\":\"idle\"}"));
        db.kv_delete("timer").unwrap();
        assert_eq!(db.kv_get("timer").unwrap(), None);
    }
}
