//! # Limber Core Library
//!
//! This library provides the core logic for the Limber stretch timer. It
//! implements a CLI-first philosophy where all operations are available via
//! a standalone CLI binary, with any GUI shell being a thin layer over the
//! same core library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine advancing in whole
//!   seconds; a driver owns the one recurring per-second callback
//! - **Stretch Catalog**: Built-in exercises with filtering and uniform
//!   random selection
//! - **History**: Per-session engagement records (started, paused, resumed,
//!   completed, abandoned)
//! - **Storage**: SQLite-based history/reactions/favorites and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`StretchTimer`]: Core countdown state machine
//! - [`TimerDriver`]: Cancellable once-per-second tick task
//! - [`StretchSession`]: Glue from timer events to history and feedback
//! - [`Database`]: Engagement persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod feedback;
pub mod history;
pub mod session;
pub mod storage;
pub mod stretch;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use feedback::{FeedbackCue, FeedbackSink, NullFeedback};
pub use history::{HistoryRecorder, MemoryHistory, SessionRecord, SessionStatus};
pub use session::StretchSession;
pub use storage::{Config, Database, HistoryStats};
pub use stretch::{Filters, Reaction, Sides, Stretch, StretchKind};
pub use timer::{Phase, RunState, StretchTimer, TimerDriver, TimerSnapshot, SWITCH_SECONDS};
