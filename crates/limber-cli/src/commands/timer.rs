use clap::Subcommand;
use limber_core::storage::Database;
use limber_core::stretch::{self, Sides, Stretch};
use limber_core::{
    Config, Event, FeedbackCue, FeedbackSink, Phase, RunState, SessionStatus, StretchTimer,
    TimerDriver, TimerSnapshot,
};

use crate::feedback::TerminalFeedback;

const TIMER_KEY: &str = "stretch_timer";
const STRETCH_KEY: &str = "active_stretch";
const SESSION_KEY: &str = "open_session";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Select a stretch (or an ad-hoc duration) and start the countdown
    Start {
        /// Stretch id from the catalog
        #[arg(long, conflicts_with = "seconds")]
        stretch: Option<i64>,
        /// Ad-hoc duration for one side, in seconds
        #[arg(long)]
        seconds: Option<u64>,
        /// Number of sides for an ad-hoc duration (1 or 2)
        #[arg(long, default_value_t = 1)]
        sides: u8,
    },
    /// Pause the countdown, keeping its position
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Wind back to idle at a full first side
    Reset,
    /// Print the current timer state as JSON
    Status,
    /// Advance the countdown by one second (for scripting)
    Tick,
    /// Run the countdown live, one line per second, until it finishes
    Watch,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let feedback = TerminalFeedback::from_config(&Config::load_or_default());

    match action {
        TimerAction::Start {
            stretch,
            seconds,
            sides,
        } => {
            let selection = match (stretch, seconds) {
                (Some(id), _) => Some(find_stretch(id)?),
                (None, Some(seconds)) => Some(ad_hoc_stretch(seconds, sides)?),
                (None, None) => None,
            };
            let mut timer = match selection {
                Some(stretch) => {
                    abandon_open_session(&db);
                    save_stretch(&db, &stretch)?;
                    StretchTimer::for_stretch(&stretch)
                }
                None => require_timer(&db)?,
            };
            let event = timer.start();
            println!("{}", serde_json::to_string_pretty(&timer.snapshot())?);
            if let Some(event) = event {
                handle_event(&db, &feedback, &event);
            }
            save_timer(&db, &timer)?;
        }
        TimerAction::Pause => {
            let mut timer = require_timer(&db)?;
            let event = timer.pause();
            println!("{}", serde_json::to_string_pretty(&timer.snapshot())?);
            if let Some(event) = event {
                handle_event(&db, &feedback, &event);
            }
            save_timer(&db, &timer)?;
        }
        TimerAction::Resume => {
            let mut timer = require_timer(&db)?;
            let event = timer.start();
            println!("{}", serde_json::to_string_pretty(&timer.snapshot())?);
            if let Some(event) = event {
                handle_event(&db, &feedback, &event);
            }
            save_timer(&db, &timer)?;
        }
        TimerAction::Reset => {
            let mut timer = require_timer(&db)?;
            let event = timer.reset();
            println!("{}", serde_json::to_string_pretty(&timer.snapshot())?);
            if let Some(event) = event {
                handle_event(&db, &feedback, &event);
            }
            save_timer(&db, &timer)?;
        }
        TimerAction::Status => {
            let timer = require_timer(&db)?;
            println!("{}", serde_json::to_string_pretty(&timer.snapshot())?);
        }
        TimerAction::Tick => {
            let mut timer = require_timer(&db)?;
            let event = timer.tick();
            if let Some(event) = event {
                println!("{}", serde_json::to_string_pretty(&event)?);
                handle_event(&db, &feedback, &event);
            }
            println!("{}", serde_json::to_string_pretty(&timer.snapshot())?);
            save_timer(&db, &timer)?;
        }
        TimerAction::Watch => {
            let timer = require_timer(&db)?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(watch(&db, &feedback, timer))?;
        }
    }

    Ok(())
}

/// Live countdown: the driver owns the per-second tick task; we render each
/// snapshot and feed every other event into history/feedback.
async fn watch(
    db: &Database,
    feedback: &TerminalFeedback,
    timer: StretchTimer,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut driver, mut events) = TimerDriver::new(timer);
    driver.start();
    println!("{}", render_snapshot(&driver.snapshot()));

    while let Some(event) = events.recv().await {
        match &event {
            Event::StateSnapshot { snapshot, .. } => {
                println!("{}", render_snapshot(snapshot));
                if snapshot.run_state == RunState::Finished {
                    break;
                }
            }
            other => handle_event(db, feedback, other),
        }
    }

    save_timer(db, &driver.timer_state())?;
    Ok(())
}

// ── Persistence helpers ──────────────────────────────────────────────

fn load_timer(db: &Database) -> Option<StretchTimer> {
    let json = db.kv_get(TIMER_KEY).ok()??;
    serde_json::from_str(&json).ok()
}

fn require_timer(db: &Database) -> Result<StretchTimer, Box<dyn std::error::Error>> {
    load_timer(db).ok_or_else(|| "no active timer; run `limber-cli timer start` first".into())
}

fn save_timer(db: &Database, timer: &StretchTimer) -> Result<(), Box<dyn std::error::Error>> {
    db.kv_set(TIMER_KEY, &serde_json::to_string(timer)?)?;
    Ok(())
}

fn load_stretch(db: &Database) -> Option<Stretch> {
    let json = db.kv_get(STRETCH_KEY).ok()??;
    serde_json::from_str(&json).ok()
}

fn save_stretch(db: &Database, stretch: &Stretch) -> Result<(), Box<dyn std::error::Error>> {
    db.kv_set(STRETCH_KEY, &serde_json::to_string(stretch)?)?;
    Ok(())
}

fn open_session(db: &Database) -> Option<i64> {
    db.kv_get(SESSION_KEY).ok()??.parse().ok()
}

fn set_open_session(db: &Database, id: Option<i64>) {
    let result = match id {
        Some(id) => db.kv_set(SESSION_KEY, &id.to_string()),
        None => db.kv_delete(SESSION_KEY),
    };
    if let Err(e) = result {
        eprintln!("history: failed to track open session: {e}");
    }
}

// ── Stretch selection ────────────────────────────────────────────────

fn find_stretch(id: i64) -> Result<Stretch, Box<dyn std::error::Error>> {
    stretch::builtin()
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| format!("no stretch with id {id}").into())
}

fn ad_hoc_stretch(seconds: u64, sides: u8) -> Result<Stretch, Box<dyn std::error::Error>> {
    Ok(Stretch {
        id: 0,
        name: "Ad-hoc stretch".into(),
        muscle_groups: Vec::new(),
        seconds_per_side: seconds,
        sides: Sides::try_from(sides)?,
        dynamic: false,
        description: String::new(),
    })
}

// ── Event side effects ───────────────────────────────────────────────

/// Session-history bookkeeping and feedback for one timer event.
/// Failures here are reported and dropped; the timer state is already saved
/// or about to be, regardless.
fn handle_event(db: &Database, feedback: &dyn FeedbackSink, event: &Event) {
    match event {
        Event::TimerStarted { .. } => {
            if open_session(db).is_none() {
                if let Some(stretch) = load_stretch(db) {
                    match db.insert_session(&stretch) {
                        Ok(id) => set_open_session(db, Some(id)),
                        Err(e) => eprintln!("history: failed to open session: {e}"),
                    }
                }
            }
        }
        Event::TimerPaused { .. } => record_status(db, SessionStatus::Paused),
        Event::TimerResumed { .. } => record_status(db, SessionStatus::Resumed),
        Event::TimerFinished { .. } => {
            record_status(db, SessionStatus::Completed);
            set_open_session(db, None);
        }
        _ => {}
    }
    if let Some(cue) = FeedbackCue::for_event(event) {
        if let Err(e) = feedback.play(cue) {
            eprintln!("feedback: cue failed on '{}': {e}", feedback.name());
        }
    }
}

fn record_status(db: &Database, status: SessionStatus) {
    if let Some(id) = open_session(db) {
        if let Err(e) = db.update_session_status(id, status) {
            eprintln!("history: failed to record '{}': {e}", status.as_str());
        }
    }
}

fn abandon_open_session(db: &Database) {
    if let Some(id) = open_session(db) {
        if let Err(e) = db.update_session_status(id, SessionStatus::Abandoned) {
            eprintln!("history: failed to abandon session: {e}");
        }
        set_open_session(db, None);
    }
}

// ── Rendering ────────────────────────────────────────────────────────

fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn render_snapshot(snap: &TimerSnapshot) -> String {
    let label = match snap.run_state {
        RunState::Finished => "complete",
        RunState::Paused => "paused",
        RunState::Idle => "ready",
        RunState::Running => match snap.phase {
            Phase::Side1 if snap.total_sides == 2 => "side 1",
            Phase::Side1 => "hold",
            Phase::Switching => "switch",
            Phase::Side2 => "side 2",
        },
    };
    format!(
        "{:<9} {:>6}  {:>3.0}%",
        label,
        format_clock(snap.time_remaining),
        snap.progress * 100.0
    )
}
