use clap::Subcommand;
use limber_core::storage::Database;
use limber_core::{Config, SessionRecord};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List sessions, newest first
    List {
        /// Maximum rows (defaults to the configured history_limit)
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Aggregate statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Delete all history rows
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HistoryAction::List { limit, json } => {
            let limit = limit.unwrap_or_else(|| Config::load_or_default().history_limit);
            let sessions = db.list_sessions(Some(limit))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else {
                for session in sessions {
                    println!("{}", render_row(&session));
                }
            }
        }
        HistoryAction::Stats { json } => {
            let stats = db.stats()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("sessions:   {}", stats.total_sessions);
                println!("completed:  {}", stats.completed_sessions);
                println!("abandoned:  {}", stats.abandoned_sessions);
                println!("today:      {}", stats.today_sessions);
                println!("stretched:  {}s", stats.total_seconds_stretched);
            }
        }
        HistoryAction::Clear => {
            let removed = db.clear_history()?;
            println!("removed {removed} session(s)");
        }
    }

    Ok(())
}

fn render_row(session: &SessionRecord) -> String {
    format!(
        "{:>4}  {}  {:<10} {}",
        session.id,
        session.started_at.format("%Y-%m-%d %H:%M"),
        session.status.as_str(),
        session.stretch_name
    )
}
