use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod feedback;

#[derive(Parser)]
#[command(name = "limber-cli", version, about = "Limber CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Stretch catalog browsing and random selection
    Stretch {
        #[command(subcommand)]
        action: commands::stretch::StretchAction,
    },
    /// Session history and statistics
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// React to a stretch (love, like, dislike, hate)
    React {
        /// Stretch id from the catalog
        stretch_id: i64,
        /// Reaction to record; omit to show the current one
        reaction: Option<String>,
        /// Clear the recorded reaction
        #[arg(long, conflicts_with = "reaction")]
        clear: bool,
    },
    /// Favorite management
    Favorite {
        #[command(subcommand)]
        action: commands::favorite::FavoriteAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Stretch { action } => commands::stretch::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::React {
            stretch_id,
            reaction,
            clear,
        } => commands::react::run(stretch_id, reaction, clear),
        Commands::Favorite { action } => commands::favorite::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "limber-cli",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
