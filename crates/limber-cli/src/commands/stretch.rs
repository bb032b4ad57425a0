use clap::{Args, Subcommand};
use limber_core::storage::Database;
use limber_core::stretch::{self, Filters, Stretch};
use limber_core::Config;

#[derive(Args, Default)]
pub struct FilterArgs {
    /// Only stretches hitting one of these muscle groups (repeatable)
    #[arg(long = "muscle")]
    muscle_groups: Vec<String>,
    /// Minimum seconds per side
    #[arg(long)]
    min_seconds: Option<u64>,
    /// Maximum seconds per side
    #[arg(long)]
    max_seconds: Option<u64>,
    /// all, dynamic, or static
    #[arg(long, default_value = "all")]
    kind: String,
}

impl FilterArgs {
    fn is_empty(&self) -> bool {
        self.muscle_groups.is_empty()
            && self.min_seconds.is_none()
            && self.max_seconds.is_none()
            && self.kind == "all"
    }

    fn into_filters(self) -> Result<Filters, Box<dyn std::error::Error>> {
        Ok(Filters {
            kind: self.kind.parse()?,
            muscle_groups: self.muscle_groups,
            min_seconds: self.min_seconds,
            max_seconds: self.max_seconds,
        })
    }
}

#[derive(Subcommand)]
pub enum StretchAction {
    /// List catalog stretches
    List {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Show one stretch with its reaction and favorite state
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Pick a random stretch; with no flags, the configured default
    /// filters apply
    Random {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// List every muscle group in the catalog
    Groups,
}

pub fn run(action: StretchAction) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = stretch::builtin();

    match action {
        StretchAction::List { filters, json } => {
            let filters = filters.into_filters()?;
            let hits = filters.apply(&catalog);
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                for stretch in hits {
                    println!("{}", render_row(stretch));
                }
            }
        }
        StretchAction::Show { id, json } => {
            let stretch = catalog
                .iter()
                .find(|s| s.id == id)
                .ok_or_else(|| format!("no stretch with id {id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(stretch)?);
            } else {
                let db = Database::open()?;
                println!("{}", stretch.name);
                println!("  {}", stretch.description);
                println!("  duration: {}", stretch.duration_label());
                println!("  muscles:  {}", stretch.muscle_groups.join(", "));
                println!(
                    "  kind:     {}",
                    if stretch.dynamic { "dynamic" } else { "static" }
                );
                if let Some(reaction) = db.reaction(id)? {
                    println!("  reaction: {}", reaction.as_str());
                }
                if db.favorites()?.contains(&id) {
                    println!("  favorite: yes");
                }
            }
        }
        StretchAction::Random { filters, json } => {
            let filters = if filters.is_empty() {
                Config::load_or_default().filters()
            } else {
                filters.into_filters()?
            };
            match stretch::random_stretch(&catalog, &filters) {
                Some(stretch) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&stretch)?);
                    } else {
                        println!("{}", render_row(&stretch));
                        println!(
                            "start it with: limber-cli timer start --stretch {}",
                            stretch.id
                        );
                    }
                }
                None => return Err("no stretch matches the filters".into()),
            }
        }
        StretchAction::Groups => {
            for group in stretch::muscle_groups(&catalog) {
                println!("{group}");
            }
        }
    }

    Ok(())
}

fn render_row(stretch: &Stretch) -> String {
    format!(
        "{:>3}  {:<28} {:<22} {:<8} {}",
        stretch.id,
        stretch.name,
        stretch.duration_label(),
        if stretch.dynamic { "dynamic" } else { "static" },
        stretch.muscle_groups.join(", ")
    )
}
