use clap::Subcommand;
use limber_core::storage::Database;
use limber_core::stretch;

#[derive(Subcommand)]
pub enum FavoriteAction {
    /// Mark a stretch as a favorite
    Add { stretch_id: i64 },
    /// Remove a stretch from favorites
    Remove { stretch_id: i64 },
    /// List favorite stretches
    List {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: FavoriteAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let catalog = stretch::builtin();

    match action {
        FavoriteAction::Add { stretch_id } => {
            if !catalog.iter().any(|s| s.id == stretch_id) {
                return Err(format!("no stretch with id {stretch_id}").into());
            }
            db.add_favorite(stretch_id)?;
            println!("favorited");
        }
        FavoriteAction::Remove { stretch_id } => {
            if db.remove_favorite(stretch_id)? {
                println!("removed");
            } else {
                println!("not a favorite");
            }
        }
        FavoriteAction::List { json } => {
            let ids = db.favorites()?;
            let favorites: Vec<_> = catalog.iter().filter(|s| ids.contains(&s.id)).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&favorites)?);
            } else {
                for stretch in favorites {
                    println!("{:>3}  {}", stretch.id, stretch.name);
                }
            }
        }
    }

    Ok(())
}
