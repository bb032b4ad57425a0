use limber_core::storage::Database;
use limber_core::stretch::{self, Reaction};

pub fn run(
    stretch_id: i64,
    reaction: Option<String>,
    clear: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !stretch::builtin().iter().any(|s| s.id == stretch_id) {
        return Err(format!("no stretch with id {stretch_id}").into());
    }
    let db = Database::open()?;

    if clear {
        db.set_reaction(stretch_id, None)?;
        println!("reaction cleared");
        return Ok(());
    }

    match reaction {
        Some(raw) => {
            let reaction: Reaction = raw.parse()?;
            db.set_reaction(stretch_id, Some(reaction))?;
            println!("recorded '{}'", reaction.as_str());
        }
        None => match db.reaction(stretch_id)? {
            Some(reaction) => println!("{}", reaction.as_str()),
            None => println!("no reaction recorded"),
        },
    }

    Ok(())
}
