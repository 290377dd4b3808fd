//! # Command Interface
//!
//! Maps terminal verbs onto the same store operations the HTTP API uses.
//! Each invocation performs one operation and exits; business failures
//! (missing id, duplicate name) come back as messages, never as panics.

use crate::db::SipStore;
use crate::drink::{Drink, DrinkPatch};
use crate::error::{SipError, SipResult};

/// Usage guidance printed for unknown verbs or missing arguments
pub const USAGE: &str = r#"Usage:
  sipdb create_db
  sipdb add "<name>" "<description>"
  sipdb list
  sipdb update <id> "<name>" "<description>"
  sipdb delete <id>
  sipdb serve"#;

/// One parsed terminal command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateDb,
    Add { name: String, description: String },
    List,
    Update {
        id: i64,
        name: String,
        description: String,
    },
    Delete { id: i64 },
    Serve,
}

impl Command {
    /// Parses the positional arguments after the binary name and any global
    /// flags. `None` means the caller should print usage and stop, without
    /// treating it as a failure.
    pub fn parse(args: &[String]) -> Option<Command> {
        let verb = args.first()?;
        match verb.as_str() {
            "create_db" => Some(Command::CreateDb),
            "add" => Some(Command::Add {
                name: args.get(1)?.clone(),
                description: args.get(2)?.clone(),
            }),
            "list" => Some(Command::List),
            "update" => Some(Command::Update {
                id: args.get(1)?.parse().ok()?,
                name: args.get(2)?.clone(),
                description: args.get(3)?.clone(),
            }),
            "delete" => Some(Command::Delete {
                id: args.get(1)?.parse().ok()?,
            }),
            "serve" => Some(Command::Serve),
            _ => None,
        }
    }
}

/// Runs one command against the store and returns the message to print.
/// `Serve` is long-running and handled by the caller, never here.
pub async fn execute(store: &SipStore, command: Command) -> SipResult<String> {
    match command {
        Command::CreateDb => {
            store.initialize().await?;
            Ok("Database created!".to_string())
        }
        Command::Add { name, description } => {
            let mut drink = Drink::new(name, Some(description))?;
            drink.save(store).await?;
            Ok("Drink added!".to_string())
        }
        Command::List => {
            let drinks = store.list().await?;
            Ok(drinks
                .iter()
                .map(Drink::to_string)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Command::Update {
            id,
            name,
            description,
        } => match store.get(id).await? {
            None => Ok("Drink not found!".to_string()),
            Some(mut drink) => {
                let patch = DrinkPatch {
                    name: Some(name),
                    description: Some(description),
                };
                drink.update(store, patch).await?;
                Ok("Drink updated!".to_string())
            }
        },
        Command::Delete { id } => match store.get(id).await? {
            None => Ok("Drink not found!".to_string()),
            Some(drink) => {
                drink.delete(store).await?;
                Ok("Drink deleted!".to_string())
            }
        },
        Command::Serve => Err(SipError::Internal(anyhow::anyhow!(
            "serve must be run by the server entry point"
        ))),
    }
}
