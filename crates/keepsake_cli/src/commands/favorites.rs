use console::style;
use keepsake::{EditError, EditSession, FavoritesList};

use crate::FavoritesAction;
use crate::commands::shared::{open_coordinator, print_favorites, to_index};
use crate::config::Config;

pub(crate) async fn handle_favorites(
    action: FavoritesAction,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = open_coordinator(config, database_url).await?;
    let mut list = FavoritesList::new(coordinator.clone());
    list.load().await;

    match action {
        FavoritesAction::List { format } => {
            print_favorites(list.items(), format)?;
        }
        FavoritesAction::Remove { position } => {
            let record = list
                .get(to_index(position, list.len())?)
                .cloned()
                .ok_or_else(|| format!("No favorite at position {position}"))?;
            list.delete_item(record.id).await;
            println!("Removed {}", style(record.full_name()).bold());
        }
        FavoritesAction::Move { positions, to } => {
            let sources = positions
                .iter()
                .map(|&p| to_index(p, list.len()))
                .collect::<Result<Vec<_>, _>>()?;
            // `to` may point one past the end.
            let destination = to_index(to, list.len() + 1)?;
            list.move_items(&sources, destination)?.await;
            print_favorites(list.items(), Default::default())?;
        }
        FavoritesAction::Sort { key } => {
            list.sort_items(key).await;
            println!("Sorted by {}", style(key.label()).bold());
            print_favorites(list.items(), Default::default())?;
        }
        FavoritesAction::Edit {
            position,
            name,
            description,
            discard,
            yes,
        } => {
            let record = list
                .get(to_index(position, list.len())?)
                .cloned()
                .ok_or_else(|| format!("No favorite at position {position}"))?;
            let mut session = EditSession::new(record);
            if let Some(name) = name {
                session.set_name(name)?;
            }
            if let Some(description) = description {
                session.set_description(description)?;
            }

            if discard {
                match session.discard(yes) {
                    Ok(()) => println!("Discarded changes."),
                    Err(EditError::ConfirmationRequired) => {
                        return Err("Discarding unsaved changes needs --yes.".into());
                    }
                    Err(e) => return Err(e.into()),
                }
                return Ok(());
            }

            if !session.is_dirty() {
                println!("Nothing to change.");
                return Ok(());
            }

            match session.save(&coordinator)?.await {
                Some(updated) => {
                    println!("Saved {}", style(updated.full_name()).bold());
                    list.replace(updated);
                }
                None => return Err("Could not save the edit.".into()),
            }
        }
    }

    coordinator.flush().await;
    Ok(())
}
