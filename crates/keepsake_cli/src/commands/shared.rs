//! Helpers shared by the search and favorites commands.

use std::sync::Arc;

use clap::ValueEnum;
use console::style;
use keepsake::{DatabaseStorage, FavoriteRecord, FavoritesCoordinator, connect_and_migrate};

use crate::config::Config;

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Open the favorites database and start a coordinator over it.
pub(crate) async fn open_coordinator(
    config: &Config,
    database_url: &str,
) -> Result<FavoritesCoordinator, Box<dyn std::error::Error>> {
    let db = connect_and_migrate(database_url).await?;
    let storage =
        DatabaseStorage::new(Arc::new(db)).with_web_host(config.search.web_host.clone());
    Ok(FavoritesCoordinator::start(Arc::new(storage)).await)
}

/// Convert a 1-based position into an index into a list of `len`.
pub(crate) fn to_index(position: usize, len: usize) -> Result<usize, String> {
    if position == 0 || position > len {
        return Err(match len {
            0 => "The list is empty.".to_string(),
            _ => format!("Position {position} is out of range (1-{len})."),
        });
    }
    Ok(position - 1)
}

/// Shorten `text` to at most `max` characters, marking the cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// One favorite as shown in a table.
#[derive(Debug, Clone, tabled::Tabled)]
pub(crate) struct FavoriteRow {
    #[tabled(rename = "#")]
    pub position: usize,
    #[tabled(rename = "Repository")]
    pub repository: String,
    #[tabled(rename = "Stars")]
    pub stars: i64,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Added")]
    pub added: String,
}

impl FavoriteRow {
    pub(crate) fn new(index: usize, record: &FavoriteRecord) -> Self {
        Self {
            position: index + 1,
            repository: record.full_name(),
            stars: record.star_count,
            description: truncate(record.description.as_deref().unwrap_or(""), 60),
            added: record.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

pub(crate) fn print_favorites(
    records: &[FavoriteRecord],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            if records.is_empty() {
                println!("{}", style("No favorites yet.").dim());
                return Ok(());
            }
            let rows: Vec<_> = records
                .iter()
                .enumerate()
                .map(|(i, record)| FavoriteRow::new(i, record))
                .collect();
            let mut table = tabled::Table::new(rows);
            table.with(tabled::settings::Style::rounded());
            println!("{}", table);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
    }
    Ok(())
}
