use console::style;
use keepsake::SourceRepository;
use keepsake::github::{GitHubSearchClient, LoadingState, SearchSession};

use crate::SearchArgs;
use crate::commands::shared::{OutputFormat, open_coordinator, to_index, truncate};
use crate::config::Config;

/// One search result as shown in a table.
#[derive(Debug, Clone, tabled::Tabled)]
struct ResultRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "★")]
    favorite: String,
    #[tabled(rename = "Repository")]
    repository: String,
    #[tabled(rename = "Stars")]
    stars: i64,
    #[tabled(rename = "Description")]
    description: String,
}

impl ResultRow {
    fn new(index: usize, repo: &SourceRepository, is_favorite: bool) -> Self {
        Self {
            position: index + 1,
            favorite: if is_favorite { "★".to_string() } else { String::new() },
            repository: repo.full_name(),
            stars: repo.star_count,
            description: truncate(repo.description.as_deref().unwrap_or(""), 60),
        }
    }
}

async fn interruptible(
    step: impl Future<Output = LoadingState>,
) -> Result<LoadingState, Box<dyn std::error::Error>> {
    tokio::select! {
        state = step => Ok(state),
        _ = tokio::signal::ctrl_c() => Err("Search interrupted".into()),
    }
}

pub(crate) async fn handle_search(
    args: SearchArgs,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = open_coordinator(config, database_url).await?;
    let session = SearchSession::new(GitHubSearchClient::new(config.search_options()));

    let mut state = interruptible(session.submit_query(&args.query)).await?;
    for _ in 1..args.pages {
        if state != LoadingState::Loaded || session.snapshot().exhausted {
            break;
        }
        state = interruptible(session.load_next_page()).await?;
    }

    let snapshot = session.snapshot();
    match (state, &snapshot.error) {
        (LoadingState::Idle, _) => {
            println!("{}", style("Nothing to search for.").dim());
            return Ok(());
        }
        (LoadingState::Empty, _) => {
            println!("No repositories match '{}'.", snapshot.query);
            return Ok(());
        }
        (LoadingState::Error, Some(e)) if snapshot.results.is_empty() => {
            if e.is_rate_limited() {
                return Err(format!("{e}. Set KEEPSAKE_SEARCH_TOKEN for a higher limit.").into());
            }
            return Err(e.to_string().into());
        }
        (LoadingState::Error, Some(e)) => {
            eprintln!(
                "{} Could not load page {}: {e}",
                style("warning:").yellow().bold(),
                snapshot.next_page
            );
        }
        _ => {}
    }

    let results = &snapshot.results;
    let mut added = Vec::new();
    for &position in &args.add {
        let repo = &results[to_index(position, results.len())?];
        if coordinator.is_favorite(&repo.id) {
            println!("{} is already a favorite", repo.full_name());
            continue;
        }
        added.push((repo.full_name(), coordinator.add_favorite(repo)));
    }
    for (name, pending) in added {
        match pending.await {
            Some(_) => println!("{} Added {}", style("★").yellow(), style(name).bold()),
            None => eprintln!("{} Could not save {name}", style("error:").red().bold()),
        }
    }

    match args.format {
        OutputFormat::Table => {
            let favorites = coordinator.favorite_ids();
            let rows: Vec<_> = results
                .iter()
                .enumerate()
                .map(|(i, repo)| ResultRow::new(i, repo, favorites.contains(&repo.id)))
                .collect();
            let mut table = tabled::Table::new(rows);
            table.with(tabled::settings::Style::rounded());
            println!("{}", table);
            if !snapshot.exhausted {
                println!(
                    "{}",
                    style(format!("Use --pages {} to see more.", args.pages + 1)).dim()
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use keepsake::Owner;

    use super::*;

    #[test]
    fn result_row_marks_favorites() {
        let repo = SourceRepository {
            id: "1".to_string(),
            name: "tokio".to_string(),
            description: None,
            owner: Owner {
                login: "tokio-rs".to_string(),
                avatar_url: String::new(),
            },
            star_count: 25_000,
        };

        let row = ResultRow::new(0, &repo, true);
        assert_eq!(row.position, 1);
        assert_eq!(row.favorite, "★");
        assert_eq!(row.repository, "tokio-rs/tokio");
        assert!(ResultRow::new(0, &repo, false).favorite.is_empty());
    }
}
