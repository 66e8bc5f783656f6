//! Keepsake CLI - search GitHub and curate a local favorites list.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use console::Term;
use keepsake::SortOption;
use tracing_subscriber::EnvFilter;

use crate::commands::shared::OutputFormat;

#[derive(Parser)]
#[command(name = "keepsake")]
#[command(version)]
#[command(about = "Search GitHub and keep an ordered list of favorite repositories")]
#[command(
    long_about = "Keepsake searches GitHub repositories by stars and keeps the ones you \
favorite in a local database. Favorites keep the order you give them and can be \
renamed, annotated, re-sorted and moved around."
)]
#[command(after_long_help = r#"EXAMPLES
    Search and favorite the first and third results:
        $ keepsake search "async runtime" --add 1 3

    Show the first three pages of results:
        $ keepsake search tokio --pages 3

    List favorites:
        $ keepsake favorites list

    Move favorites 4 and 5 to the top:
        $ keepsake favorites move 4 5 --to 1

    Re-sort favorites by stars:
        $ keepsake favorites sort stars-desc

    Generate shell completions:
        $ keepsake completions bash > ~/.local/share/bash-completion/completions/keepsake

CONFIGURATION
    Keepsake reads configuration from:
      1. ~/.config/keepsake/config.toml (or $XDG_CONFIG_HOME/keepsake/config.toml)
      2. ./keepsake.toml
      3. Environment variables (KEEPSAKE_* prefix)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    KEEPSAKE_DATABASE_URL     Database connection string (default: ~/.local/state/keepsake/keepsake.db)
    KEEPSAKE_SEARCH_TOKEN     GitHub token for higher search rate limits
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search GitHub repositories, sorted by stars
    Search(SearchArgs),
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, clap::Args)]
struct SearchArgs {
    /// Search query (GitHub search syntax)
    query: String,

    /// Number of result pages to load
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=34))]
    pages: u32,

    /// Favorite the results at these positions (1-based)
    #[arg(short, long, num_args = 1..)]
    add: Vec<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites in their saved order
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Remove a favorite
    Remove {
        /// Position in the list (1-based)
        position: usize,
    },
    /// Move favorites so they land before another position
    Move {
        /// Positions to move (1-based)
        #[arg(required = true)]
        positions: Vec<usize>,

        /// Destination (1-based); one past the last position moves to the end
        #[arg(short, long)]
        to: usize,
    },
    /// Re-sort all favorites and save the new order
    Sort {
        /// date-desc, date-asc, name-asc, name-desc, stars-desc or stars-asc
        key: SortOption,
    },
    /// Edit a favorite's name or description
    Edit {
        /// Position in the list (1-based)
        position: usize,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New description (empty clears it)
        #[arg(short, long)]
        description: Option<String>,

        /// Throw the edit away instead of saving it
        #[arg(long)]
        discard: bool,

        /// Confirm discarding unsaved changes
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

fn init_tracing() {
    let default_filter = if Term::stdout().is_term() {
        "warn"
    } else {
        "keepsake=info,keepsake_cli=info"
    };
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_filter),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    // Handle commands that don't require database access first
    if let Commands::Completions { shell } = &cli.command {
        commands::meta::handle_completions(*shell)?;
        return Ok(());
    }

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database location; set KEEPSAKE_DATABASE_URL")?;

    // Ensure the database directory exists for SQLite
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        // Strip query parameters (e.g., ?mode=rwc) before path operations
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
    }

    match cli.command {
        Commands::Search(args) => {
            commands::search::handle_search(args, &config, &database_url).await?;
        }
        Commands::Favorites { action } => {
            commands::favorites::handle_favorites(action, &config, &database_url).await?;
        }
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_search_with_adds() {
        let cli = Cli::try_parse_from(["keepsake", "search", "tokio", "--pages", "2", "--add", "1", "3"])
            .expect("should parse");
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.query, "tokio");
                assert_eq!(args.pages, 2);
                assert_eq!(args.add, vec![1, 3]);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn parses_sort_key() {
        let cli = Cli::try_parse_from(["keepsake", "favorites", "sort", "stars-desc"])
            .expect("should parse");
        assert!(matches!(
            cli.command,
            Commands::Favorites {
                action: FavoritesAction::Sort {
                    key: SortOption::StarsDesc
                }
            }
        ));
        assert!(Cli::try_parse_from(["keepsake", "favorites", "sort", "random"]).is_err());
    }

    #[test]
    fn parses_move_with_destination() {
        let cli = Cli::try_parse_from(["keepsake", "favorites", "move", "4", "5", "--to", "1"])
            .expect("should parse");
        match cli.command {
            Commands::Favorites {
                action: FavoritesAction::Move { positions, to },
            } => {
                assert_eq!(positions, vec![4, 5]);
                assert_eq!(to, 1);
            }
            _ => panic!("expected move"),
        }
    }
}
