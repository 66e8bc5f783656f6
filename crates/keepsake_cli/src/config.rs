//! Configuration file support for keepsake.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. Environment variables (prefixed with `KEEPSAKE_`, e.g., `KEEPSAKE_DATABASE_URL`)
//! 2. Local config file (./keepsake.toml)
//! 3. User config file (~/.config/keepsake/config.toml)
//! 4. Built-in defaults
//!
//! Environment variables map `_` to nesting, so only single-word keys
//! (`KEEPSAKE_DATABASE_URL`, `KEEPSAKE_SEARCH_TOKEN`) can be set that way.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/keepsake/keepsake.db"  # optional, this is the default
//!
//! [search]
//! api_base_url = "https://api.github.com"
//! web_host = "github.com"
//! timeout_secs = 10
//! per_page = 30
//! token = "ghp_..."  # optional, raises the search rate limit
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use keepsake::github::{DEFAULT_API_BASE_URL, DEFAULT_PER_PAGE, SearchOptions};
use keepsake::source::DEFAULT_WEB_HOST;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub search: SearchConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Defaults to `sqlite://<state dir>/keepsake.db?mode=rwc` if not specified.
    pub url: Option<String>,
}

/// Repository search configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the GitHub REST API.
    pub api_base_url: String,
    /// Host used for repository links.
    pub web_host: String,
    /// Upper bound on one page request.
    pub timeout_secs: u64,
    /// Results per page.
    pub per_page: u32,
    /// Optional API token.
    /// Can also be set via KEEPSAKE_SEARCH_TOKEN environment variable.
    pub token: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            web_host: DEFAULT_WEB_HOST.to_string(),
            timeout_secs: 10,
            per_page: DEFAULT_PER_PAGE,
            token: None,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Invalid configuration is logged and replaced by defaults.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = Self::project_dirs() {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("keepsake.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./keepsake.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // KEEPSAKE_DATABASE_URL -> database.url
        builder = builder.add_source(
            Environment::with_prefix("KEEPSAKE")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// `mode=rwc` opens read-write and creates the file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("keepsake.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Search client settings derived from `[search]`.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            api_base_url: self.search.api_base_url.clone(),
            per_page: self.search.per_page.max(1),
            timeout: Duration::from_secs(self.search.timeout_secs.max(1)),
            token: self.search.token.clone().filter(|t| !t.trim().is_empty()),
            ..SearchOptions::default()
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "keepsake")
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/keepsake` or `~/.local/state/keepsake`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
