//! Keepsake - local, manually ordered favorites for GitHub search results.
//!
//! Search GitHub for repositories, page through the results and keep the
//! ones worth remembering in a personal favorites list. Favorites live in a
//! local database, keep the order the user gives them, and can be renamed
//! and annotated.
//!
//! # Features
//!
//! - `sqlite` - SQLite driver for sea-orm.
//! - `migrate` - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to automatically run migrations on connection.
//! - `github` - reqwest transport and the [`github`] search client.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use keepsake::{connect_and_migrate, DatabaseStorage, FavoritesCoordinator};
//!
//! let db = connect_and_migrate("sqlite://keepsake.db?mode=rwc").await?;
//! let coordinator = FavoritesCoordinator::start(Arc::new(DatabaseStorage::new(Arc::new(db)))).await;
//!
//! coordinator.add_favorite(&repo).await;
//! let favorites = coordinator.get_favorites().await;
//! ```

pub mod db;
pub mod entity;
pub mod favorites;
pub mod http;
pub mod repository;
pub mod source;
pub mod storage;

#[cfg(feature = "github")]
pub mod github;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use favorites::{
    EditError, EditSession, EditState, FavoritesCoordinator, FavoritesEvent, FavoritesList,
    OrderingError, Pending, SortOption,
};
pub use repository::RepositoryError;
pub use source::{Owner, SourceRepository};
pub use storage::{DatabaseStorage, FavoritesStorage};
