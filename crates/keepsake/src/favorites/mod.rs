//! The favorites core: coordinator, list state, ordering and editing.
//!
//! # Architecture
//!
//! ```text
//! UI intent → FavoritesList (optimistic) → FavoritesCoordinator → writer task → FavoritesStorage
//!                                                  │                    │
//!                                           membership set        FavoritesEvent broadcast
//! ```
//!
//! The coordinator is the only writer. Every storage call is queued to one
//! background task and applied strictly in the order it was issued, so a
//! reorder built from an older list can never land over a newer delete.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use keepsake::favorites::{FavoritesCoordinator, FavoritesList, SortOption};
//! use keepsake::storage::DatabaseStorage;
//!
//! let storage = Arc::new(DatabaseStorage::new(Arc::new(db)));
//! let coordinator = FavoritesCoordinator::start(storage).await;
//!
//! coordinator.add_favorite(&repo);            // fire-and-forget
//! assert!(coordinator.is_favorite(&repo.id)); // visible immediately
//!
//! let mut list = FavoritesList::new(coordinator.clone());
//! list.load().await;
//! list.sort_items(SortOption::StarsDesc).await;
//! ```

mod coordinator;
mod edit;
mod events;
mod list;
mod membership;
mod ordering;
mod writer;

pub use coordinator::FavoritesCoordinator;
pub use edit::{EditError, EditSession, EditState};
pub use events::{EVENT_CHANNEL_CAPACITY, FavoritesEvent};
pub use list::FavoritesList;
pub use ordering::{
    OrderingError, ParseSortOptionError, SortOption, move_items, renumber, sort_records,
};
pub use writer::Pending;
