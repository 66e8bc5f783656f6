//! State-change notifications for favorites.
//!
//! The coordinator broadcasts one [`FavoritesEvent`] after each write has been
//! applied to storage. Presentation code subscribes instead of polling.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::entity::favorite_repository::Model as FavoriteRecord;

/// Buffered events per subscriber before lagging receivers start dropping.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A change that has been applied to favorites storage.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FavoritesEvent {
    /// A favorite was persisted.
    Added { record: FavoriteRecord },
    /// Persisting a new favorite failed; membership may be stale.
    AddFailed { source_id: String },
    /// A favorite was deleted (or was already gone).
    Deleted { id: Uuid, source_id: String },
    /// Positions were rewritten.
    Reordered { count: usize },
    /// Name or description changed.
    Updated { record: FavoriteRecord },
}

/// Send an event, ignoring the case where nobody is listening.
pub(crate) fn emit(events: &broadcast::Sender<FavoritesEvent>, event: FavoritesEvent) {
    if events.send(event).is_err() {
        tracing::trace!("No favorites event subscribers");
    }
}
