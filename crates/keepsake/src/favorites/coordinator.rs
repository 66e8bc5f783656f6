use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use tokio::sync::{broadcast, mpsc, oneshot};
use uuid::Uuid;

use crate::entity::favorite_repository::Model as FavoriteRecord;
use crate::source::SourceRepository;
use crate::storage::FavoritesStorage;

use super::events::{EVENT_CHANNEL_CAPACITY, FavoritesEvent};
use super::membership::{self, Membership, SharedMembership};
use super::writer::{Pending, StorageCommand, spawn_writer};

/// The single gateway between UI intents and favorites storage.
///
/// Cheap to clone; clones share the same writer queue and membership set.
/// Construct one at startup and hand it to every consumer.
#[derive(Clone)]
pub struct FavoritesCoordinator {
    commands: mpsc::UnboundedSender<StorageCommand>,
    membership: SharedMembership,
    events: broadcast::Sender<FavoritesEvent>,
}

impl FavoritesCoordinator {
    /// Load the membership set from storage and start the writer task.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(storage: Arc<dyn FavoritesStorage>) -> Self {
        let existing = storage.list_all().await;
        let mut loaded = Membership::default();
        for record in &existing {
            loaded.retain(&record.source_id);
        }
        tracing::debug!(
            favorites = existing.len(),
            distinct_sources = loaded.len(),
            "Loaded favorites membership"
        );

        let membership = Arc::new(RwLock::new(loaded));
        let (commands, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        drop(spawn_writer(storage, rx, events.clone(), membership.clone()));

        Self {
            commands,
            membership,
            events,
        }
    }

    fn enqueue<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> StorageCommand) -> Pending<T> {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(command(reply)).is_err() {
            tracing::warn!("Favorites writer is not running; dropping storage command");
        }
        Pending::new(rx)
    }

    // ─── Membership ──────────────────────────────────────────────────────────

    /// Whether a source repository is currently favorited.
    pub fn is_favorite(&self, source_id: &str) -> bool {
        membership::read(&self.membership, |m| m.contains(source_id))
    }

    /// Snapshot of all favorited source ids.
    pub fn favorite_ids(&self) -> HashSet<String> {
        membership::read(&self.membership, Membership::source_ids)
    }

    // ─── Operations ──────────────────────────────────────────────────────────

    /// Favorite a search result.
    ///
    /// Membership is updated before this returns; the durable write is queued.
    /// The returned [`Pending`] yields the stored record, or `None` if the
    /// write failed, in which case membership is rolled back by the writer.
    pub fn add_favorite(&self, source: &SourceRepository) -> Pending<Option<FavoriteRecord>> {
        membership::write(&self.membership, |m| m.retain(&source.id));
        self.enqueue(|reply| StorageCommand::Add {
            source: source.clone(),
            reply,
        })
    }

    /// Delete a favorite. Deleting an unknown or already deleted record is a
    /// no-op.
    pub fn delete_favorite(&self, record: &FavoriteRecord) -> Pending<()> {
        membership::write(&self.membership, |m| {
            m.release_record(record.id, &record.source_id)
        });
        self.enqueue(|reply| StorageCommand::Delete {
            id: record.id,
            source_id: record.source_id.clone(),
            reply,
        })
    }

    /// Persist a new order: each record's position becomes its index.
    pub fn reorder_favorites(&self, records: &[FavoriteRecord]) -> Pending<()> {
        self.enqueue(|reply| StorageCommand::Reorder {
            records: records.to_vec(),
            reply,
        })
    }

    /// Persist an edited name and description.
    pub fn update_favorite(
        &self,
        id: Uuid,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Pending<Option<FavoriteRecord>> {
        self.enqueue(|reply| StorageCommand::Update {
            id,
            name: name.into(),
            description,
            reply,
        })
    }

    /// All favorites in display order, as storage has them.
    ///
    /// Queued behind every write issued before this call, so the result
    /// reflects them.
    pub fn get_favorites(&self) -> Pending<Vec<FavoriteRecord>> {
        self.enqueue(|reply| StorageCommand::List { reply })
    }

    /// Resolves once every previously issued write has been applied.
    pub fn flush(&self) -> Pending<()> {
        self.enqueue(|reply| StorageCommand::Flush { reply })
    }

    /// Subscribe to applied-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<FavoritesEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::source::sample;
    use crate::storage::mock::RecordingStorage;

    async fn coordinator_with(storage: RecordingStorage) -> (FavoritesCoordinator, Arc<RecordingStorage>) {
        let storage = Arc::new(storage);
        let coordinator = FavoritesCoordinator::start(storage.clone()).await;
        (coordinator, storage)
    }

    #[tokio::test]
    async fn membership_is_visible_before_the_write_lands() {
        let (coordinator, _storage) =
            coordinator_with(RecordingStorage::with_write_delay(Duration::from_millis(50))).await;
        let repo = sample(1, "hello", 5);

        let pending = coordinator.add_favorite(&repo);
        assert!(coordinator.is_favorite(&repo.id));
        assert_eq!(coordinator.get_favorites().await.len(), 1);

        let record = pending.await.expect("record should be stored");
        assert_eq!(record.source_id, repo.id);
    }

    #[tokio::test]
    async fn delete_removes_membership() {
        let (coordinator, _storage) = coordinator_with(RecordingStorage::default()).await;
        let repo = sample(1, "hello", 5);

        let record = coordinator.add_favorite(&repo).await.expect("stored");
        coordinator.delete_favorite(&record).await;

        assert!(!coordinator.is_favorite(&repo.id));
        assert!(coordinator.get_favorites().await.is_empty());
    }

    #[tokio::test]
    async fn membership_survives_while_another_favorite_shares_the_source() {
        let (coordinator, _storage) = coordinator_with(RecordingStorage::default()).await;
        let repo = sample(1, "hello", 5);

        let first = coordinator.add_favorite(&repo).await.expect("stored");
        let _second = coordinator.add_favorite(&repo).await.expect("stored");
        coordinator.delete_favorite(&first).await;

        assert!(coordinator.is_favorite(&repo.id));
        assert_eq!(coordinator.favorite_ids().len(), 1);
    }

    #[tokio::test]
    async fn deleting_the_same_record_twice_keeps_the_other_copy_favorited() {
        let (coordinator, storage) = coordinator_with(RecordingStorage::default()).await;
        let repo = sample(1, "hello", 5);

        let first = coordinator.add_favorite(&repo).await.expect("stored");
        let second = coordinator.add_favorite(&repo).await.expect("stored");
        coordinator.delete_favorite(&first).await;
        coordinator.delete_favorite(&first).await;

        let remaining = storage.list_all().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
        assert!(coordinator.is_favorite(&repo.id));

        coordinator.delete_favorite(&second).await;
        assert!(!coordinator.is_favorite(&repo.id));
    }

    #[tokio::test]
    async fn failed_add_rolls_back_membership() {
        let (coordinator, _storage) = coordinator_with(RecordingStorage::failing_adds()).await;
        let repo = sample(1, "hello", 5);
        let mut events = coordinator.subscribe();

        let pending = coordinator.add_favorite(&repo);
        assert!(coordinator.is_favorite(&repo.id));

        assert!(pending.await.is_none());
        assert!(!coordinator.is_favorite(&repo.id));
        assert_eq!(
            events.recv().await.expect("event"),
            FavoritesEvent::AddFailed {
                source_id: repo.id.clone()
            }
        );
    }

    #[tokio::test]
    async fn writes_apply_in_issue_order() {
        let (coordinator, storage) =
            coordinator_with(RecordingStorage::with_write_delay(Duration::from_millis(5))).await;

        let a = coordinator.add_favorite(&sample(1, "a", 1));
        let b = coordinator.add_favorite(&sample(2, "b", 1));
        let (a, b) = (a.await.expect("a"), b.await.expect("b"));

        // Issue a stale reorder and a delete back-to-back without awaiting.
        let reorder = coordinator.reorder_favorites(&[b.clone(), a.clone()]);
        let delete = coordinator.delete_favorite(&b);
        delete.await;
        reorder.await;

        assert_eq!(
            storage.applied(),
            vec!["add:a", "add:b", "reorder:b,a", "delete:b"]
        );
        let remaining = coordinator.get_favorites().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "a");
        assert_eq!(remaining[0].sort_order, 0);
    }

    #[tokio::test]
    async fn events_are_broadcast_after_writes() {
        let (coordinator, _storage) = coordinator_with(RecordingStorage::default()).await;
        let mut events = coordinator.subscribe();

        let record = coordinator
            .add_favorite(&sample(1, "a", 1))
            .await
            .expect("stored");
        coordinator.delete_favorite(&record).await;

        assert_eq!(
            events.recv().await.expect("event"),
            FavoritesEvent::Added {
                record: record.clone()
            }
        );
        assert_eq!(
            events.recv().await.expect("event"),
            FavoritesEvent::Deleted {
                id: record.id,
                source_id: record.source_id.clone()
            }
        );
    }

    #[tokio::test]
    async fn start_loads_existing_membership() {
        let storage = Arc::new(RecordingStorage::default());
        storage.add(&sample(10, "seed", 1)).await;

        let coordinator = FavoritesCoordinator::start(storage).await;
        assert!(coordinator.is_favorite("10"));
        assert!(!coordinator.is_favorite("11"));
    }
}
