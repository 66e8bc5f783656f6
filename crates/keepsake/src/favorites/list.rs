//! The favorites list as shown to the user.

use uuid::Uuid;

use crate::entity::favorite_repository::Model as FavoriteRecord;

use super::coordinator::FavoritesCoordinator;
use super::events::FavoritesEvent;
use super::ordering::{OrderingError, SortOption, move_items, renumber, sort_records};
use super::writer::Pending;

/// In-memory projection of the favorites, kept in display order.
///
/// Mutations apply optimistically to the projection and are then persisted
/// through the coordinator. The projection is a cache; [`load`](Self::load)
/// rebuilds it from storage.
pub struct FavoritesList {
    items: Vec<FavoriteRecord>,
    coordinator: FavoritesCoordinator,
}

impl FavoritesList {
    pub fn new(coordinator: FavoritesCoordinator) -> Self {
        Self {
            items: Vec::new(),
            coordinator,
        }
    }

    /// Replace the projection with storage's current contents.
    pub async fn load(&mut self) {
        self.items = self.coordinator.get_favorites().await;
        tracing::debug!(count = self.items.len(), "Loaded favorites list");
    }

    pub fn items(&self) -> &[FavoriteRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FavoriteRecord> {
        self.items.get(index)
    }

    /// Remove a favorite. Unknown ids are a no-op and issue no write.
    pub fn delete_item(&mut self, id: Uuid) -> Pending<()> {
        let Some(index) = self.items.iter().position(|record| record.id == id) else {
            return Pending::ready(());
        };
        let record = self.items.remove(index);
        renumber(&mut self.items);
        self.coordinator.delete_favorite(&record)
    }

    /// Move the items at `sources` to land before `destination`, then persist
    /// the new order.
    ///
    /// A move that changes nothing is not persisted.
    pub fn move_items(
        &mut self,
        sources: &[usize],
        destination: usize,
    ) -> Result<Pending<()>, OrderingError> {
        if !move_items(&mut self.items, sources, destination)? {
            return Ok(Pending::ready(()));
        }
        renumber(&mut self.items);
        Ok(self.coordinator.reorder_favorites(&self.items))
    }

    /// Re-sort by `option` and persist the result as the new canonical order.
    pub fn sort_items(&mut self, option: SortOption) -> Pending<()> {
        sort_records(&mut self.items, option);
        tracing::debug!(sort = %option, count = self.items.len(), "Sorted favorites");
        self.coordinator.reorder_favorites(&self.items)
    }

    /// Swap in an updated copy of a record, e.g. after an edit was saved.
    pub fn replace(&mut self, record: FavoriteRecord) {
        if let Some(slot) = self.items.iter_mut().find(|item| item.id == record.id) {
            let sort_order = slot.sort_order;
            *slot = FavoriteRecord { sort_order, ..record };
        }
    }

    /// Fold an applied change from another handle into the projection.
    pub fn apply_event(&mut self, event: &FavoritesEvent) {
        match event {
            FavoritesEvent::Added { record } => {
                if !self.items.iter().any(|item| item.id == record.id) {
                    let mut record = record.clone();
                    record.sort_order = self.items.len() as i32;
                    self.items.push(record);
                }
            }
            FavoritesEvent::Deleted { id, .. } => {
                let before = self.items.len();
                self.items.retain(|item| item.id != *id);
                if self.items.len() != before {
                    renumber(&mut self.items);
                }
            }
            FavoritesEvent::Updated { record } => self.replace(record.clone()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::source::sample;
    use crate::storage::FavoritesStorage;
    use crate::storage::mock::RecordingStorage;

    async fn list_with(stars: &[(&str, i64)]) -> (FavoritesList, Arc<RecordingStorage>) {
        let storage = Arc::new(RecordingStorage::default());
        let coordinator = FavoritesCoordinator::start(storage.clone()).await;
        for (i, (name, stars)) in stars.iter().enumerate() {
            coordinator.add_favorite(&sample(i as i64, name, *stars));
        }
        let mut list = FavoritesList::new(coordinator);
        list.load().await;
        (list, storage)
    }

    fn names(list: &FavoritesList) -> Vec<&str> {
        list.items().iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn load_reflects_queued_adds() {
        let (list, _storage) = list_with(&[("a", 1), ("b", 2)]).await;
        assert_eq!(names(&list), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn sort_persists_new_order() {
        let (mut list, storage) = list_with(&[("a", 50), ("b", 150), ("c", 100)]).await;
        list.sort_items(SortOption::StarsDesc).await;

        assert_eq!(names(&list), vec!["b", "c", "a"]);
        assert_eq!(storage.applied().last().map(String::as_str), Some("reorder:b,c,a"));

        let reloaded: Vec<_> = storage
            .list_all()
            .await
            .into_iter()
            .map(|r| (r.name, r.sort_order))
            .collect();
        assert_eq!(
            reloaded,
            vec![("b".into(), 0), ("c".into(), 1), ("a".into(), 2)]
        );
    }

    #[tokio::test]
    async fn move_persists_and_no_op_does_not() {
        let (mut list, storage) = list_with(&[("First", 1), ("Second", 1)]).await;

        list.move_items(&[1], 0).expect("valid move").await;
        assert_eq!(names(&list), vec!["Second", "First"]);
        let orders: Vec<_> = list.items().iter().map(|r| r.sort_order).collect();
        assert_eq!(orders, vec![0, 1]);

        let writes = storage.applied().len();
        list.move_items(&[1], 2).expect("valid move").await;
        list.coordinator.flush().await;
        assert_eq!(storage.applied().len(), writes);
    }

    #[tokio::test]
    async fn invalid_move_changes_nothing() {
        let (mut list, _storage) = list_with(&[("a", 1)]).await;
        assert!(matches!(
            list.move_items(&[4], 0),
            Err(OrderingError::IndexOutOfBounds { index: 4, len: 1 })
        ));
        assert_eq!(names(&list), vec!["a"]);
    }

    #[tokio::test]
    async fn delete_renumbers_projection() {
        let (mut list, storage) = list_with(&[("a", 1), ("b", 1), ("c", 1)]).await;
        let id = list.get(0).expect("first item").id;

        list.delete_item(id).await;
        assert_eq!(names(&list), vec!["b", "c"]);
        let orders: Vec<_> = list.items().iter().map(|r| r.sort_order).collect();
        assert_eq!(orders, vec![0, 1]);

        list.delete_item(id).await;
        assert_eq!(storage.list_all().await.len(), 2);
        assert!(list.get(2).is_none());
    }

    #[tokio::test]
    async fn events_from_other_handles_are_folded_in() {
        let (mut list, _storage) = list_with(&[("a", 1)]).await;
        let other = list.coordinator.clone();
        let mut events = other.subscribe();

        let added = other.add_favorite(&sample(9, "z", 1)).await.expect("stored");
        list.apply_event(&events.recv().await.expect("event"));
        assert_eq!(names(&list), vec!["a", "z"]);

        other.delete_favorite(&added).await;
        list.apply_event(&events.recv().await.expect("event"));
        assert_eq!(names(&list), vec!["a"]);
    }
}
