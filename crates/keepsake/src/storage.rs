//! The favorites storage engine.
//!
//! [`FavoritesStorage`] is the durable side of the favorites core: the single
//! source of truth for records and their order. Favorites are best-effort
//! local data, so the contract is fail-soft. Failures are logged and degrade
//! to an empty list or a skipped write, never to an error the user sees.
//! After a failed write the in-memory view can disagree with the database
//! until the next successful write or a restart reload.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::entity::favorite_repository::Model as FavoriteRecord;
use crate::repository;
use crate::source::{DEFAULT_WEB_HOST, SourceRepository};

/// Durable CRUD and ordering over favorite records.
#[async_trait]
pub trait FavoritesStorage: Send + Sync {
    /// All favorites, ascending by position. Empty on failure.
    async fn list_all(&self) -> Vec<FavoriteRecord>;

    /// Persist a new favorite at the end of the list.
    ///
    /// Returns `None` when the write failed.
    async fn add(&self, source: &SourceRepository) -> Option<FavoriteRecord>;

    /// Remove a favorite and close the gap. Unknown ids are ignored.
    async fn delete(&self, id: Uuid);

    /// Renumber positions to match the order of `records`, atomically.
    async fn reorder(&self, records: &[FavoriteRecord]);

    /// Replace a favorite's name and description.
    ///
    /// Returns the updated record, or `None` when the write failed.
    async fn update_details(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Option<FavoriteRecord>;
}

/// Storage engine backed by a sea-orm database.
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Arc<DatabaseConnection>,
    web_host: String,
}

impl DatabaseStorage {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            web_host: DEFAULT_WEB_HOST.to_string(),
        }
    }

    /// Host used to build `source_url` for new favorites.
    #[must_use]
    pub fn with_web_host(mut self, web_host: impl Into<String>) -> Self {
        self.web_host = web_host.into();
        self
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn soften<T>(operation: &'static str, result: repository::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(operation, error = %e, "Favorites storage operation failed");
            None
        }
    }
}

#[async_trait]
impl FavoritesStorage for DatabaseStorage {
    async fn list_all(&self) -> Vec<FavoriteRecord> {
        soften("list_all", repository::find_all_ordered(self.db.as_ref()).await).unwrap_or_default()
    }

    async fn add(&self, source: &SourceRepository) -> Option<FavoriteRecord> {
        let record = FavoriteRecord::from_source(source, 0, &self.web_host);
        let saved = soften("add", repository::insert_next(&self.db, record).await)?;
        tracing::debug!(
            id = %saved.id,
            source_id = %saved.source_id,
            position = saved.sort_order,
            "Added favorite"
        );
        Some(saved)
    }

    async fn delete(&self, id: Uuid) {
        soften("delete", repository::delete_and_compact(&self.db, id).await);
    }

    async fn reorder(&self, records: &[FavoriteRecord]) {
        let ids: Vec<Uuid> = records.iter().map(|record| record.id).collect();
        soften("reorder", repository::reorder(&self.db, &ids).await);
    }

    async fn update_details(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Option<FavoriteRecord> {
        soften(
            "update_details",
            repository::update_details(&self.db, id, name, description).await,
        )
    }
}


#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod tests {
    use super::*;
    use crate::connect_and_migrate;
    use crate::source::sample;

    async fn storage() -> DatabaseStorage {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate");
        DatabaseStorage::new(Arc::new(db))
    }

    #[tokio::test]
    async fn add_assigns_dense_positions() {
        let storage = storage().await;
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            let record = storage
                .add(&sample(i as i64, name, 1))
                .await
                .expect("add should persist");
            assert_eq!(record.sort_order, i as i32);
        }

        let orders: Vec<_> = storage.list_all().await.iter().map(|r| r.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn web_host_is_used_for_source_url() {
        let storage = storage().await.with_web_host("git.example.com");
        let record = storage.add(&sample(1, "repo", 1)).await.expect("add");
        assert_eq!(record.source_url, "https://git.example.com/octocat/repo");
    }

    #[tokio::test]
    async fn reorder_matches_given_sequence() {
        let storage = storage().await;
        storage.add(&sample(1, "First", 1)).await.expect("add");
        storage.add(&sample(2, "Second", 1)).await.expect("add");

        let mut favorites = storage.list_all().await;
        favorites.swap(0, 1);
        storage.reorder(&favorites).await;

        let updated = storage.list_all().await;
        assert_eq!(updated[0].name, "Second");
        assert_eq!(updated[1].name, "First");
        assert_eq!(updated[0].sort_order, 0);
        assert_eq!(updated[1].sort_order, 1);
    }

    #[tokio::test]
    async fn failures_degrade_instead_of_erroring() {
        use sea_orm::{ConnectionTrait, Statement};

        let storage = storage().await;
        storage.add(&sample(1, "a", 1)).await.expect("add");

        let backend = storage.connection().get_database_backend();
        storage
            .connection()
            .execute(Statement::from_string(
                backend,
                "DROP TABLE favorite_repositories".to_string(),
            ))
            .await
            .expect("drop table");

        assert!(storage.list_all().await.is_empty());
        assert!(storage.add(&sample(2, "b", 1)).await.is_none());
        storage.delete(Uuid::new_v4()).await;
        assert!(storage.update_details(Uuid::new_v4(), "x", None).await.is_none());
    }
}
