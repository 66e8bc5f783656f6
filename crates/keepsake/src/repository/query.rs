use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entity::favorite_repository::{Column, Entity as FavoriteRepository, Model};

use super::errors::{RepositoryError, Result};

// ─── Query Operations ────────────────────────────────────────────────────────

/// All favorites, ascending by display position.
///
/// Ties (only possible after a failed write) fall back to favorite time.
pub async fn find_all_ordered(db: &impl ConnectionTrait) -> Result<Vec<Model>> {
    FavoriteRepository::find()
        .order_by_asc(Column::SortOrder)
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(RepositoryError::from)
}

/// Find a favorite by its local id.
pub async fn find_by_id(db: &impl ConnectionTrait, id: Uuid) -> Result<Option<Model>> {
    FavoriteRepository::find_by_id(id)
        .one(db)
        .await
        .map_err(RepositoryError::from)
}

/// All favorites created from the given source repository id.
pub async fn find_by_source_id(db: &impl ConnectionTrait, source_id: &str) -> Result<Vec<Model>> {
    FavoriteRepository::find()
        .filter(Column::SourceId.eq(source_id))
        .order_by_asc(Column::SortOrder)
        .all(db)
        .await
        .map_err(RepositoryError::from)
}

/// Highest position in use, or `None` when there are no favorites.
pub async fn max_order(db: &impl ConnectionTrait) -> Result<Option<i32>> {
    let top = FavoriteRepository::find()
        .order_by_desc(Column::SortOrder)
        .one(db)
        .await?;
    Ok(top.map(|model| model.sort_order))
}

/// Count favorites.
pub async fn count(db: &impl ConnectionTrait) -> Result<u64> {
    FavoriteRepository::find()
        .count(db)
        .await
        .map_err(RepositoryError::from)
}
