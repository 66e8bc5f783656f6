use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entity::favorite_repository::{ActiveModel, Column, Entity as FavoriteRepository, Model};

use super::errors::{RepositoryError, Result};
use super::query;

// ─── Single Record Operations ────────────────────────────────────────────────

/// Insert `record` at the end of the list.
///
/// The position is `max + 1`, or `0` for the first favorite; whatever
/// `sort_order` the caller put on the record is replaced. Reading the max and
/// inserting happen in one transaction.
pub async fn insert_next(db: &DatabaseConnection, mut record: Model) -> Result<Model> {
    let txn = db.begin().await?;

    record.sort_order = query::max_order(&txn).await?.map_or(0, |max| max + 1);
    let saved = record.into_insertable().insert(&txn).await?;

    txn.commit().await?;
    Ok(saved)
}

/// Delete a favorite and close the gap it leaves in the ordering.
///
/// Returns the number of rows deleted (0 or 1). Deleting an unknown id is not
/// an error.
pub async fn delete_and_compact(db: &DatabaseConnection, id: Uuid) -> Result<u64> {
    let txn = db.begin().await?;

    let Some(existing) = query::find_by_id(&txn, id).await? else {
        return Ok(0);
    };

    let deleted = FavoriteRepository::delete_by_id(id).exec(&txn).await?;
    let shifted = FavoriteRepository::update_many()
        .col_expr(Column::SortOrder, Expr::col(Column::SortOrder).sub(1))
        .filter(Column::SortOrder.gt(existing.sort_order))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::debug!(
        %id,
        position = existing.sort_order,
        shifted = shifted.rows_affected,
        "Deleted favorite"
    );
    Ok(deleted.rows_affected)
}

/// Replace the editable fields of a favorite.
///
/// # Errors
/// `InvalidInput` if `name` is blank, `NotFound` if the id is unknown.
pub async fn update_details(
    db: &DatabaseConnection,
    id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Model> {
    if name.trim().is_empty() {
        return Err(RepositoryError::InvalidInput {
            message: "name must not be empty".to_string(),
        });
    }

    let existing = query::find_by_id(db, id)
        .await?
        .ok_or_else(|| RepositoryError::not_found_by_id(id))?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(name.to_string());
    active.description = Set(description.map(str::to_string));
    active.update(db).await.map_err(RepositoryError::from)
}
