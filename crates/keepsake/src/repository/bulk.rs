use std::collections::{HashMap, HashSet};

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use uuid::Uuid;

use crate::entity::favorite_repository::{Column, Entity as FavoriteRepository, Model};

use super::errors::Result;
use super::query;

// ─── Bulk Operations ─────────────────────────────────────────────────────────

/// Work out which rows need a new position to match `requested`.
///
/// `requested` is the caller's view of the full list. The resulting order is:
/// requested ids that still exist (first occurrence wins), then any existing
/// row the caller did not mention, in its current order. Positions are dense
/// from 0. Only rows whose position actually changes are returned.
pub fn plan_positions(requested: &[Uuid], current: &[Model]) -> Vec<(Uuid, i32)> {
    let existing: HashSet<Uuid> = current.iter().map(|m| m.id).collect();
    let mut placed: HashSet<Uuid> = HashSet::with_capacity(current.len());

    let mut sequence: Vec<Uuid> = requested
        .iter()
        .copied()
        .filter(|id| existing.contains(id) && placed.insert(*id))
        .collect();
    sequence.extend(
        current
            .iter()
            .map(|m| m.id)
            .filter(|id| !placed.contains(id)),
    );

    let positions: HashMap<Uuid, i32> = current.iter().map(|m| (m.id, m.sort_order)).collect();

    sequence
        .into_iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let position = index as i32;
            (positions.get(&id) != Some(&position)).then_some((id, position))
        })
        .collect()
}

/// Rewrite positions so the list matches `ids`.
///
/// Runs in a single transaction: readers see either the old order or the new
/// one. Returns the number of rows whose position changed.
pub async fn reorder(db: &DatabaseConnection, ids: &[Uuid]) -> Result<u64> {
    let txn = db.begin().await?;

    let current = query::find_all_ordered(&txn).await?;
    let plan = plan_positions(ids, &current);

    let mut changed = 0u64;
    for (id, position) in &plan {
        let result = FavoriteRepository::update_many()
            .col_expr(Column::SortOrder, Expr::value(*position))
            .filter(Column::Id.eq(*id))
            .exec(&txn)
            .await?;
        changed += result.rows_affected;
    }

    txn.commit().await?;

    tracing::debug!(
        requested = ids.len(),
        total = current.len(),
        changed,
        "Reordered favorites"
    );
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sample;

    fn models(n: usize) -> Vec<Model> {
        (0..n)
            .map(|i| Model::from_source(&sample(i as i64, &format!("r{i}"), 1), i as i32, "github.com"))
            .collect()
    }

    fn apply(current: &[Model], plan: &[(Uuid, i32)]) -> Vec<Uuid> {
        let mut updated: Vec<(i32, Uuid)> = current
            .iter()
            .map(|m| {
                let pos = plan
                    .iter()
                    .find(|(id, _)| *id == m.id)
                    .map_or(m.sort_order, |(_, p)| *p);
                (pos, m.id)
            })
            .collect();
        updated.sort();
        updated.into_iter().map(|(_, id)| id).collect()
    }

    #[test]
    fn identical_order_needs_no_writes() {
        let current = models(3);
        let ids: Vec<_> = current.iter().map(|m| m.id).collect();
        assert!(plan_positions(&ids, &current).is_empty());
    }

    #[test]
    fn swap_rewrites_both_rows() {
        let current = models(2);
        let ids = vec![current[1].id, current[0].id];
        let plan = plan_positions(&ids, &current);
        assert_eq!(plan, vec![(current[1].id, 0), (current[0].id, 1)]);
    }

    #[test]
    fn stale_ids_are_skipped_and_positions_stay_dense() {
        let current = models(2);
        let ghost = Uuid::new_v4();
        let ids = vec![current[1].id, ghost, current[0].id];

        let plan = plan_positions(&ids, &current);
        assert!(plan.iter().all(|(id, _)| *id != ghost));
        assert_eq!(apply(&current, &plan), ids.iter().copied().filter(|id| *id != ghost).collect::<Vec<_>>());
    }

    #[test]
    fn unmentioned_rows_are_appended_in_current_order() {
        let current = models(3);
        let ids = vec![current[2].id];

        let plan = plan_positions(&ids, &current);
        assert_eq!(
            apply(&current, &plan),
            vec![current[2].id, current[0].id, current[1].id]
        );
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let current = models(2);
        let ids = vec![current[1].id, current[1].id, current[0].id];
        let plan = plan_positions(&ids, &current);
        assert_eq!(apply(&current, &plan), vec![current[1].id, current[0].id]);
    }
}
