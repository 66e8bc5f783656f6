//! FavoriteRepository entity - a user-curated, manually ordered saved repository.

use chrono::Utc;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::source::{SourceRepository, repository_url};

/// A favorited repository.
///
/// The record is a snapshot taken at favorite time. Name and description may
/// later be edited by the user and are never re-synced from the source.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favorite_repositories")]
pub struct Model {
    /// Locally generated primary key, distinct from the source id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    // ─── Source Identity ─────────────────────────────────────────────────────
    /// Id of the search result this favorite was created from.
    pub source_id: String,

    // ─── Editable ────────────────────────────────────────────────────────────
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    // ─── Snapshot ────────────────────────────────────────────────────────────
    pub owner_login: String,
    #[sea_orm(column_type = "Text")]
    pub owner_avatar_url: String,
    /// Star count when the repository was favorited.
    pub star_count: i64,

    // ─── Ordering ────────────────────────────────────────────────────────────
    /// Display position, 0-based and dense across all favorites.
    pub sort_order: i32,

    /// When the repository was favorited.
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Text")]
    pub source_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Build a new favorite from a search result at the given position.
    pub fn from_source(source: &SourceRepository, sort_order: i32, web_host: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id: source.id.clone(),
            name: source.name.clone(),
            description: source.description.clone(),
            owner_login: source.owner.login.clone(),
            owner_avatar_url: source.owner.avatar_url.clone(),
            star_count: source.star_count,
            sort_order,
            created_at: Utc::now().fixed_offset(),
            source_url: repository_url(web_host, &source.owner.login, &source.name),
        }
    }

    /// `owner/name`, using the (possibly edited) name.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner_login, self.name)
    }

    /// Convert into an `ActiveModel` with every column set, ready to insert.
    pub fn into_insertable(self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            source_id: Set(self.source_id),
            name: Set(self.name),
            description: Set(self.description),
            owner_login: Set(self.owner_login),
            owner_avatar_url: Set(self.owner_avatar_url),
            star_count: Set(self.star_count),
            sort_order: Set(self.sort_order),
            created_at: Set(self.created_at),
            source_url: Set(self.source_url),
        }
    }
}
