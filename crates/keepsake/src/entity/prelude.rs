//! Common re-exports for convenient entity usage.

pub use super::favorite_repository::{
    ActiveModel as FavoriteRepositoryActiveModel, Column as FavoriteRepositoryColumn,
    Entity as FavoriteRepository, Model as FavoriteRecord,
};
