//! SeaORM entity definitions for the keepsake database schema.

pub mod favorite_repository;
pub mod prelude;
