//! Favorites table queries.
//!
//! Fallible building blocks over a sea-orm connection. Every multi-row write
//! runs inside a transaction so readers never observe a half-applied order.
//! The fail-soft storage contract lives one level up in [`crate::storage`].

mod bulk;
mod errors;
mod query;
mod single;

pub use bulk::{plan_positions, reorder};
pub use errors::{RepositoryError, Result};
pub use query::{count, find_all_ordered, find_by_id, find_by_source_id, max_order};
pub use single::{delete_and_compact, insert_next, update_details};
