//! Which source repositories are favorited, shared by the coordinator and
//! the writer task.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

/// Favorite counts per source id, plus the record ids already released.
#[derive(Debug, Default)]
pub(crate) struct Membership {
    counts: HashMap<String, usize>,
    released: HashSet<Uuid>,
}

pub(crate) type SharedMembership = Arc<RwLock<Membership>>;

impl Membership {
    pub(crate) fn retain(&mut self, source_id: &str) {
        *self.counts.entry(source_id.to_string()).or_default() += 1;
    }

    /// Drop one reference to `source_id` for a favorite that never got stored.
    pub(crate) fn release_source(&mut self, source_id: &str) {
        if let Some(count) = self.counts.get_mut(source_id) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(source_id);
            }
        }
    }

    /// Drop the reference held by record `id`. Repeat releases are ignored.
    pub(crate) fn release_record(&mut self, id: Uuid, source_id: &str) {
        if self.released.insert(id) {
            self.release_source(source_id);
        }
    }

    pub(crate) fn contains(&self, source_id: &str) -> bool {
        self.counts.contains_key(source_id)
    }

    pub(crate) fn source_ids(&self) -> HashSet<String> {
        self.counts.keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }
}

pub(crate) fn read<T>(shared: &SharedMembership, f: impl FnOnce(&Membership) -> T) -> T {
    f(&shared.read().unwrap_or_else(PoisonError::into_inner))
}

pub(crate) fn write<T>(shared: &SharedMembership, f: impl FnOnce(&mut Membership) -> T) -> T {
    f(&mut shared.write().unwrap_or_else(PoisonError::into_inner))
}
