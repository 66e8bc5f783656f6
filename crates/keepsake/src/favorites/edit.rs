//! Editing a favorite's name and description.

use thiserror::Error;

use crate::entity::favorite_repository::Model as FavoriteRecord;

use super::coordinator::FavoritesCoordinator;
use super::writer::Pending;

/// Where an [`EditSession`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    /// Fields match the persisted record.
    Clean,
    /// At least one trimmed field differs from the persisted record.
    Dirty,
    Saved,
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("name must not be empty")]
    InvalidName,

    #[error("discarding unsaved changes needs confirmation")]
    ConfirmationRequired,

    #[error("edit session is already finished")]
    Finished,
}

/// A pending edit of one favorite.
///
/// Changes are held locally until [`save`](Self::save); nothing is written
/// before then, and nothing at all if the session is discarded.
#[derive(Debug, Clone)]
pub struct EditSession {
    record: FavoriteRecord,
    name: String,
    description: String,
    state: EditState,
}

impl EditSession {
    pub fn new(record: FavoriteRecord) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            record,
            state: EditState::Clean,
        }
    }

    pub fn record(&self) -> &FavoriteRecord {
        &self.record
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), EditError> {
        self.ensure_open()?;
        self.name = name.into();
        self.revalidate();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), EditError> {
        self.ensure_open()?;
        self.description = description.into();
        self.revalidate();
        Ok(())
    }

    /// Whether the current name may be saved.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.state == EditState::Dirty
    }

    /// Abandon the edit. A dirty session needs `confirmed`.
    pub fn discard(&mut self, confirmed: bool) -> Result<(), EditError> {
        self.ensure_open()?;
        if self.is_dirty() && !confirmed {
            return Err(EditError::ConfirmationRequired);
        }
        self.state = EditState::Discarded;
        Ok(())
    }

    /// Trim both fields and queue them for persistence.
    ///
    /// The returned [`Pending`] resolves to the updated record, or `None` if
    /// storage rejected the write.
    pub fn save(
        &mut self,
        coordinator: &FavoritesCoordinator,
    ) -> Result<Pending<Option<FavoriteRecord>>, EditError> {
        self.ensure_open()?;
        if !self.is_valid() {
            return Err(EditError::InvalidName);
        }

        let name = self.name.trim().to_string();
        let description = normalized_description(&self.description);
        self.record.name.clone_from(&name);
        self.record.description.clone_from(&description);
        self.name.clone_from(&name);
        self.description = description.clone().unwrap_or_default();
        self.state = EditState::Saved;

        tracing::debug!(id = %self.record.id, name = %name, "Saving favorite edit");
        Ok(coordinator.update_favorite(self.record.id, name, description))
    }

    fn ensure_open(&self) -> Result<(), EditError> {
        match self.state {
            EditState::Saved | EditState::Discarded => Err(EditError::Finished),
            EditState::Clean | EditState::Dirty => Ok(()),
        }
    }

    fn revalidate(&mut self) {
        let stored_description = self.record.description.as_deref().unwrap_or("");
        let changed = self.name.trim() != self.record.name
            || self.description.trim() != stored_description.trim();
        self.state = if changed {
            EditState::Dirty
        } else {
            EditState::Clean
        };
    }
}

fn normalized_description(description: &str) -> Option<String> {
    let trimmed = description.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
