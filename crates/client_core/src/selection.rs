//! Source/destination folder selection backed by the persistent store.

use std::sync::Arc;

use anyhow::{Context, Result};
use shared::domain::{FolderPath, FolderRole};
use storage::KeyValueStore;
use tracing::debug;

pub struct FolderSelection {
    store: Arc<dyn KeyValueStore>,
    source: Option<FolderPath>,
    destination: Option<FolderPath>,
}

impl FolderSelection {
    /// Reads both roles from `store`. Missing or empty keys are unselected.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let mut selection = Self {
            store,
            source: None,
            destination: None,
        };
        for role in FolderRole::ALL {
            let saved = selection
                .store
                .get(role.storage_key())
                .await
                .with_context(|| format!("failed to read saved {role} folder"))?
                .filter(|path| !path.is_empty())
                .map(FolderPath::from);
            debug!(%role, selected = saved.is_some(), "loaded saved folder");
            *selection.slot_mut(role) = saved;
        }
        Ok(selection)
    }

    pub fn get(&self, role: FolderRole) -> Option<&FolderPath> {
        match role {
            FolderRole::Source => self.source.as_ref(),
            FolderRole::Destination => self.destination.as_ref(),
        }
    }

    pub fn source(&self) -> Option<&FolderPath> {
        self.source.as_ref()
    }

    pub fn destination(&self) -> Option<&FolderPath> {
        self.destination.as_ref()
    }

    /// First role without a selection, source before destination.
    pub fn missing(&self) -> Option<FolderRole> {
        FolderRole::ALL
            .into_iter()
            .find(|role| self.get(*role).is_none())
    }

    pub fn is_ready(&self) -> bool {
        self.missing().is_none()
    }

    /// Persists `path` for `role`, then updates the cached value.
    ///
    /// The cache is left untouched when the write fails.
    pub async fn select(&mut self, role: FolderRole, path: FolderPath) -> Result<()> {
        self.store
            .set(role.storage_key(), path.as_str())
            .await
            .with_context(|| format!("failed to save {role} folder '{path}'"))?;
        debug!(%role, %path, "folder selected");
        *self.slot_mut(role) = Some(path);
        Ok(())
    }

    fn slot_mut(&mut self, role: FolderRole) -> &mut Option<FolderPath> {
        match role {
            FolderRole::Source => &mut self.source,
            FolderRole::Destination => &mut self.destination,
        }
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
