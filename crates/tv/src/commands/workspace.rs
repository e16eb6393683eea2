//! The loaded task file plus the registries commands evaluate against.

use std::path::PathBuf;

use taskview_core::{TaskSnapshot, TaskStore};
use taskview_model::models::{PriorityConfig, PriorityRegistry, StatusConfig, StatusRegistry};

use super::config::Config;
use super::Result;

/// A task snapshot bound to the store it was loaded from.
///
/// Status and priority lists from the config file take precedence over the
/// lists stored in the snapshot. They are never written back to the file.
#[derive(Debug)]
pub struct Workspace {
    store: TaskStore,
    snapshot: TaskSnapshot,
    statuses: Vec<StatusConfig>,
    priorities: Vec<PriorityConfig>,
}

impl Workspace {
    /// Resolves the task file: `--store`, then `[store] path`, then the data dir.
    pub fn resolve_store(flag: Option<PathBuf>, config: &Config) -> Result<TaskStore> {
        match flag.or_else(|| config.store.path.clone()) {
            Some(path) => Ok(TaskStore::with_path(path)),
            None => Ok(TaskStore::new()?),
        }
    }

    /// Loads the snapshot, treating a missing file as empty.
    pub async fn open(store: TaskStore, config: &Config) -> Result<Self> {
        let snapshot = store.load_or_default_async().await?;
        tracing::debug!(
            path = %store.path().display(),
            tasks = snapshot.tasks.len(),
            views = snapshot.saved_views.len(),
            "loaded task file"
        );
        Ok(Self::from_parts(store, snapshot, config))
    }

    pub fn from_parts(store: TaskStore, snapshot: TaskSnapshot, config: &Config) -> Self {
        Self {
            store,
            snapshot,
            statuses: config.statuses.clone(),
            priorities: config.priorities.clone(),
        }
    }

    pub fn snapshot(&self) -> &TaskSnapshot {
        &self.snapshot
    }

    pub fn snapshot_mut(&mut self) -> &mut TaskSnapshot {
        &mut self.snapshot
    }

    pub fn status_registry(&self) -> StatusRegistry {
        if self.statuses.is_empty() {
            self.snapshot.status_registry()
        } else {
            StatusRegistry::new(self.statuses.clone())
        }
    }

    pub fn priority_registry(&self) -> PriorityRegistry {
        if self.priorities.is_empty() {
            self.snapshot.priority_registry()
        } else {
            PriorityRegistry::new(self.priorities.clone())
        }
    }

    /// Stamps and writes the snapshot back to its file.
    pub async fn save(&mut self) -> Result<()> {
        self.snapshot.touch();
        self.store.save_async(&self.snapshot).await?;
        tracing::debug!(path = %self.store.path().display(), "saved task file");
        Ok(())
    }
}
