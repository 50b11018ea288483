use std::path::Path;
use std::sync::{Arc, RwLock};

use mlca_core::errors::LcaError;

use crate::load::{builtin_tables, load_tables};
use crate::model::TableSet;

/// Holder for the current table snapshot.
///
/// Readers take an `Arc` snapshot and keep it for the whole calculation.
/// Reloading publishes a fresh snapshot; snapshots already handed out are
/// never mutated.
#[derive(Debug)]
pub struct SharedTables {
    current: RwLock<Arc<TableSet>>,
}

impl SharedTables {
    /// Wraps an existing snapshot.
    pub fn new(tables: Arc<TableSet>) -> Self {
        Self {
            current: RwLock::new(tables),
        }
    }

    /// Starts from the built-in tables.
    pub fn from_builtin() -> Result<Self, LcaError> {
        Ok(Self::new(builtin_tables()?))
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<TableSet> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Publishes a new snapshot and returns the one it replaced.
    pub fn publish(&self, tables: TableSet) -> Arc<TableSet> {
        let next = Arc::new(tables);
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tracing::info!(from = %guard.version, to = %next.version, "publishing table snapshot");
        std::mem::replace(&mut *guard, next)
    }

    /// Loads a table file and publishes it; the current snapshot is kept on error.
    pub fn reload_from<P: AsRef<Path>>(&self, path: P) -> Result<Arc<TableSet>, LcaError> {
        let tables = load_tables(path)?;
        self.publish(tables);
        Ok(self.snapshot())
    }
}
