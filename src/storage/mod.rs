//! Storage layer for Fedha
//!
//! Typed JSON tables with atomic writes, an insert/update/delete change
//! feed, and the append-only audit log.

pub mod feed;
pub mod file_io;
pub mod init;
pub mod table;

pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, ChangeListener};
pub use file_io::{append_json_line, read_json, read_json_lines, write_json_atomic};
pub use init::{initialize_storage, needs_initialization};
pub use table::{Record, Table};

use std::sync::Arc;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::FedhaPaths;
use crate::error::FedhaResult;
use crate::models::{Budget, Contribution, Expense, Goal, Income, Notification, Profile};

/// Main storage coordinator that provides access to all record tables
pub struct Storage {
    paths: FedhaPaths,
    feed: Arc<ChangeFeed>,
    pub expenses: Table<Expense>,
    pub income: Table<Income>,
    pub budgets: Table<Budget>,
    pub goals: Table<Goal>,
    pub contributions: Table<Contribution>,
    pub profiles: Table<Profile>,
    /// Shared with the notification center, which writes to it from the feed
    pub notifications: Arc<Table<Notification>>,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: FedhaPaths) -> FedhaResult<Self> {
        paths.ensure_directories()?;

        let feed = Arc::new(ChangeFeed::new());

        Ok(Self {
            expenses: Table::with_feed(paths.expenses_file(), feed.clone()),
            income: Table::with_feed(paths.income_file(), feed.clone()),
            budgets: Table::with_feed(paths.budgets_file(), feed.clone()),
            goals: Table::with_feed(paths.goals_file(), feed.clone()),
            contributions: Table::with_feed(paths.contributions_file(), feed.clone()),
            profiles: Table::with_feed(paths.profiles_file(), feed.clone()),
            notifications: Arc::new(Table::new(paths.notifications_file())),
            audit: AuditLogger::new(paths.audit_log()),
            feed,
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &FedhaPaths {
        &self.paths
    }

    /// The change feed every record table publishes to
    pub fn feed(&self) -> &Arc<ChangeFeed> {
        &self.feed
    }

    /// Register a listener for record changes
    pub fn subscribe(&self, listener: Arc<dyn ChangeListener>) {
        self.feed.subscribe(listener);
    }

    /// Load all data from disk
    pub fn load_all(&self) -> FedhaResult<()> {
        self.expenses.load()?;
        self.income.load()?;
        self.budgets.load()?;
        self.goals.load()?;
        self.contributions.load()?;
        self.profiles.load()?;
        self.notifications.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> FedhaResult<()> {
        self.expenses.save()?;
        self.income.save()?;
        self.budgets.save()?;
        self.goals.save()?;
        self.contributions.save()?;
        self.profiles.save()?;
        self.notifications.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Log a create operation
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> FedhaResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Log an update operation
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> FedhaResult<()> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    /// Log a delete operation
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> FedhaResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(temp_dir.path().join("identity").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_audit_helpers_write_log() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let value = serde_json::json!({"name": "Trip"});
        storage
            .log_create(EntityType::Goal, "goal-1", Some("Trip".into()), &value)
            .unwrap();
        storage
            .log_delete(EntityType::Goal, "goal-1", None, &value)
            .unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].operation, Operation::Delete);
    }
}
