//! Append-only audit log
//!
//! One JSON line per entry. The file is never rewritten; readers load the
//! whole log and slice it.

use std::path::PathBuf;

use crate::error::FedhaResult;
use crate::storage::file_io::{append_json_line, read_json_lines};

use super::entry::{AuditEntry, EntityType};

pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    pub fn log(&self, entry: &AuditEntry) -> FedhaResult<()> {
        append_json_line(&self.log_path, entry)
    }

    /// Every entry, oldest first
    pub fn read_all(&self) -> FedhaResult<Vec<AuditEntry>> {
        read_json_lines(&self.log_path)
    }

    /// The last `count` entries, optionally only those about one entity type
    pub fn read_recent(
        &self,
        count: usize,
        entity_type: Option<EntityType>,
    ) -> FedhaResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        if let Some(wanted) = entity_type {
            entries.retain(|e| e.entity_type == wanted);
        }
        let skip = entries.len().saturating_sub(count);
        Ok(entries.split_off(skip))
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{EntityType, Operation};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();

        let entry = AuditEntry::create(
            EntityType::Expense,
            "exp-12345678",
            None,
            &json!({"amount": 500}),
        );
        logger.log(&entry).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].entity_type, EntityType::Expense);
    }

    #[test]
    fn test_read_recent() {
        let (logger, _temp) = create_test_logger();

        for i in 0..10 {
            let entry = AuditEntry::create(
                EntityType::Income,
                format!("inc-{}", i),
                None,
                &json!({"index": i}),
            );
            logger.log(&entry).unwrap();
        }

        let recent = logger.read_recent(3, None).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].entity_id, "inc-7");
        assert_eq!(recent[2].entity_id, "inc-9");
    }

    #[test]
    fn test_read_recent_by_entity_type() {
        let (logger, _temp) = create_test_logger();

        logger
            .log(&AuditEntry::create(EntityType::Goal, "goal-1", None, &json!({})))
            .unwrap();
        logger
            .log(&AuditEntry::create(EntityType::Expense, "exp-1", None, &json!({})))
            .unwrap();
        logger
            .log(&AuditEntry::create(EntityType::Goal, "goal-2", None, &json!({})))
            .unwrap();

        let goals = logger.read_recent(10, Some(EntityType::Goal)).unwrap();
        let ids: Vec<_> = goals.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["goal-1", "goal-2"]);
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();
        assert!(logger.read_all().unwrap().is_empty());
    }
}
