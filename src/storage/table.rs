//! Typed record tables
//!
//! Each table is one JSON file holding a list of rows. Rows are kept in
//! memory behind an `RwLock`; callers persist explicitly with [`Table::save`]
//! after a write, the same way every repository in this crate works.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{FedhaError, FedhaResult};
use crate::models::{
    Budget, BudgetId, Contribution, ContributionId, Expense, ExpenseId, Goal, GoalId, Income,
    IncomeId, Notification, NotificationId, OtpChallenge, PasswordAccount, AccountId,
    PhoneAccount, PhoneUid, Profile, ConfirmationId,
};

use super::feed::{ChangeEvent, ChangeFeed, ChangeKind};
use super::file_io::{read_json, write_json_atomic};

/// A row type stored in a [`Table`]
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync {
    type Id: Copy + PartialEq + fmt::Display;

    /// Table name used in change events and messages
    const TABLE: &'static str;

    fn id(&self) -> Self::Id;
}

macro_rules! impl_record {
    ($ty:ty, $id:ty, $table:literal, $field:ident) => {
        impl Record for $ty {
            type Id = $id;
            const TABLE: &'static str = $table;

            fn id(&self) -> $id {
                self.$field
            }
        }
    };
}

impl_record!(Expense, ExpenseId, "expenses", id);
impl_record!(Income, IncomeId, "income", id);
impl_record!(Budget, BudgetId, "budgets", id);
impl_record!(Goal, GoalId, "goals", id);
impl_record!(Contribution, ContributionId, "contributions", id);
impl_record!(Profile, AccountId, "profiles", id);
impl_record!(Notification, NotificationId, "notifications", id);
impl_record!(PasswordAccount, AccountId, "password_accounts", id);
impl_record!(PhoneAccount, PhoneUid, "phone_accounts", uid);
impl_record!(OtpChallenge, ConfirmationId, "otp_challenges", id);

#[derive(Serialize, Deserialize)]
#[serde(bound = "R: Record")]
struct TableFile<R> {
    #[serde(default)]
    rows: Vec<R>,
}

impl<R> Default for TableFile<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

/// A persisted list of rows of one type
pub struct Table<R: Record> {
    path: PathBuf,
    rows: RwLock<Vec<R>>,
    feed: Option<Arc<ChangeFeed>>,
}

impl<R: Record> Table<R> {
    /// Create a table that does not publish change events
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            rows: RwLock::new(Vec::new()),
            feed: None,
        }
    }

    /// Create a table that publishes every write to `feed`
    pub fn with_feed(path: PathBuf, feed: Arc<ChangeFeed>) -> Self {
        Self {
            path,
            rows: RwLock::new(Vec::new()),
            feed: Some(feed),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load rows from disk, replacing what is in memory
    pub fn load(&self) -> FedhaResult<()> {
        let file: TableFile<R> = read_json(&self.path)?;
        let mut rows = self.write_lock()?;
        *rows = file.rows;
        Ok(())
    }

    /// Save rows to disk
    pub fn save(&self) -> FedhaResult<()> {
        let rows = self.read_lock()?;
        let file = TableFile { rows: rows.clone() };
        write_json_atomic(&self.path, &file)
    }

    /// All rows in insertion order
    pub fn all(&self) -> FedhaResult<Vec<R>> {
        Ok(self.read_lock()?.clone())
    }

    /// Rows matching a predicate, in insertion order
    pub fn select<F>(&self, predicate: F) -> FedhaResult<Vec<R>>
    where
        F: Fn(&R) -> bool,
    {
        Ok(self
            .read_lock()?
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect())
    }

    /// First row matching a predicate
    pub fn find<F>(&self, predicate: F) -> FedhaResult<Option<R>>
    where
        F: Fn(&R) -> bool,
    {
        Ok(self.read_lock()?.iter().find(|r| predicate(r)).cloned())
    }

    pub fn get(&self, id: R::Id) -> FedhaResult<Option<R>> {
        self.find(|r| r.id() == id)
    }

    pub fn len(&self) -> FedhaResult<usize> {
        Ok(self.read_lock()?.len())
    }

    pub fn is_empty(&self) -> FedhaResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Insert a new row; a row with the same ID is a duplicate
    pub fn insert(&self, row: R) -> FedhaResult<()> {
        {
            let mut rows = self.write_lock()?;
            if rows.iter().any(|r| r.id() == row.id()) {
                return Err(FedhaError::Duplicate {
                    entity_type: R::TABLE,
                    identifier: row.id().to_string(),
                });
            }
            rows.push(row.clone());
        }
        self.publish(ChangeKind::Insert, &row);
        Ok(())
    }

    /// Apply `change` to the row with `id` and return the updated row
    pub fn update<F>(&self, id: R::Id, change: F) -> FedhaResult<Option<R>>
    where
        F: FnOnce(&mut R),
    {
        let updated = {
            let mut rows = self.write_lock()?;
            match rows.iter_mut().find(|r| r.id() == id) {
                Some(row) => {
                    change(row);
                    Some(row.clone())
                }
                None => None,
            }
        };

        if let Some(row) = &updated {
            self.publish(ChangeKind::Update, row);
        }
        Ok(updated)
    }

    /// Delete the row with `id`, returning it if it existed
    pub fn delete(&self, id: R::Id) -> FedhaResult<Option<R>> {
        let removed = {
            let mut rows = self.write_lock()?;
            rows.iter()
                .position(|r| r.id() == id)
                .map(|index| rows.remove(index))
        };

        if let Some(row) = &removed {
            self.publish(ChangeKind::Delete, row);
        }
        Ok(removed)
    }

    /// Delete every row matching a predicate, returning the removed rows
    pub fn delete_where<F>(&self, predicate: F) -> FedhaResult<Vec<R>>
    where
        F: Fn(&R) -> bool,
    {
        let removed: Vec<R> = {
            let mut rows = self.write_lock()?;
            let (gone, kept): (Vec<R>, Vec<R>) = rows.drain(..).partition(|r| predicate(r));
            *rows = kept;
            gone
        };

        for row in &removed {
            self.publish(ChangeKind::Delete, row);
        }
        Ok(removed)
    }

    fn publish(&self, kind: ChangeKind, row: &R) {
        let Some(feed) = &self.feed else {
            return;
        };
        match serde_json::to_value(row) {
            Ok(value) => feed.publish(ChangeEvent {
                table: R::TABLE,
                kind,
                row: value,
            }),
            Err(e) => tracing::warn!(table = R::TABLE, error = %e, "could not encode change"),
        }
    }

    fn read_lock(&self) -> FedhaResult<std::sync::RwLockReadGuard<'_, Vec<R>>> {
        self.rows
            .read()
            .map_err(|e| FedhaError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_lock(&self) -> FedhaResult<std::sync::RwLockWriteGuard<'_, Vec<R>>> {
        self.rows
            .write()
            .map_err(|e| FedhaError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, Money, OwnerId};
    use crate::storage::feed::ChangeListener;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn expense(owner: OwnerId, cents: i64) -> Expense {
        Expense::new(
            owner,
            Money::from_cents(cents),
            ExpenseCategory::Food,
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
        )
    }

    #[test]
    fn test_insert_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("expenses.json");
        let owner = OwnerId::new();

        {
            let table: Table<Expense> = Table::new(path.clone());
            table.insert(expense(owner, 500)).unwrap();
            table.insert(expense(owner, 700)).unwrap();
            table.save().unwrap();
        }

        let table: Table<Expense> = Table::new(path);
        table.load().unwrap();
        assert_eq!(table.len().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let table: Table<Expense> = Table::new(temp_dir.path().join("e.json"));
        let row = expense(OwnerId::new(), 500);

        table.insert(row.clone()).unwrap();
        let err = table.insert(row).unwrap_err();
        assert!(matches!(err, FedhaError::Duplicate { .. }));
    }

    #[test]
    fn test_update_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let table: Table<Expense> = Table::new(temp_dir.path().join("e.json"));
        let row = expense(OwnerId::new(), 500);
        let id = row.id;
        table.insert(row).unwrap();

        let updated = table
            .update(id, |e| e.amount = Money::from_cents(900))
            .unwrap()
            .unwrap();
        assert_eq!(updated.amount.cents(), 900);

        assert!(table.delete(id).unwrap().is_some());
        assert!(table.delete(id).unwrap().is_none());
        assert!(table.is_empty().unwrap());
    }

    #[test]
    fn test_delete_where() {
        let temp_dir = TempDir::new().unwrap();
        let table: Table<Expense> = Table::new(temp_dir.path().join("e.json"));
        let a = OwnerId::new();
        let b = OwnerId::new();
        table.insert(expense(a, 1)).unwrap();
        table.insert(expense(b, 2)).unwrap();
        table.insert(expense(a, 3)).unwrap();

        let removed = table.delete_where(|e| e.owner == a).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(table.all().unwrap()[0].owner, b);
    }

    struct Counter(Mutex<Vec<(String, ChangeKind)>>);

    impl ChangeListener for Counter {
        fn wants(&self, _table: &str, _kind: ChangeKind) -> bool {
            true
        }

        fn on_change(&self, event: &ChangeEvent) -> FedhaResult<()> {
            self.0
                .lock()
                .unwrap()
                .push((event.table.to_string(), event.kind));
            Ok(())
        }
    }

    #[test]
    fn test_writes_publish_events() {
        let temp_dir = TempDir::new().unwrap();
        let feed = Arc::new(ChangeFeed::new());
        let counter = Arc::new(Counter(Mutex::new(Vec::new())));
        feed.subscribe(counter.clone());

        let table: Table<Expense> = Table::with_feed(temp_dir.path().join("e.json"), feed);
        let row = expense(OwnerId::new(), 500);
        let id = row.id;
        table.insert(row).unwrap();
        table.delete(id).unwrap();

        let seen = counter.0.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("expenses".to_string(), ChangeKind::Insert),
                ("expenses".to_string(), ChangeKind::Delete)
            ]
        );
    }
}
