//! Income service

use chrono::{Local, NaiveDate};

use crate::audit::EntityType;
use crate::error::{FedhaError, FedhaResult};
use crate::models::{Income, Money, OwnerId};
use crate::storage::Storage;

use super::resolve_one;

/// Service for income management
pub struct IncomeService<'a> {
    storage: &'a Storage,
}

impl<'a> IncomeService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record income. `date` defaults to today and may not be later.
    pub fn add(
        &self,
        owner: OwnerId,
        amount: Money,
        source: &str,
        date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> FedhaResult<Income> {
        let today = Local::now().date_naive();
        let income = Income::new(owner, amount, source, date.unwrap_or(today)).with_notes(notes);

        income
            .validate(today)
            .map_err(|e| FedhaError::Validation(e.to_string()))?;

        self.storage.income.insert(income.clone())?;
        self.storage.income.save()?;

        self.storage.log_create(
            EntityType::Income,
            income.id.to_string(),
            Some(income.source.clone()),
            &income,
        )?;

        tracing::debug!(id = %income.id, amount = %income.amount, "income added");
        Ok(income)
    }

    /// The owner's income, newest date first.
    ///
    /// `source` keeps rows whose source contains the text, ignoring case.
    pub fn list(&self, owner: OwnerId, source: Option<&str>) -> FedhaResult<Vec<Income>> {
        let mut income = self.storage.income.select(|i| i.owner == owner)?;

        if let Some(needle) = source.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
            income.retain(|i| i.source.to_lowercase().contains(&needle));
        }

        income.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(income)
    }

    pub fn find(&self, owner: OwnerId, input: &str) -> FedhaResult<Option<Income>> {
        let rows = self.storage.income.select(|i| i.owner == owner)?;
        resolve_one(rows, input, |i| i.id.matches(input))
    }

    pub fn delete(&self, owner: OwnerId, input: &str) -> FedhaResult<Income> {
        let income = self
            .find(owner, input)?
            .ok_or_else(|| FedhaError::income_not_found(input))?;

        self.storage.income.delete(income.id)?;
        self.storage.income.save()?;

        self.storage.log_delete(
            EntityType::Income,
            income.id.to_string(),
            Some(income.source.clone()),
            &income,
        )?;

        Ok(income)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FedhaPaths;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_add_requires_source() {
        let (_temp, storage) = create_test_storage();
        let service = IncomeService::new(&storage);

        let err = service
            .add(OwnerId::new(), Money::from_cents(100), "   ", None, None)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_list_filters_by_source() {
        let (_temp, storage) = create_test_storage();
        let service = IncomeService::new(&storage);
        let owner = OwnerId::new();
        let yesterday = Local::now().date_naive() - Duration::days(1);

        service
            .add(owner, Money::from_cents(5_000_000), "Salary", Some(yesterday), None)
            .unwrap();
        service
            .add(owner, Money::from_cents(800_000), "Freelance design", None, None)
            .unwrap();

        let all = service.list(owner, None).unwrap();
        assert_eq!(all[0].source, "Freelance design");

        let salary = service.list(owner, Some("salary")).unwrap();
        assert_eq!(salary.len(), 1);
        assert_eq!(salary[0].amount.cents(), 5_000_000);
    }

    #[test]
    fn test_delete() {
        let (_temp, storage) = create_test_storage();
        let service = IncomeService::new(&storage);
        let owner = OwnerId::new();

        let income = service
            .add(owner, Money::from_cents(100), "Gift", None, Some("from aunt".into()))
            .unwrap();
        let removed = service.delete(owner, &income.id.to_string()).unwrap();
        assert_eq!(removed.notes.as_deref(), Some("from aunt"));
        assert!(service.delete(owner, &income.id.to_string()).unwrap_err().is_not_found());
    }
}
