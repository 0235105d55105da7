//! Budget service
//!
//! Monthly spending limits per expense category. `spent` can be set by hand
//! or recomputed from the owner's expenses with [`BudgetService::refresh_spent`].

use crate::audit::EntityType;
use crate::error::{FedhaError, FedhaResult};
use crate::models::{
    Budget, BudgetPeriodKind, ExpenseCategory, Money, Month, Notification, NotificationKind,
    OwnerId,
};
use crate::storage::Storage;

use super::resolve_one;

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
    currency: &'a str,
}

/// Result of recomputing spent amounts
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    pub budgets: Vec<Budget>,
    /// Budgets that went over their limit during this refresh
    pub newly_over: Vec<Budget>,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage, currency: &'a str) -> Self {
        Self { storage, currency }
    }

    /// Create a budget for one category and month (default: this month)
    pub fn create(
        &self,
        owner: OwnerId,
        category: &str,
        limit: Money,
        period: BudgetPeriodKind,
        month: Option<Month>,
    ) -> FedhaResult<Budget> {
        let category = category
            .parse::<ExpenseCategory>()
            .map_err(|e| FedhaError::Validation(e.to_string()))?;
        let month = month.unwrap_or_else(Month::current);

        let budget = Budget::new(owner, category.name(), limit, period, month);
        budget
            .validate()
            .map_err(|e| FedhaError::Validation(e.to_string()))?;

        let exists = self.storage.budgets.find(|b| {
            b.owner == owner && b.month == month && b.category.eq_ignore_ascii_case(&budget.category)
        })?;
        if exists.is_some() {
            return Err(FedhaError::Duplicate {
                entity_type: "Budget",
                identifier: format!("{} {}", budget.category, month),
            });
        }

        self.storage.budgets.insert(budget.clone())?;
        self.storage.budgets.save()?;

        self.storage.log_create(
            EntityType::Budget,
            budget.id.to_string(),
            Some(format!("{} {}", budget.category, budget.month)),
            &budget,
        )?;

        Ok(budget)
    }

    /// The owner's budgets, optionally for one month, ordered by month then category
    pub fn list(&self, owner: OwnerId, month: Option<Month>) -> FedhaResult<Vec<Budget>> {
        let mut budgets = self
            .storage
            .budgets
            .select(|b| b.owner == owner && month.map_or(true, |m| b.month == m))?;
        budgets.sort_by(|a, b| {
            b.month
                .cmp(&a.month)
                .then_with(|| a.category.cmp(&b.category))
        });
        Ok(budgets)
    }

    pub fn find(&self, owner: OwnerId, input: &str) -> FedhaResult<Option<Budget>> {
        let rows = self.storage.budgets.select(|b| b.owner == owner)?;
        resolve_one(rows, input, |b| b.id.matches(input))
    }

    /// Overwrite the spent amount by hand
    pub fn set_spent(&self, owner: OwnerId, input: &str, spent: Money) -> FedhaResult<Budget> {
        if spent.is_negative() {
            return Err(FedhaError::Validation(
                "Spent amount cannot be negative".into(),
            ));
        }

        let before = self
            .find(owner, input)?
            .ok_or_else(|| FedhaError::budget_not_found(input))?;

        let after = self.write_spent(&before, spent)?;
        self.notify_if_newly_over(&before, &after)?;
        Ok(after)
    }

    /// Recompute `spent` from the owner's expenses for every budget in `month`
    /// (all months when `None`). Budgets that cross their limit raise a
    /// budget notification.
    pub fn refresh_spent(&self, owner: OwnerId, month: Option<Month>) -> FedhaResult<RefreshReport> {
        let expenses = self.storage.expenses.select(|e| e.owner == owner)?;
        let mut report = RefreshReport::default();

        for budget in self.list(owner, month)? {
            let spent = Money::checked_sum(
                expenses
                    .iter()
                    .filter(|e| {
                        budget.month.contains(e.date)
                            && e.category.name().eq_ignore_ascii_case(&budget.category)
                    })
                    .map(|e| e.amount),
            )
            .ok_or_else(|| {
                FedhaError::Validation(format!(
                    "{} spending for {} exceeds the largest supported amount",
                    budget.category, budget.month
                ))
            })?;

            let updated = if spent == budget.spent {
                budget.clone()
            } else {
                self.write_spent(&budget, spent)?
            };

            if self.notify_if_newly_over(&budget, &updated)? {
                report.newly_over.push(updated.clone());
            }
            report.budgets.push(updated);
        }

        tracing::debug!(
            budgets = report.budgets.len(),
            over = report.newly_over.len(),
            "budgets refreshed"
        );
        Ok(report)
    }

    pub fn delete(&self, owner: OwnerId, input: &str) -> FedhaResult<Budget> {
        let budget = self
            .find(owner, input)?
            .ok_or_else(|| FedhaError::budget_not_found(input))?;

        self.storage.budgets.delete(budget.id)?;
        self.storage.budgets.save()?;

        self.storage.log_delete(
            EntityType::Budget,
            budget.id.to_string(),
            Some(format!("{} {}", budget.category, budget.month)),
            &budget,
        )?;

        Ok(budget)
    }

    fn write_spent(&self, before: &Budget, spent: Money) -> FedhaResult<Budget> {
        let after = self
            .storage
            .budgets
            .update(before.id, |b| b.set_spent(spent))?
            .ok_or_else(|| FedhaError::budget_not_found(before.id.to_string()))?;
        self.storage.budgets.save()?;

        self.storage.log_update(
            EntityType::Budget,
            after.id.to_string(),
            Some(format!("{} {}", after.category, after.month)),
            before,
            &after,
        )?;

        Ok(after)
    }

    fn notify_if_newly_over(&self, before: &Budget, after: &Budget) -> FedhaResult<bool> {
        if before.is_over_budget() || !after.is_over_budget() {
            return Ok(false);
        }

        let over = after.spent - after.limit;
        let notification = Notification::new(
            after.owner,
            NotificationKind::Budget,
            "Budget Exceeded",
            format!(
                "{} budget for {} is over by {} ({} of {})",
                after.category,
                after.month.label(),
                over.format_with_currency(self.currency),
                after.spent.format_with_currency(self.currency),
                after.limit.format_with_currency(self.currency),
            ),
        );
        self.storage.notifications.insert(notification)?;
        self.storage.notifications.save()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FedhaPaths;
    use crate::models::Expense;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn jan() -> Month {
        Month::new(2025, 1).unwrap()
    }

    fn add_expense(storage: &Storage, owner: OwnerId, cents: i64, cat: ExpenseCategory, day: NaiveDate) {
        storage
            .expenses
            .insert(Expense::new(owner, Money::from_cents(cents), cat, day))
            .unwrap();
    }

    #[test]
    fn test_create_and_duplicate() {
        let (_temp, storage) = create_test_storage();
        let service = BudgetService::new(&storage, "KES");
        let owner = OwnerId::new();

        let budget = service
            .create(owner, "food", Money::from_cents(1_000_000), BudgetPeriodKind::Monthly, Some(jan()))
            .unwrap();
        assert_eq!(budget.category, "Food");
        assert_eq!(budget.month, jan());

        let err = service
            .create(owner, "Food", Money::from_cents(5), BudgetPeriodKind::Monthly, Some(jan()))
            .unwrap_err();
        assert!(matches!(err, FedhaError::Duplicate { .. }));

        // another owner may budget the same category
        service
            .create(OwnerId::new(), "Food", Money::from_cents(5), BudgetPeriodKind::Monthly, Some(jan()))
            .unwrap();
    }

    #[test]
    fn test_create_validation() {
        let (_temp, storage) = create_test_storage();
        let service = BudgetService::new(&storage, "KES");
        let owner = OwnerId::new();

        assert!(service
            .create(owner, "Rent", Money::from_cents(5), BudgetPeriodKind::Monthly, None)
            .unwrap_err()
            .is_validation());
        assert!(service
            .create(owner, "Food", Money::zero(), BudgetPeriodKind::Monthly, None)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_set_spent_over_limit_notifies_once() {
        let (_temp, storage) = create_test_storage();
        let service = BudgetService::new(&storage, "KES");
        let owner = OwnerId::new();
        let budget = service
            .create(owner, "Bills", Money::from_cents(10_000), BudgetPeriodKind::Monthly, Some(jan()))
            .unwrap();
        let id = budget.id.to_string();

        let updated = service.set_spent(owner, &id, Money::from_cents(4_000)).unwrap();
        assert_eq!(updated.remaining().cents(), 6_000);
        assert!(storage.notifications.is_empty().unwrap());

        service.set_spent(owner, &id, Money::from_cents(12_000)).unwrap();
        service.set_spent(owner, &id, Money::from_cents(13_000)).unwrap();

        let notes = storage.notifications.all().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Budget);
        assert!(notes[0].message.contains("KES 20.00"));
    }

    #[test]
    fn test_refresh_spent_from_expenses() {
        let (_temp, storage) = create_test_storage();
        let service = BudgetService::new(&storage, "KES");
        let owner = OwnerId::new();
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();

        service
            .create(owner, "Food", Money::from_cents(10_000), BudgetPeriodKind::Monthly, Some(jan()))
            .unwrap();
        service
            .create(owner, "Transport", Money::from_cents(10_000), BudgetPeriodKind::Monthly, Some(jan()))
            .unwrap();

        add_expense(&storage, owner, 6_000, ExpenseCategory::Food, d(3));
        add_expense(&storage, owner, 5_000, ExpenseCategory::Food, d(20));
        add_expense(&storage, owner, 2_000, ExpenseCategory::Transport, d(4));
        // outside the month, other category, other owner
        add_expense(&storage, owner, 9_999, ExpenseCategory::Food, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        add_expense(&storage, owner, 9_999, ExpenseCategory::Bills, d(5));
        add_expense(&storage, OwnerId::new(), 9_999, ExpenseCategory::Food, d(5));

        let report = service.refresh_spent(owner, Some(jan())).unwrap();
        assert_eq!(report.budgets.len(), 2);
        assert_eq!(report.newly_over.len(), 1);
        assert_eq!(report.newly_over[0].category, "Food");

        let food = report.budgets.iter().find(|b| b.category == "Food").unwrap();
        assert_eq!(food.spent.cents(), 11_000);
        let transport = report.budgets.iter().find(|b| b.category == "Transport").unwrap();
        assert_eq!(transport.spent.cents(), 2_000);

        // second refresh changes nothing and does not notify again
        let again = service.refresh_spent(owner, Some(jan())).unwrap();
        assert!(again.newly_over.is_empty());
        assert_eq!(storage.notifications.len().unwrap(), 1);
    }

    #[test]
    fn test_refresh_spent_rejects_overflowing_total() {
        let (_temp, storage) = create_test_storage();
        let service = BudgetService::new(&storage, "KES");
        let owner = OwnerId::new();
        let d = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();

        let budget = service
            .create(owner, "Food", Money::from_cents(10_000), BudgetPeriodKind::Monthly, Some(jan()))
            .unwrap();
        add_expense(&storage, owner, Money::MAX.cents(), ExpenseCategory::Food, d);
        add_expense(&storage, owner, Money::MAX.cents(), ExpenseCategory::Food, d);

        assert!(service
            .refresh_spent(owner, Some(jan()))
            .unwrap_err()
            .is_validation());
        let stored = service.find(owner, &budget.id.to_string()).unwrap().unwrap();
        assert!(stored.spent.is_zero());
        assert!(storage.notifications.is_empty().unwrap());
    }

    #[test]
    fn test_list_and_delete() {
        let (_temp, storage) = create_test_storage();
        let service = BudgetService::new(&storage, "KES");
        let owner = OwnerId::new();
        let feb = Month::new(2025, 2).unwrap();

        let a = service
            .create(owner, "Food", Money::from_cents(1), BudgetPeriodKind::Monthly, Some(jan()))
            .unwrap();
        service
            .create(owner, "Food", Money::from_cents(1), BudgetPeriodKind::Weekly, Some(feb))
            .unwrap();

        assert_eq!(service.list(owner, None).unwrap()[0].month, feb);
        assert_eq!(service.list(owner, Some(jan())).unwrap().len(), 1);

        service.delete(owner, &a.id.to_string()).unwrap();
        assert!(service.list(owner, Some(jan())).unwrap().is_empty());
    }
}
