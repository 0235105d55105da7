//! Expense service
//!
//! Add, list and delete the signed-in user's expenses.

use chrono::{Local, NaiveDate};

use crate::audit::EntityType;
use crate::error::{FedhaError, FedhaResult};
use crate::models::{Expense, ExpenseCategory, Money, OwnerId};
use crate::storage::Storage;

use super::resolve_one;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record an expense. `date` defaults to today and may not be later.
    pub fn add(
        &self,
        owner: OwnerId,
        amount: Money,
        category: ExpenseCategory,
        date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> FedhaResult<Expense> {
        let today = Local::now().date_naive();
        let expense =
            Expense::new(owner, amount, category, date.unwrap_or(today)).with_notes(notes);

        expense
            .validate(today)
            .map_err(|e| FedhaError::Validation(e.to_string()))?;

        self.storage.expenses.insert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.category.to_string()),
            &expense,
        )?;

        tracing::debug!(id = %expense.id, amount = %expense.amount, "expense added");
        Ok(expense)
    }

    /// The owner's expenses, newest date first, optionally one category only
    pub fn list(
        &self,
        owner: OwnerId,
        category: Option<ExpenseCategory>,
    ) -> FedhaResult<Vec<Expense>> {
        let mut expenses = self.storage.expenses.select(|e| e.owner == owner)?;
        if let Some(category) = category {
            expenses.retain(|e| e.category == category);
        }
        expenses.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(expenses)
    }

    /// Find one of the owner's expenses by full or short ID
    pub fn find(&self, owner: OwnerId, input: &str) -> FedhaResult<Option<Expense>> {
        let rows = self.storage.expenses.select(|e| e.owner == owner)?;
        resolve_one(rows, input, |e| e.id.matches(input))
    }

    /// Delete one of the owner's expenses
    pub fn delete(&self, owner: OwnerId, input: &str) -> FedhaResult<Expense> {
        let expense = self
            .find(owner, input)?
            .ok_or_else(|| FedhaError::expense_not_found(input))?;

        self.storage.expenses.delete(expense.id)?;
        self.storage.expenses.save()?;

        self.storage.log_delete(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.category.to_string()),
            &expense,
        )?;

        Ok(expense)
    }
}
