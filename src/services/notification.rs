//! Notification center
//!
//! Subscribes to record inserts on the change feed and turns new expenses,
//! income and goals into notifications for their owner. Also serves the
//! list / read / clear operations.

use std::sync::Arc;

use crate::error::{FedhaError, FedhaResult};
use crate::models::{Expense, Goal, Income, Money, Notification, NotificationKind, OwnerId};
use crate::storage::{ChangeEvent, ChangeKind, ChangeListener, Record, Table};

use super::resolve_one;

pub struct NotificationCenter {
    table: Arc<Table<Notification>>,
    currency: String,
}

impl NotificationCenter {
    pub fn new(table: Arc<Table<Notification>>, currency: impl Into<String>) -> Self {
        Self {
            table,
            currency: currency.into(),
        }
    }

    /// Store a notification for `owner`
    pub fn notify(
        &self,
        owner: OwnerId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> FedhaResult<Notification> {
        let notification = Notification::new(owner, kind, title, message);
        self.table.insert(notification.clone())?;
        self.table.save()?;
        tracing::debug!(kind = %kind, "notification created");
        Ok(notification)
    }

    /// The owner's notifications, newest first
    pub fn list(&self, owner: OwnerId) -> FedhaResult<Vec<Notification>> {
        let mut rows = self.table.select(|n| n.owner == owner)?;
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }

    pub fn unread_count(&self, owner: OwnerId) -> FedhaResult<usize> {
        Ok(self.table.select(|n| n.owner == owner && !n.read)?.len())
    }

    pub fn mark_read(&self, owner: OwnerId, input: &str) -> FedhaResult<Notification> {
        let rows = self.table.select(|n| n.owner == owner)?;
        let found = resolve_one(rows, input, |n| n.id.matches(input))?
            .ok_or_else(|| FedhaError::notification_not_found(input))?;

        let updated = self
            .table
            .update(found.id, |n| n.read = true)?
            .ok_or_else(|| FedhaError::notification_not_found(input))?;
        self.table.save()?;
        Ok(updated)
    }

    /// Mark every unread notification read; returns how many changed
    pub fn mark_all_read(&self, owner: OwnerId) -> FedhaResult<usize> {
        let unread = self.table.select(|n| n.owner == owner && !n.read)?;
        for n in &unread {
            self.table.update(n.id, |n| n.read = true)?;
        }
        if !unread.is_empty() {
            self.table.save()?;
        }
        Ok(unread.len())
    }

    /// Remove all of the owner's notifications
    pub fn clear(&self, owner: OwnerId) -> FedhaResult<usize> {
        let removed = self.table.delete_where(|n| n.owner == owner)?;
        self.table.save()?;
        Ok(removed.len())
    }

    fn from_insert(&self, event: &ChangeEvent) -> FedhaResult<Option<Notification>> {
        let money = |m: Money| m.format_with_currency(&self.currency);

        let notification = if event.table == Expense::TABLE {
            let expense: Expense = serde_json::from_value(event.row.clone())?;
            Notification::new(
                expense.owner,
                NotificationKind::Expense,
                "New Expense Added",
                format!("Expense of {} for {}", money(expense.amount), expense.category),
            )
        } else if event.table == Income::TABLE {
            let income: Income = serde_json::from_value(event.row.clone())?;
            Notification::new(
                income.owner,
                NotificationKind::Income,
                "New Income Added",
                format!("Income of {} from {}", money(income.amount), income.source),
            )
        } else if event.table == Goal::TABLE {
            let goal: Goal = serde_json::from_value(event.row.clone())?;
            Notification::new(
                goal.owner,
                NotificationKind::Goal,
                "New Goal Created",
                format!(
                    "Goal \"{}\" with target {}",
                    goal.name,
                    money(goal.target_amount)
                ),
            )
        } else {
            return Ok(None);
        };

        Ok(Some(notification))
    }
}

impl ChangeListener for NotificationCenter {
    fn wants(&self, table: &str, kind: ChangeKind) -> bool {
        kind == ChangeKind::Insert
            && [Expense::TABLE, Income::TABLE, Goal::TABLE].contains(&table)
    }

    fn on_change(&self, event: &ChangeEvent) -> FedhaResult<()> {
        if let Some(notification) = self.from_insert(event)? {
            self.table.insert(notification)?;
            self.table.save()?;
        }
        Ok(())
    }
}
