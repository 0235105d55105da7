//! JSON Export functionality
//!
//! Exports every record the signed-in user owns, with schema versioning.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UnifiedUser;
use crate::error::{FedhaError, FedhaResult};
use crate::models::{Budget, Contribution, Expense, Goal, Income, OwnerId, Profile};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Everything one user owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub owner: OwnerId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,

    pub expenses: Vec<Expense>,
    pub income: Vec<Income>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<Goal>,
    pub contributions: Vec<Contribution>,

    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub expense_count: usize,
    pub income_count: usize,
    pub budget_count: usize,
    pub goal_count: usize,
    pub contribution_count: usize,

    /// Earliest expense or income date
    pub earliest_record: Option<String>,

    /// Latest expense or income date
    pub latest_record: Option<String>,
}

impl UserExport {
    /// Collect the user's records from storage
    pub fn from_storage(storage: &Storage, user: &UnifiedUser) -> FedhaResult<Self> {
        let owner = user.owner();

        let expenses = storage.expenses.select(|e| e.owner == owner)?;
        let income = storage.income.select(|i| i.owner == owner)?;
        let budgets = storage.budgets.select(|b| b.owner == owner)?;
        let goals = storage.goals.select(|g| g.owner == owner)?;
        let contributions = storage.contributions.select(|c| c.owner == owner)?;
        let profile = match user.account_id {
            Some(id) => storage.profiles.get(id)?,
            None => None,
        };

        let dates = || {
            expenses
                .iter()
                .map(|e| e.date)
                .chain(income.iter().map(|i| i.date))
        };

        let metadata = ExportMetadata {
            expense_count: expenses.len(),
            income_count: income.len(),
            budget_count: budgets.len(),
            goal_count: goals.len(),
            contribution_count: contributions.len(),
            earliest_record: dates().min().map(|d| d.to_string()),
            latest_record: dates().max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            owner,
            email: user.email.clone(),
            profile,
            expenses,
            income,
            budgets,
            goals,
            contributions,
            metadata,
        })
    }
}

/// Export the user's records to JSON
pub fn export_user_json<W: Write>(
    storage: &Storage,
    user: &UnifiedUser,
    writer: &mut W,
    pretty: bool,
) -> FedhaResult<UserExport> {
    let export = UserExport::from_storage(storage, user)?;

    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &export)
    } else {
        serde_json::to_writer(&mut *writer, &export)
    }
    .map_err(|e| FedhaError::Export(e.to_string()))?;
    writeln!(writer)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::merge_user_data;
    use crate::config::paths::FedhaPaths;
    use crate::models::{ExpenseCategory, Money, PasswordAccount, UserMetadata};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_user_export() {
        let (_temp_dir, storage) = create_test_storage();
        let account = PasswordAccount::new("wanjiru@example.com", "h".into(), UserMetadata::default());
        storage.profiles.insert(Profile::new(account.id)).unwrap();
        let user = merge_user_data(Some(&account), None).unwrap();
        let owner = user.owner();

        let jan = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        storage
            .expenses
            .insert(Expense::new(owner, Money::from_cents(500), ExpenseCategory::Food, jan(9)))
            .unwrap();
        storage
            .income
            .insert(Income::new(owner, Money::from_cents(9_000), "Salary", jan(2)))
            .unwrap();
        let goal = Goal::new(owner, "Bike", Money::from_cents(10_000));
        storage
            .contributions
            .insert(Contribution::new(owner, goal.id, Money::from_cents(100), jan(3)))
            .unwrap();
        storage.goals.insert(goal).unwrap();
        storage
            .expenses
            .insert(Expense::new(OwnerId::new(), Money::from_cents(1), ExpenseCategory::Food, jan(1)))
            .unwrap();

        let mut out = Vec::new();
        let export = export_user_json(&storage, &user, &mut out, true).unwrap();
        assert_eq!(export.metadata.expense_count, 1);
        assert_eq!(export.metadata.contribution_count, 1);
        assert_eq!(export.metadata.earliest_record.as_deref(), Some("2025-01-02"));
        assert_eq!(export.metadata.latest_record.as_deref(), Some("2025-01-09"));
        assert!(export.profile.is_some());

        let parsed: UserExport = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(parsed.email.as_deref(), Some("wanjiru@example.com"));
        assert_eq!(parsed.goals[0].name, "Bike");
    }
}
