//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod auth;
pub mod budget;
pub mod expense;
pub mod export;
pub mod goal;
pub mod income;
pub mod notification;
pub mod profile;

pub use auth::{handle_auth_command, AuthCommands, PhoneCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use goal::{handle_goal_command, GoalCommands};
pub use income::{handle_income_command, IncomeCommands};
pub use notification::{handle_notification_command, NotificationCommands};
pub use profile::{handle_profile_command, ProfileCommands};

use chrono::NaiveDate;
use zeroize::Zeroizing;

use crate::auth::{AuthContext, UnifiedUser};
use crate::config::{FedhaPaths, Settings};
use crate::error::{FedhaError, FedhaResult};
use crate::models::{Money, Month};
use crate::reports::Dashboard;
use crate::services::NotificationCenter;
use crate::storage::Storage;

/// Everything a command handler needs, built once in `main`
pub struct CliContext<'a> {
    pub paths: &'a FedhaPaths,
    pub settings: &'a Settings,
    pub storage: &'a Storage,
    pub auth: AuthContext<'a>,
    pub notifications: &'a NotificationCenter,
}

impl CliContext<'_> {
    pub fn currency(&self) -> &str {
        &self.settings.currency
    }

    /// The signed-in user; errors with a hint to sign in otherwise
    pub fn require_user(&self) -> FedhaResult<UnifiedUser> {
        self.auth.require_user()
    }

    pub fn money(&self, amount: Money) -> String {
        amount.format_with_currency(&self.settings.currency)
    }
}

/// Show the dashboard for the signed-in user
pub fn handle_dashboard_command(ctx: &CliContext<'_>, months: Option<u32>) -> FedhaResult<()> {
    let user = ctx.require_user()?;
    let months = months.unwrap_or(ctx.settings.dashboard_months);

    let dashboard = Dashboard::generate(ctx.storage, user.owner(), Month::current(), months)?;

    println!("Welcome back, {}!", user.label());
    println!();
    print!("{}", dashboard.format_terminal(ctx.currency()));

    let unread = ctx.notifications.unread_count(user.owner())?;
    if unread > 0 {
        println!();
        println!(
            "You have {} unread notification(s). Run 'fedha notifications list'.",
            unread
        );
    }
    Ok(())
}

pub(crate) fn parse_amount(input: &str, currency: &str) -> FedhaResult<Money> {
    Money::parse_with_currency(input, currency).map_err(|e| FedhaError::Validation(format!("Invalid amount: {}", e)))
}

pub(crate) fn parse_date(input: Option<&str>) -> FedhaResult<Option<NaiveDate>> {
    input
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
                FedhaError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))
            })
        })
        .transpose()
}

pub(crate) fn parse_month(input: Option<&str>) -> FedhaResult<Option<Month>> {
    input
        .map(|s| {
            s.parse::<Month>()
                .map_err(|e| FedhaError::Validation(e.to_string()))
        })
        .transpose()
}

/// Use the flag value when given, otherwise prompt without echo
pub(crate) fn read_password(given: Option<String>, prompt: &str) -> FedhaResult<Zeroizing<String>> {
    match given {
        Some(password) => Ok(Zeroizing::new(password)),
        None => rpassword::prompt_password(prompt)
            .map(Zeroizing::new)
            .map_err(|e| FedhaError::Io(format!("Failed to read password: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_amount("1,500.50", "KES").unwrap().cents(), 150_050);
        assert_eq!(parse_amount("KES 20", "KES").unwrap().cents(), 2_000);
        assert!(parse_amount("abc", "KES").unwrap_err().is_validation());
        assert!(parse_amount("abc5", "KES").unwrap_err().is_validation());
        assert!(parse_amount("10.999", "KES").unwrap_err().is_validation());

        assert_eq!(
            parse_date(Some("2025-02-28")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28)
        );
        assert!(parse_date(Some("28/02/2025")).unwrap_err().is_validation());
        assert_eq!(parse_date(None).unwrap(), None);

        assert_eq!(parse_month(Some("2025-07")).unwrap(), Month::new(2025, 7));
        assert!(parse_month(Some("2025-13")).is_err());
    }

    #[test]
    fn test_read_password_from_flag() {
        let password = read_password(Some("hunter22".into()), "Password: ").unwrap();
        assert_eq!(password.as_str(), "hunter22");
    }
}
