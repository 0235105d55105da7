//! Core data models for Fedha
//!
//! This module contains the records a user keeps (expenses, income, budgets,
//! goals, contributions), their profile and notifications, and the rows
//! owned by the identity providers.

pub mod budget;
pub mod expense;
pub mod goal;
pub mod identity;
pub mod ids;
pub mod income;
pub mod money;
pub mod month;
pub mod notification;
pub mod profile;

pub use budget::{Budget, BudgetPeriodKind};
pub use expense::{Expense, ExpenseCategory};
pub use goal::{Contribution, Goal};
pub use identity::{OtpChallenge, PasswordAccount, PendingToken, PhoneAccount, UserMetadata};
pub use ids::{
    AccountId, BudgetId, ConfirmationId, ContributionId, ExpenseId, GoalId, IncomeId,
    NotificationId, OwnerId, PhoneUid,
};
pub use income::Income;
pub use money::Money;
pub use month::Month;
pub use notification::{Notification, NotificationKind};
pub use profile::Profile;
