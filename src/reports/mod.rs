//! Reports module for Fedha
//!
//! The dashboard: totals, category breakdown, monthly trend and
//! budget/goal summaries computed from a user's records.

pub mod dashboard;

pub use dashboard::{
    Activity, ActivityKind, BudgetSummary, CategoryShare, Dashboard, GoalSummary, MonthPoint,
    Totals, MAX_TREND_MONTHS, RECENT_ACTIVITY_LIMIT,
};
