//! Budget model
//!
//! A spending limit for one category in one month. `spent` is either
//! entered by hand or recomputed from the month's expenses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{BudgetId, OwnerId};
use super::money::Money;
use super::month::Month;

/// How often the limit resets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriodKind {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl fmt::Display for BudgetPeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        };
        f.pad(name)
    }
}

impl FromStr for BudgetPeriodKind {
    type Err = BudgetValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" => Ok(Self::Yearly),
            other => Err(BudgetValidationError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    MissingCategory,
    NonPositiveLimit,
    NegativeSpent,
    UnknownPeriod(String),
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCategory => write!(f, "Category is required"),
            Self::NonPositiveLimit => write!(f, "Limit must be greater than zero"),
            Self::NegativeSpent => write!(f, "Spent amount cannot be negative"),
            Self::UnknownPeriod(p) => {
                write!(f, "Unknown period '{}'. Use weekly, monthly or yearly", p)
            }
        }
    }
}

impl std::error::Error for BudgetValidationError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub owner: OwnerId,
    pub category: String,
    pub limit: Money,
    #[serde(default)]
    pub spent: Money,
    #[serde(default)]
    pub period: BudgetPeriodKind,
    pub month: Month,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        owner: OwnerId,
        category: impl Into<String>,
        limit: Money,
        period: BudgetPeriodKind,
        month: Month,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            owner,
            category: category.into().trim().to_string(),
            limit,
            spent: Money::zero(),
            period,
            month,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_spent(&mut self, spent: Money) {
        self.spent = spent;
        self.updated_at = Utc::now();
    }

    /// Limit minus spent; negative once over budget
    pub fn remaining(&self) -> Money {
        self.limit - self.spent
    }

    /// Spent as a percentage of the limit
    pub fn utilization(&self) -> f64 {
        self.spent.percent_of(self.limit)
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent > self.limit
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.category.is_empty() {
            return Err(BudgetValidationError::MissingCategory);
        }
        if !self.limit.is_positive() {
            return Err(BudgetValidationError::NonPositiveLimit);
        }
        if self.spent.is_negative() {
            return Err(BudgetValidationError::NegativeSpent);
        }
        Ok(())
    }
}
