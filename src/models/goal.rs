//! Savings goals and the contributions made toward them

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ContributionId, GoalId, OwnerId};
use super::money::Money;

/// Validation errors for goals and contributions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    MissingName,
    NonPositiveTarget,
    NegativeSaved,
    NonPositiveContribution,
    AmountTooLarge,
}

impl std::fmt::Display for GoalValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "Goal name is required"),
            Self::NonPositiveTarget => write!(f, "Target amount must be greater than zero"),
            Self::NegativeSaved => write!(f, "Saved amount cannot be negative"),
            Self::NonPositiveContribution => {
                write!(f, "Contribution must be greater than zero")
            }
            Self::AmountTooLarge => write!(f, "Amount exceeds the largest supported value"),
        }
    }
}

impl std::error::Error for GoalValidationError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub owner: OwnerId,
    pub name: String,
    pub target_amount: Money,
    #[serde(default)]
    pub saved_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(owner: OwnerId, name: impl Into<String>, target_amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: GoalId::new(),
            owner,
            name: name.into().trim().to_string(),
            target_amount,
            saved_amount: Money::zero(),
            deadline: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add to the saved amount; leaves the goal untouched on overflow
    pub fn add_saved(&mut self, amount: Money) -> Result<(), GoalValidationError> {
        self.saved_amount = self
            .saved_amount
            .checked_add(amount)
            .ok_or(GoalValidationError::AmountTooLarge)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Saved as a percentage of target, capped at 100
    pub fn progress(&self) -> f64 {
        self.saved_amount.percent_of(self.target_amount).min(100.0)
    }

    /// Amount still needed; zero once the goal is reached
    pub fn remaining(&self) -> Money {
        let left = self.target_amount - self.saved_amount;
        if left.is_negative() {
            Money::zero()
        } else {
            left
        }
    }

    pub fn is_completed(&self) -> bool {
        self.saved_amount >= self.target_amount
    }

    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.name.is_empty() {
            return Err(GoalValidationError::MissingName);
        }
        if !self.target_amount.is_positive() {
            return Err(GoalValidationError::NonPositiveTarget);
        }
        if self.saved_amount.is_negative() {
            return Err(GoalValidationError::NegativeSaved);
        }
        if self.target_amount > Money::MAX || self.saved_amount > Money::MAX {
            return Err(GoalValidationError::AmountTooLarge);
        }
        Ok(())
    }
}

/// A single payment toward a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub id: ContributionId,
    pub owner: OwnerId,
    pub goal_id: GoalId,
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Contribution {
    pub fn new(owner: OwnerId, goal_id: GoalId, amount: Money, date: NaiveDate) -> Self {
        Self {
            id: ContributionId::new(),
            owner,
            goal_id,
            amount,
            date,
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if !self.amount.is_positive() {
            return Err(GoalValidationError::NonPositiveContribution);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_and_completion() {
        let mut goal = Goal::new(OwnerId::new(), "Laptop", Money::from_cents(100_000));
        assert_eq!(goal.progress(), 0.0);
        assert!(!goal.is_completed());

        goal.add_saved(Money::from_cents(40_000)).unwrap();
        assert_eq!(goal.progress(), 40.0);
        assert_eq!(goal.remaining().cents(), 60_000);

        goal.add_saved(Money::from_cents(70_000)).unwrap();
        assert!(goal.is_completed());
        assert_eq!(goal.progress(), 100.0);
        assert!(goal.remaining().is_zero());
    }

    #[test]
    fn test_add_saved_overflow_keeps_goal() {
        let mut goal = Goal::new(OwnerId::new(), "House", Money::MAX);
        goal.add_saved(Money::MAX).unwrap();
        let stamp = goal.updated_at;

        assert_eq!(
            goal.add_saved(Money::from_cents(1)),
            Err(GoalValidationError::AmountTooLarge)
        );
        assert_eq!(goal.saved_amount, Money::MAX);
        assert_eq!(goal.updated_at, stamp);
    }

    #[test]
    fn test_goal_validation() {
        let goal = Goal::new(OwnerId::new(), " ", Money::from_cents(100));
        assert_eq!(goal.validate(), Err(GoalValidationError::MissingName));

        let goal = Goal::new(OwnerId::new(), "Trip", Money::zero());
        assert_eq!(goal.validate(), Err(GoalValidationError::NonPositiveTarget));
    }

    #[test]
    fn test_contribution_validation() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let c = Contribution::new(OwnerId::new(), GoalId::new(), Money::zero(), today);
        assert_eq!(c.validate(), Err(GoalValidationError::NonPositiveContribution));
    }
}
