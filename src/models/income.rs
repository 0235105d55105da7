//! Income model
//!
//! A single inflow with a free-text source (salary, freelance, ...).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{IncomeId, OwnerId};
use super::money::Money;

/// Validation errors for income records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomeValidationError {
    NonPositiveAmount,
    MissingSource,
    FutureDate(NaiveDate),
}

impl std::fmt::Display for IncomeValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Amount must be greater than zero"),
            Self::MissingSource => write!(f, "Source is required"),
            Self::FutureDate(d) => write!(f, "Date {} is in the future", d),
        }
    }
}

impl std::error::Error for IncomeValidationError {}

/// A recorded income
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    pub id: IncomeId,
    pub owner: OwnerId,
    pub amount: Money,
    pub source: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Income {
    pub fn new(owner: OwnerId, amount: Money, source: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: IncomeId::new(),
            owner,
            amount,
            source: source.into().trim().to_string(),
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

    pub fn validate(&self, today: NaiveDate) -> Result<(), IncomeValidationError> {
        if !self.amount.is_positive() {
            return Err(IncomeValidationError::NonPositiveAmount);
        }
        if self.source.is_empty() {
            return Err(IncomeValidationError::MissingSource);
        }
        if self.date > today {
            return Err(IncomeValidationError::FutureDate(self.date));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_is_trimmed_and_required() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let income = Income::new(OwnerId::new(), Money::from_cents(100), "  ", today);
        assert_eq!(income.validate(today), Err(IncomeValidationError::MissingSource));

        let income = Income::new(OwnerId::new(), Money::from_cents(100), " Salary ", today);
        assert_eq!(income.source, "Salary");
        assert!(income.validate(today).is_ok());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let income = Income::new(OwnerId::new(), Money::from_cents(-100), "Salary", today);
        assert_eq!(
            income.validate(today),
            Err(IncomeValidationError::NonPositiveAmount)
        );
    }
}
