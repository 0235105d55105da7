//! Service layer for Fedha
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, ownership, computed fields, and cross-entity
//! operations. Every query is scoped to one owner.

pub mod budget;
pub mod expense;
pub mod goal;
pub mod income;
pub mod notification;
pub mod profile;

pub use budget::{BudgetService, RefreshReport};
pub use expense::ExpenseService;
pub use goal::GoalService;
pub use income::IncomeService;
pub use notification::NotificationCenter;
pub use profile::{ProfileService, ProfileView};

use crate::error::{FedhaError, FedhaResult};

/// Pick the single row whose ID matches user input.
///
/// `rows` must already be scoped to the caller; a prefix matching more than
/// one row is rejected rather than guessed.
pub(crate) fn resolve_one<R, F>(rows: Vec<R>, input: &str, matches: F) -> FedhaResult<Option<R>>
where
    F: Fn(&R) -> bool,
{
    let mut found: Vec<R> = rows.into_iter().filter(|r| matches(r)).collect();
    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        n => Err(FedhaError::Validation(format!(
            "'{}' matches {} records; use more characters of the ID",
            input.trim(),
            n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_one() {
        let rows = vec!["abcd1", "abcd2", "ffff"];
        assert_eq!(
            resolve_one(rows.clone(), "ffff", |r| r.starts_with("ffff")).unwrap(),
            Some("ffff")
        );
        assert!(resolve_one(rows.clone(), "zz", |r| r.starts_with("zz"))
            .unwrap()
            .is_none());
        assert!(resolve_one(rows, "abcd", |r| r.starts_with("abcd"))
            .unwrap_err()
            .is_validation());
    }
}
