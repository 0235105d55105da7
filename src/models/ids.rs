//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Shortest prefix of the UUID accepted when a user types an ID
const MIN_PREFIX_LEN: usize = 4;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an ID from a string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                s.parse()
            }

            /// Whether `input` names this ID: the full UUID, the short display
            /// form, or a UUID prefix of at least four characters (with or
            /// without the display prefix).
            pub fn matches(&self, input: &str) -> bool {
                let input = input.trim();
                let bare = input.strip_prefix($display_prefix).unwrap_or(input);
                if bare.len() < MIN_PREFIX_LEN {
                    return false;
                }
                self.0.to_string().starts_with(&bare.to_ascii_lowercase())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(AccountId, "acc-");
define_id!(PhoneUid, "ph-");
define_id!(OwnerId, "usr-");
define_id!(ExpenseId, "exp-");
define_id!(IncomeId, "inc-");
define_id!(BudgetId, "bud-");
define_id!(GoalId, "goal-");
define_id!(ContributionId, "con-");
define_id!(NotificationId, "ntf-");
define_id!(ConfirmationId, "otp-");

// Records are owned by whichever identity the merged user was built from,
// so both provider IDs convert into the owner key without changing the UUID.
impl From<AccountId> for OwnerId {
    fn from(id: AccountId) -> Self {
        Self(id.0)
    }
}

impl From<PhoneUid> for OwnerId {
    fn from(uid: PhoneUid) -> Self {
        Self(uid.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = ExpenseId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("exp-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_id_serialization() {
        let id = GoalId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: GoalId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_id_parse_with_prefix() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = BudgetId::parse(&format!("bud-{}", uuid_str)).unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);
    }

    #[test]
    fn test_matches_short_forms() {
        let id = ExpenseId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert!(id.matches("exp-550e8400"));
        assert!(id.matches("550e8400"));
        assert!(id.matches("550E"));
        assert!(id.matches("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!id.matches("550"));
        assert!(!id.matches("exp-660e8400"));
    }

    #[test]
    fn test_owner_keeps_provider_uuid() {
        let account = AccountId::new();
        let owner: OwnerId = account.into();
        assert_eq!(owner.as_uuid(), account.as_uuid());

        let uid = PhoneUid::new();
        let owner: OwnerId = uid.into();
        assert_eq!(owner.as_uuid(), uid.as_uuid());
    }
}
