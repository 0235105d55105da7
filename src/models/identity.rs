//! Rows owned by the two identity providers
//!
//! The password provider keeps [`PasswordAccount`]s; the phone provider keeps
//! [`PhoneAccount`]s and pending [`OtpChallenge`]s. Secrets are stored only as
//! Argon2 hashes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, ConfirmationId, PhoneUid};

/// Free-form fields supplied at sign-up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A single-use secret with an optional expiry (confirmation or reset)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingToken {
    pub token_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PendingToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}

/// Email/password account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordAccount {
    pub id: AccountId,
    pub email: String,
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: UserMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<PendingToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery: Option<PendingToken>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl PasswordAccount {
    pub fn new(email: impl Into<String>, password_hash: String, metadata: UserMetadata) -> Self {
        Self {
            id: AccountId::new(),
            email: email.into(),
            password_hash,
            email_confirmed_at: None,
            metadata,
            confirmation: None,
            recovery: None,
            created_at: Utc::now(),
            last_sign_in_at: None,
        }
    }

    pub fn is_email_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}

/// Phone account, created the first time a number passes verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneAccount {
    pub uid: PhoneUid,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl PhoneAccount {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            uid: PhoneUid::new(),
            phone_number: phone_number.into(),
            display_name: None,
            email: None,
            created_at: Utc::now(),
            last_sign_in_at: None,
        }
    }
}

/// A passcode sent to a phone and awaiting confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub id: ConfirmationId,
    pub phone_number: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_pending_token_expiry() {
        let now = Utc::now();
        let open = PendingToken {
            token_hash: "h".into(),
            expires_at: None,
        };
        assert!(!open.is_expired(now));

        let stale = PendingToken {
            token_hash: "h".into(),
            expires_at: Some(now - Duration::minutes(1)),
        };
        assert!(stale.is_expired(now));
    }

    #[test]
    fn test_new_account_is_unconfirmed() {
        let account = PasswordAccount::new("a@b.co", "hash".into(), UserMetadata::default());
        assert!(!account.is_email_confirmed());
        assert!(account.confirmation.is_none());
    }
}
