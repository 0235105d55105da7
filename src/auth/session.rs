//! Signed-in state of this device
//!
//! Each provider keeps its own session; both live in one `session.json`.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FedhaResult;
use crate::models::{AccountId, PhoneUid};
use crate::storage::{read_json, write_json_atomic};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordSession {
    pub account_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PasswordSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneSession {
    pub uid: PhoneUid,
    pub phone_number: String,
    pub signed_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<PasswordSession>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<PhoneSession>,
}

impl SessionState {
    /// Load the session file; a missing file means nobody is signed in
    pub fn load(path: &Path) -> FedhaResult<Self> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> FedhaResult<()> {
        write_json_atomic(path, self)
    }

    /// The password session, unless it has expired
    pub fn active_password(&self, now: DateTime<Utc>) -> Option<&PasswordSession> {
        self.password.as_ref().filter(|s| !s.is_expired(now))
    }

    pub fn is_signed_out(&self) -> bool {
        self.password.is_none() && self.phone.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_signed_out() {
        let temp_dir = TempDir::new().unwrap();
        let state = SessionState::load(&temp_dir.path().join("session.json")).unwrap();
        assert!(state.is_signed_out());
    }

    #[test]
    fn test_loads_session_file_with_extra_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let account = AccountId::new();
        let json = serde_json::json!({
            "password": {
                "token": "session_old",
                "account_id": account,
                "created_at": Utc::now(),
                "expires_at": Utc::now() + Duration::hours(1),
            }
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let state = SessionState::load(&path).unwrap();
        let session = state.active_password(Utc::now()).unwrap();
        assert_eq!(session.account_id, account);
    }

    #[test]
    fn test_expired_password_session_is_inactive() {
        let now = Utc::now();
        let state = SessionState {
            password: Some(PasswordSession {
                account_id: AccountId::new(),
                created_at: now - Duration::hours(3),
                expires_at: now - Duration::hours(1),
            }),
            phone: None,
        };
        assert!(state.active_password(now).is_none());
        assert!(!state.is_signed_out());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let uid = PhoneUid::new();

        let state = SessionState {
            password: None,
            phone: Some(PhoneSession {
                uid,
                phone_number: "+254700000001".into(),
                signed_in_at: Utc::now(),
            }),
        };
        state.save(&path).unwrap();

        let loaded = SessionState::load(&path).unwrap();
        assert_eq!(loaded.phone.unwrap().uid, uid);
    }
}
