//! User profile
//!
//! One profile per password account. A phone identity can be attached to a
//! profile later through `phone_uid`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, PhoneUid};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Same as the password account's ID
    pub id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub phone_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Linked phone identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_uid: Option<PhoneUid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(id: AccountId) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name: None,
            phone: None,
            phone_verified: false,
            avatar_url: None,
            bio: None,
            phone_uid: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Avatar fallback text: first letters of up to two words, uppercased.
/// "U" when there is no name.
pub fn initials(name: Option<&str>) -> String {
    let letters: String = name
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(|c| c.to_uppercase())
        .collect();

    if letters.is_empty() {
        "U".to_string()
    } else {
        letters
    }
}
