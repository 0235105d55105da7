//! Profile service
//!
//! Reading works for every signed-in user; phone-only users get a
//! read-only view built from the merged user. Saving and avatar upload need
//! a password account.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audit::EntityType;
use crate::auth::UnifiedUser;
use crate::error::{FedhaError, FedhaResult};
use crate::models::profile::initials;
use crate::models::{AccountId, Profile};
use crate::storage::Storage;

const AVATAR_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// What the profile page shows
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub display_name: Option<String>,
    pub initials: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub phone: Option<String>,
    pub phone_verified: bool,
    pub member_since: DateTime<Utc>,
    /// False for phone-only users
    pub editable: bool,
}

pub struct ProfileService<'a> {
    storage: &'a Storage,
}

impl<'a> ProfileService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The profile as shown to `user`
    pub fn load(&self, user: &UnifiedUser) -> FedhaResult<ProfileView> {
        let profile = match user.account_id {
            Some(id) => self.storage.profiles.get(id)?,
            None => None,
        };

        let view = match profile {
            Some(p) => {
                let display_name = p.display_name.clone().or(user.display_name.clone());
                ProfileView {
                    initials: initials(display_name.as_deref().or(user.email.as_deref())),
                    display_name,
                    bio: p.bio.clone(),
                    avatar_url: p.avatar_url.clone().or(user.avatar_url.clone()),
                    email: user.email.clone(),
                    email_verified: user.email_verified,
                    phone: p.phone.clone().or(user.phone_number.clone()),
                    phone_verified: p.phone_verified || user.phone_verified,
                    member_since: p.created_at,
                    editable: true,
                }
            }
            None => ProfileView {
                initials: initials(user.display_name.as_deref().or(user.email.as_deref())),
                display_name: user.display_name.clone(),
                bio: None,
                avatar_url: user.avatar_url.clone(),
                email: user.email.clone(),
                email_verified: user.email_verified,
                phone: user.phone_number.clone(),
                phone_verified: user.phone_verified,
                member_since: user.created_at,
                editable: user.has_full_account(),
            },
        };

        Ok(view)
    }

    /// Save display name and bio. `None` leaves a field as it is; an empty
    /// string clears it.
    pub fn save(
        &self,
        user: &UnifiedUser,
        display_name: Option<&str>,
        bio: Option<&str>,
    ) -> FedhaResult<Profile> {
        let id = user.account_id.ok_or_else(|| {
            FedhaError::FullAccountRequired(
                "Profile updates require a full account. Please sign up with email to save changes."
                    .into(),
            )
        })?;

        let before = self.profile_or_new(id)?;
        let clean = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());

        let after = self
            .storage
            .profiles
            .update(id, |p| {
                if let Some(name) = display_name {
                    p.display_name = clean(name);
                }
                if let Some(bio) = bio {
                    p.bio = clean(bio);
                }
                p.touch();
            })?
            .ok_or_else(|| FedhaError::profile_not_found(id.to_string()))?;
        self.storage.profiles.save()?;

        self.storage.log_update(
            EntityType::Profile,
            id.to_string(),
            after.display_name.clone(),
            &before,
            &after,
        )?;

        Ok(after)
    }

    /// Copy an image into the avatar store and point the profile at it
    pub fn upload_avatar(&self, user: &UnifiedUser, file: &Path) -> FedhaResult<Profile> {
        let id = user.account_id.ok_or_else(|| {
            FedhaError::FullAccountRequired(
                "Profile picture upload requires a full account".into(),
            )
        })?;

        let ext = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .filter(|e| AVATAR_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| {
                FedhaError::Validation(format!(
                    "Profile picture must be one of: {}",
                    AVATAR_EXTENSIONS.join(", ")
                ))
            })?;

        if !file.is_file() {
            return Err(FedhaError::Validation(format!(
                "File not found: {}",
                file.display()
            )));
        }

        let dir = self
            .storage
            .paths()
            .avatar_dir()
            .join(id.as_uuid().to_string());
        fs::create_dir_all(&dir)?;
        let target = dir.join(format!("{}.{}", Uuid::new_v4(), ext));
        fs::copy(file, &target).map_err(|e| {
            FedhaError::Io(format!("Failed to upload profile picture: {}", e))
        })?;

        let before = self.profile_or_new(id)?;
        let url = target.display().to_string();
        let after = self
            .storage
            .profiles
            .update(id, |p| {
                p.avatar_url = Some(url);
                p.touch();
            })?
            .ok_or_else(|| FedhaError::profile_not_found(id.to_string()))?;
        self.storage.profiles.save()?;

        self.storage.log_update(
            EntityType::Profile,
            id.to_string(),
            after.display_name.clone(),
            &before,
            &after,
        )?;

        Ok(after)
    }

    /// The account's profile row, created empty if sign-up never wrote one
    fn profile_or_new(&self, id: AccountId) -> FedhaResult<Profile> {
        if let Some(profile) = self.storage.profiles.get(id)? {
            return Ok(profile);
        }

        let profile = Profile::new(id);
        self.storage.profiles.insert(profile.clone())?;
        self.storage.log_create(EntityType::Profile, id.to_string(), None, &profile)?;
        Ok(profile)
    }
}
