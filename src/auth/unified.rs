//! One signed-in user across both identity providers
//!
//! The password provider and the phone provider know nothing about each
//! other. [`AuthContext`] reads both sessions, merges whatever accounts are
//! signed in into a single [`UnifiedUser`], and links a verified phone
//! number to an existing profile when it can.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audit::EntityType;
use crate::config::settings::AuthSettings;
use crate::error::{FedhaError, FedhaResult};
use crate::models::{
    AccountId, ConfirmationId, OwnerId, PasswordAccount, PhoneAccount, PhoneUid, Profile,
    UserMetadata,
};
use crate::storage::{Storage, Table};

use super::outbox::MessageSender;
use super::password_provider::PasswordProvider;
use super::phone_provider::{normalize_phone, PhoneProvider};
use super::session::{PhoneSession, SessionState};
use super::store::IdentityStore;

/// The merged view of whoever is signed in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedUser {
    /// Password account ID when there is one, otherwise the phone UID
    pub id: OwnerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_uid: Option<PhoneUid>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UnifiedUser {
    /// Key that records created by this user are stored under
    pub fn owner(&self) -> OwnerId {
        self.id
    }

    /// Whether an e-mail/password account is present
    pub fn has_full_account(&self) -> bool {
        self.account_id.is_some()
    }

    /// Best label for greetings: display name, then e-mail, then phone
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.phone_number.as_deref())
            .unwrap_or("User")
    }
}

/// Combine the two provider accounts into one user.
///
/// Phone-provider values win for phone number, display name and avatar;
/// the password account supplies the ID and e-mail.
pub fn merge_user_data(
    password: Option<&PasswordAccount>,
    phone: Option<&PhoneAccount>,
) -> Option<UnifiedUser> {
    if password.is_none() && phone.is_none() {
        return None;
    }

    let metadata = password.map(|p| &p.metadata);

    let id = match (password, phone) {
        (Some(p), _) => OwnerId::from(p.id),
        (None, Some(ph)) => OwnerId::from(ph.uid),
        (None, None) => return None,
    };

    let created_at = password
        .map(|p| p.created_at)
        .or(phone.map(|ph| ph.created_at))
        .unwrap_or_else(Utc::now);

    Some(UnifiedUser {
        id,
        account_id: password.map(|p| p.id),
        phone_uid: phone.map(|ph| ph.uid),
        email: password
            .map(|p| p.email.clone())
            .or_else(|| phone.and_then(|ph| ph.email.clone())),
        phone_number: phone
            .map(|ph| ph.phone_number.clone())
            .or_else(|| metadata.and_then(|m| m.phone.clone())),
        email_verified: password.is_some_and(|p| p.email_confirmed_at.is_some()),
        phone_verified: phone.is_some(),
        display_name: phone
            .and_then(|ph| ph.display_name.clone())
            .or_else(|| metadata.and_then(|m| m.display_name.clone())),
        avatar_url: metadata.and_then(|m| m.avatar_url.clone()),
        created_at,
    })
}

/// What happened to the profiles after a phone sign-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// A profile already carried this phone identity
    Updated,
    /// A profile with the same phone number now carries this phone identity
    Linked,
    /// No profile matched
    NeedsSignup,
}

impl SyncOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SyncOutcome::Updated => "Phone number verified successfully!",
            SyncOutcome::Linked => "Account linked successfully!",
            SyncOutcome::NeedsSignup => {
                "Phone authentication successful! Complete signup to access all features."
            }
        }
    }
}

/// Profile states around a phone sync, for the audit log
pub type ProfileChange = (Profile, Profile);

/// Attach a verified phone identity to the matching profile, if any.
///
/// Returns the outcome and, when a profile was touched, its state before and
/// after.
pub fn sync_phone_identity(
    profiles: &Table<Profile>,
    phone: &PhoneAccount,
) -> FedhaResult<(SyncOutcome, Option<ProfileChange>)> {
    let number = phone.phone_number.clone();

    if let Some(existing) = profiles.find(|p| p.phone_uid == Some(phone.uid))? {
        let updated = profiles.update(existing.id, |p| {
            p.phone = Some(number);
            p.phone_verified = true;
            p.touch();
        })?;
        profiles.save()?;
        return Ok((SyncOutcome::Updated, updated.map(|after| (existing, after))));
    }

    if let Some(existing) = profiles.find(|p| p.phone.as_deref() == Some(number.as_str()))? {
        let uid = phone.uid;
        let linked = profiles.update(existing.id, |p| {
            p.phone_uid = Some(uid);
            p.phone_verified = true;
            p.touch();
        })?;
        profiles.save()?;
        tracing::info!(profile = %existing.id, uid = %uid, "phone identity linked");
        return Ok((SyncOutcome::Linked, linked.map(|after| (existing, after))));
    }

    Ok((SyncOutcome::NeedsSignup, None))
}

/// Result of a completed phone sign-in
#[derive(Debug, Clone)]
pub struct PhoneSignIn {
    pub user: UnifiedUser,
    /// `None` when linking failed; sign-in still succeeds
    pub outcome: Option<SyncOutcome>,
}

/// Raw state of both providers, for troubleshooting
#[derive(Debug, Clone, Serialize)]
pub struct AuthDebug {
    pub unified: Option<UnifiedUser>,
    pub password_session: Option<PasswordSessionDebug>,
    pub phone_session: Option<PhoneSessionDebug>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordSessionDebug {
    pub account_id: AccountId,
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhoneSessionDebug {
    pub uid: PhoneUid,
    pub phone_number: String,
    pub email: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

/// Both identity providers plus the device session
pub struct AuthContext<'a> {
    storage: &'a Storage,
    identity: &'a IdentityStore,
    settings: &'a AuthSettings,
    sender: &'a dyn MessageSender,
    session_path: PathBuf,
}

impl<'a> AuthContext<'a> {
    pub fn new(
        storage: &'a Storage,
        identity: &'a IdentityStore,
        settings: &'a AuthSettings,
        sender: &'a dyn MessageSender,
    ) -> Self {
        Self {
            session_path: storage.paths().session_file(),
            storage,
            identity,
            settings,
            sender,
        }
    }

    pub fn password_provider(&self) -> PasswordProvider<'a> {
        PasswordProvider::new(&self.identity.password_accounts, self.settings, self.sender)
    }

    pub fn phone_provider(&self) -> PhoneProvider<'a> {
        PhoneProvider::new(self.identity, self.settings, self.sender)
    }

    pub fn session(&self) -> FedhaResult<SessionState> {
        SessionState::load(&self.session_path)
    }

    /// The merged user for the current session, if anyone is signed in
    pub fn current_user(&self) -> FedhaResult<Option<UnifiedUser>> {
        let session = self.session()?;
        let now = Utc::now();

        let password = match session.active_password(now) {
            Some(s) => self.password_provider().get(s.account_id)?,
            None => None,
        };
        let phone = match &session.phone {
            Some(s) => self.phone_provider().get(s.uid)?,
            None => None,
        };

        Ok(merge_user_data(password.as_ref(), phone.as_ref()))
    }

    /// The signed-in user, or [`FedhaError::Unauthenticated`]
    pub fn require_user(&self) -> FedhaResult<UnifiedUser> {
        self.current_user()?.ok_or(FedhaError::Unauthenticated)
    }

    /// Create a password account together with its profile
    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> FedhaResult<PasswordAccount> {
        let phone = phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(normalize_phone)
            .transpose()?;

        let metadata = UserMetadata {
            phone: phone.clone(),
            ..UserMetadata::default()
        };
        let account = self.password_provider().sign_up(email, password, metadata)?;

        let mut profile = Profile::new(account.id);
        profile.phone = phone;
        self.storage.profiles.insert(profile.clone())?;
        self.storage.profiles.save()?;

        self.storage.log_create(
            EntityType::PasswordAccount,
            account.id.to_string(),
            Some(account.email.clone()),
            &serde_json::json!({
                "email": account.email,
                "created_at": account.created_at,
            }),
        )?;
        self.storage.log_create(
            EntityType::Profile,
            profile.id.to_string(),
            None,
            &profile,
        )?;

        Ok(account)
    }

    /// Sign in with e-mail and password, keeping any phone session
    pub fn sign_in(&self, email: &str, password: &str) -> FedhaResult<UnifiedUser> {
        let password_session = self.password_provider().sign_in(email, password)?;

        let mut session = self.session()?;
        session.password = Some(password_session);
        session.save(&self.session_path)?;

        self.require_user()
    }

    pub fn send_otp(&self, phone: &str) -> FedhaResult<ConfirmationId> {
        self.phone_provider().send_otp(phone)
    }

    /// Verify a code, open the phone session, and link the phone identity.
    ///
    /// Linking failures are logged; they never undo the sign-in.
    pub fn verify_otp(&self, confirmation: ConfirmationId, code: &str) -> FedhaResult<PhoneSignIn> {
        let account = self.phone_provider().verify_otp(confirmation, code)?;

        let mut session = self.session()?;
        session.phone = Some(PhoneSession {
            uid: account.uid,
            phone_number: account.phone_number.clone(),
            signed_in_at: Utc::now(),
        });
        session.save(&self.session_path)?;

        let outcome = match sync_phone_identity(&self.storage.profiles, &account) {
            Ok((outcome, change)) => {
                if let Some((before, after)) = change {
                    if let Err(e) = self.storage.log_update(
                        EntityType::Profile,
                        after.id.to_string(),
                        after.display_name.clone(),
                        &before,
                        &after,
                    ) {
                        tracing::warn!(error = %e, "could not audit phone link");
                    }
                    if let Err(e) = self.copy_profile_to_phone(&after, account.uid) {
                        tracing::warn!(
                            error = %e,
                            uid = %account.uid,
                            "could not copy profile details"
                        );
                    }
                }
                Some(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, uid = %account.uid, "error syncing phone identity");
                None
            }
        };

        let user = self.require_user()?;
        Ok(PhoneSignIn { user, outcome })
    }

    /// Carry the linked profile's name and e-mail onto the phone account so a
    /// phone-only session still shows them.
    fn copy_profile_to_phone(&self, profile: &Profile, uid: PhoneUid) -> FedhaResult<()> {
        let email = self.password_provider().get(profile.id)?.map(|a| a.email);
        self.phone_provider()
            .update_account(uid, profile.display_name.as_deref(), email.as_deref())?;
        Ok(())
    }

    /// Change the phone number and/or display name on the user's profile.
    ///
    /// The profile is found by account ID for full accounts and by linked
    /// phone identity otherwise. `None` leaves a field unchanged.
    pub fn update_profile(
        &self,
        user: &UnifiedUser,
        phone: Option<&str>,
        display_name: Option<&str>,
    ) -> FedhaResult<Profile> {
        let phone = phone.map(normalize_phone).transpose()?;
        let display_name = display_name.map(|n| n.trim().to_string());
        let name_changed = display_name.is_some();

        let profiles = &self.storage.profiles;
        let found = if let Some(id) = user.account_id {
            profiles.get(id)?
        } else if let Some(uid) = user.phone_uid {
            profiles.find(|p| p.phone_uid == Some(uid))?
        } else {
            None
        };
        let existing = found.ok_or_else(|| FedhaError::profile_not_found(user.id.to_string()))?;

        let updated = profiles
            .update(existing.id, |p| {
                if let Some(phone) = phone {
                    p.phone = Some(phone);
                }
                if let Some(name) = display_name {
                    p.display_name = if name.is_empty() { None } else { Some(name) };
                }
                p.touch();
            })?
            .ok_or_else(|| FedhaError::profile_not_found(existing.id.to_string()))?;
        profiles.save()?;

        if let (Some(uid), true) = (user.phone_uid, name_changed) {
            let name = updated.display_name.as_deref().unwrap_or_default();
            self.phone_provider().update_account(uid, Some(name), None)?;
        }

        self.storage.log_update(
            EntityType::Profile,
            updated.id.to_string(),
            updated.display_name.clone(),
            &existing,
            &updated,
        )?;

        Ok(updated)
    }

    /// Sign out of whichever providers have a session. Returns whether anyone
    /// was signed in.
    pub fn sign_out(&self) -> FedhaResult<bool> {
        let session = self.session()?;
        let was_signed_in = !session.is_signed_out();

        if let Some(phone) = &session.phone {
            tracing::info!(uid = %phone.uid, "signed out of phone provider");
        }
        if let Some(password) = &session.password {
            tracing::info!(account = %password.account_id, "signed out of password provider");
        }

        SessionState::default().save(&self.session_path)?;
        Ok(was_signed_in)
    }

    pub fn debug_state(&self) -> FedhaResult<AuthDebug> {
        let session = self.session()?;
        let now = Utc::now();

        let password_session = match &session.password {
            Some(s) => Some(PasswordSessionDebug {
                account_id: s.account_id,
                email: self.password_provider().get(s.account_id)?.map(|a| a.email),
                expires_at: s.expires_at,
                expired: s.is_expired(now),
            }),
            None => None,
        };

        let phone_session = match &session.phone {
            Some(s) => Some(PhoneSessionDebug {
                uid: s.uid,
                phone_number: s.phone_number.clone(),
                email: self.phone_provider().get(s.uid)?.and_then(|a| a.email),
                signed_in_at: s.signed_in_at,
            }),
            None => None,
        };

        Ok(AuthDebug {
            unified: self.current_user()?,
            password_session,
            phone_session,
        })
    }
}
