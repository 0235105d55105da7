//! Phone number identity provider
//!
//! Sign-in is a two-step exchange: `send_otp` stores a hashed one-time code
//! and texts it to the number; `verify_otp` checks the code and returns the
//! phone account, creating it on first sign-in.

use chrono::{Duration, Utc};

use crate::config::settings::AuthSettings;
use crate::error::{FedhaError, FedhaResult};
use crate::models::{ConfirmationId, OtpChallenge, PhoneAccount, PhoneUid};

use super::outbox::{MessageSender, OutboxMessage};
use super::password::{generate_code, hash_secret, verify_secret};
use super::store::IdentityStore;

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

/// Normalize a phone number to `+<digits>`.
///
/// Spaces, dashes and parentheses are dropped; the number must carry its
/// country code.
pub fn normalize_phone(input: &str) -> FedhaResult<String> {
    let input = input.trim();
    if !input.starts_with('+') {
        return Err(FedhaError::Validation(
            "Phone number must include country code (e.g., +1234567890)".into(),
        ));
    }

    let digits: String = input[1..]
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if digits.len() < MIN_DIGITS
        || digits.len() > MAX_DIGITS
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return Err(FedhaError::Validation(format!(
            "Invalid phone number: {}",
            input
        )));
    }

    Ok(format!("+{}", digits))
}

pub struct PhoneProvider<'a> {
    store: &'a IdentityStore,
    settings: &'a AuthSettings,
    sender: &'a dyn MessageSender,
}

impl<'a> PhoneProvider<'a> {
    pub fn new(
        store: &'a IdentityStore,
        settings: &'a AuthSettings,
        sender: &'a dyn MessageSender,
    ) -> Self {
        Self {
            store,
            settings,
            sender,
        }
    }

    pub fn get(&self, uid: PhoneUid) -> FedhaResult<Option<PhoneAccount>> {
        self.store.phone_accounts.get(uid)
    }

    /// Set the display name and/or e-mail carried on a phone account.
    ///
    /// `None` leaves a field unchanged; an empty value clears it.
    pub fn update_account(
        &self,
        uid: PhoneUid,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> FedhaResult<PhoneAccount> {
        let cleaned = |v: &str| Some(v.trim().to_string()).filter(|v| !v.is_empty());
        let accounts = &self.store.phone_accounts;
        let account = accounts
            .update(uid, |a| {
                if let Some(name) = display_name {
                    a.display_name = cleaned(name);
                }
                if let Some(email) = email {
                    a.email = cleaned(email).map(|e| e.to_lowercase());
                }
            })?
            .ok_or_else(|| FedhaError::phone_account_not_found(uid.to_string()))?;
        accounts.save()?;
        Ok(account)
    }

    /// Text a fresh code to `phone`. Earlier codes for the number stop working.
    pub fn send_otp(&self, phone: &str) -> FedhaResult<ConfirmationId> {
        let phone = normalize_phone(phone)?;
        let now = Utc::now();

        let challenges = &self.store.otp_challenges;
        challenges.delete_where(|c| c.phone_number == phone || c.is_expired(now))?;

        let code = generate_code(self.settings.otp_length);
        let challenge = OtpChallenge {
            id: ConfirmationId::new(),
            phone_number: phone.clone(),
            code_hash: hash_secret(&code)?,
            expires_at: now + Duration::minutes(self.settings.otp_ttl_minutes),
            attempts: 0,
            created_at: now,
        };
        let id = challenge.id;

        challenges.insert(challenge)?;
        challenges.save()?;

        self.sender.send(&OutboxMessage::sms(
            &phone,
            format!(
                "{} is your FedhaSmart verification code. It expires in {} minutes.",
                code, self.settings.otp_ttl_minutes
            ),
        ))?;

        tracing::info!(confirmation = %id, "verification code sent");
        Ok(id)
    }

    /// The newest unexpired challenge, for callers that did not keep the ID
    pub fn latest_challenge(&self) -> FedhaResult<Option<ConfirmationId>> {
        let now = Utc::now();
        Ok(self
            .store
            .otp_challenges
            .select(|c| !c.is_expired(now))?
            .into_iter()
            .max_by_key(|c| c.created_at)
            .map(|c| c.id))
    }

    /// Check a code and sign the phone account in
    pub fn verify_otp(&self, confirmation: ConfirmationId, code: &str) -> FedhaResult<PhoneAccount> {
        let code = code.trim();
        if code.is_empty() {
            return Err(FedhaError::Validation("Please enter the OTP".into()));
        }
        if code.len() != self.settings.otp_length || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(FedhaError::Validation(format!(
                "The code must be {} digits",
                self.settings.otp_length
            )));
        }

        let challenges = &self.store.otp_challenges;
        let challenge = challenges
            .get(confirmation)?
            .ok_or_else(|| FedhaError::Otp("Please request OTP first".into()))?;

        if challenge.is_expired(Utc::now()) {
            challenges.delete(confirmation)?;
            challenges.save()?;
            return Err(FedhaError::Otp(
                "The code has expired. Request a new one.".into(),
            ));
        }

        if !verify_secret(code, &challenge.code_hash)? {
            let attempts = challenge.attempts + 1;
            if attempts >= self.settings.otp_max_attempts {
                challenges.delete(confirmation)?;
                challenges.save()?;
                return Err(FedhaError::Otp(
                    "Too many attempts. Request a new code.".into(),
                ));
            }
            challenges.update(confirmation, |c| c.attempts = attempts)?;
            challenges.save()?;
            return Err(FedhaError::Otp("Invalid OTP. Please try again.".into()));
        }

        challenges.delete(confirmation)?;
        challenges.save()?;

        let account = self.sign_in_number(&challenge.phone_number)?;
        tracing::info!(uid = %account.uid, "phone verified");
        Ok(account)
    }

    fn sign_in_number(&self, phone: &str) -> FedhaResult<PhoneAccount> {
        let accounts = &self.store.phone_accounts;
        let now = Utc::now();

        let account = match accounts.find(|a| a.phone_number == phone)? {
            Some(existing) => accounts
                .update(existing.uid, |a| a.last_sign_in_at = Some(now))?
                .unwrap_or(existing),
            None => {
                let mut account = PhoneAccount::new(phone);
                account.last_sign_in_at = Some(now);
                accounts.insert(account.clone())?;
                account
            }
        };
        accounts.save()?;

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::outbox::FileOutbox;
    use crate::config::paths::FedhaPaths;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        store: IdentityStore,
        outbox: FileOutbox,
        settings: AuthSettings,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp.path().to_path_buf());
        Fixture {
            store: IdentityStore::new(&paths),
            outbox: FileOutbox::new(paths.outbox_file()),
            settings: AuthSettings::default(),
            _temp: temp,
        }
    }

    fn code_for(outbox: &FileOutbox, phone: &str) -> String {
        let body = outbox.last_to(phone).unwrap().unwrap().body;
        body.split_whitespace().next().unwrap().to_string()
    }

    fn wrong_code(code: &str) -> String {
        if code == "000000" {
            "111111".into()
        } else {
            "000000".into()
        }
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+254 700-000 001").unwrap(), "+254700000001");
        assert!(normalize_phone("0700000001")
            .unwrap_err()
            .to_string()
            .contains("country code"));
        assert!(normalize_phone("+12").is_err());
        assert!(normalize_phone("+2547000abc").is_err());
    }

    #[test]
    fn test_send_and_verify_creates_account_once() {
        let f = fixture();
        let provider = PhoneProvider::new(&f.store, &f.settings, &f.outbox);

        let id = provider.send_otp("+254700000001").unwrap();
        let code = code_for(&f.outbox, "+254700000001");
        assert_eq!(code.len(), 6);

        let first = provider.verify_otp(id, &code).unwrap();
        assert_eq!(first.phone_number, "+254700000001");

        let id = provider.send_otp("+254 700 000 001").unwrap();
        let code = code_for(&f.outbox, "+254700000001");
        let second = provider.verify_otp(id, &code).unwrap();

        assert_eq!(first.uid, second.uid);
        assert_eq!(f.store.phone_accounts.len().unwrap(), 1);
    }

    #[test]
    fn test_update_account_details() {
        let f = fixture();
        let provider = PhoneProvider::new(&f.store, &f.settings, &f.outbox);
        let id = provider.send_otp("+254700000002").unwrap();
        let code = code_for(&f.outbox, "+254700000002");
        let account = provider.verify_otp(id, &code).unwrap();

        let updated = provider
            .update_account(account.uid, Some(" Baraka "), Some("Baraka@Example.com"))
            .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Baraka"));
        assert_eq!(updated.email.as_deref(), Some("baraka@example.com"));

        let cleared = provider.update_account(account.uid, Some(""), None).unwrap();
        assert!(cleared.display_name.is_none());
        assert_eq!(cleared.email.as_deref(), Some("baraka@example.com"));

        assert!(provider
            .update_account(PhoneUid::new(), Some("x"), None)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_code_is_single_use() {
        let f = fixture();
        let provider = PhoneProvider::new(&f.store, &f.settings, &f.outbox);

        let id = provider.send_otp("+254700000001").unwrap();
        let code = code_for(&f.outbox, "+254700000001");
        provider.verify_otp(id, &code).unwrap();

        let err = provider.verify_otp(id, &code).unwrap_err();
        assert!(err.to_string().contains("request OTP first"));
    }

    #[test]
    fn test_new_code_replaces_old() {
        let f = fixture();
        let provider = PhoneProvider::new(&f.store, &f.settings, &f.outbox);

        let old = provider.send_otp("+254700000001").unwrap();
        let new = provider.send_otp("+254700000001").unwrap();
        assert!(f.store.otp_challenges.get(old).unwrap().is_none());
        assert_eq!(provider.latest_challenge().unwrap(), Some(new));
    }

    #[test]
    fn test_attempt_limit() {
        let mut f = fixture();
        f.settings.otp_max_attempts = 2;
        let provider = PhoneProvider::new(&f.store, &f.settings, &f.outbox);

        let id = provider.send_otp("+254700000001").unwrap();
        let code = code_for(&f.outbox, "+254700000001");
        let wrong = wrong_code(&code);

        let err = provider.verify_otp(id, &wrong).unwrap_err();
        assert!(err.to_string().contains("Invalid OTP"));
        let err = provider.verify_otp(id, &wrong).unwrap_err();
        assert!(err.to_string().contains("Too many attempts"));

        // the challenge is gone, even the right code fails now
        assert!(provider.verify_otp(id, &code).is_err());
    }

    #[test]
    fn test_expired_code_rejected() {
        let f = fixture();
        let provider = PhoneProvider::new(&f.store, &f.settings, &f.outbox);

        let id = provider.send_otp("+254700000001").unwrap();
        let code = code_for(&f.outbox, "+254700000001");
        f.store
            .otp_challenges
            .update(id, |c| c.expires_at = Utc::now() - Duration::seconds(1))
            .unwrap();

        let err = provider.verify_otp(id, &code).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_code_format_checked() {
        let f = fixture();
        let provider = PhoneProvider::new(&f.store, &f.settings, &f.outbox);
        let id = provider.send_otp("+254700000001").unwrap();

        assert!(provider.verify_otp(id, "").unwrap_err().is_validation());
        assert!(provider.verify_otp(id, "12ab56").unwrap_err().is_validation());
        assert!(provider.verify_otp(id, "12345").unwrap_err().is_validation());
    }
}
