//! E-mail and password identity provider
//!
//! Owns the `password_accounts` table. Confirmation and reset tokens have
//! the form `<account uuid>.<secret>`; only an Argon2 hash of the secret is
//! stored, so a token is checked against exactly one account.

use chrono::{DateTime, Duration, Utc};

use crate::config::settings::AuthSettings;
use crate::error::{FedhaError, FedhaResult};
use crate::models::{AccountId, PasswordAccount, PendingToken, UserMetadata};
use crate::storage::Table;

use super::outbox::{MessageSender, OutboxMessage};
use super::password::{generate_token, hash_secret, verify_secret};
use super::session::PasswordSession;

pub struct PasswordProvider<'a> {
    accounts: &'a Table<PasswordAccount>,
    settings: &'a AuthSettings,
    sender: &'a dyn MessageSender,
}

/// Trim and lowercase an e-mail address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain.tld` with no spaces
pub fn validate_email(email: &str) -> FedhaResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && domain.contains('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FedhaError::Validation(format!(
            "Invalid email address: {}",
            email
        )))
    }
}

impl<'a> PasswordProvider<'a> {
    pub fn new(
        accounts: &'a Table<PasswordAccount>,
        settings: &'a AuthSettings,
        sender: &'a dyn MessageSender,
    ) -> Self {
        Self {
            accounts,
            settings,
            sender,
        }
    }

    pub fn get(&self, id: AccountId) -> FedhaResult<Option<PasswordAccount>> {
        self.accounts.get(id)
    }

    pub fn find_by_email(&self, email: &str) -> FedhaResult<Option<PasswordAccount>> {
        let email = normalize_email(email);
        self.accounts.find(|a| a.email == email)
    }

    /// Register a new account and send its confirmation e-mail
    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> FedhaResult<PasswordAccount> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(FedhaError::Validation("Email is required".into()));
        }
        validate_email(&email)?;
        self.check_password(password)?;

        if self.find_by_email(&email)?.is_some() {
            return Err(FedhaError::Auth("User already registered".into()));
        }

        let mut account = PasswordAccount::new(email, hash_secret(password)?, metadata);
        let (token, pending) = issue_token(account.id, None)?;
        account.confirmation = Some(pending);

        self.accounts.insert(account.clone())?;
        self.accounts.save()?;

        self.sender.send(&OutboxMessage::email(
            &account.email,
            "Confirm your FedhaSmart account",
            format!(
                "Welcome to FedhaSmart! Confirm your email with: fedha auth confirm {}",
                token
            ),
        ))?;

        tracing::info!(account = %account.id, "password account created");
        Ok(account)
    }

    /// Check credentials and open a session
    pub fn sign_in(&self, email: &str, password: &str) -> FedhaResult<PasswordSession> {
        let account = self
            .find_by_email(email)?
            .ok_or(FedhaError::InvalidCredentials)?;

        if !verify_secret(password, &account.password_hash)? {
            tracing::debug!(account = %account.id, "password mismatch");
            return Err(FedhaError::InvalidCredentials);
        }

        if self.settings.require_email_confirmation && !account.is_email_confirmed() {
            return Err(FedhaError::Auth("Email not confirmed".into()));
        }

        let now = Utc::now();
        self.accounts
            .update(account.id, |a| a.last_sign_in_at = Some(now))?;
        self.accounts.save()?;

        Ok(PasswordSession {
            account_id: account.id,
            created_at: now,
            expires_at: now + Duration::hours(self.settings.session_ttl_hours),
        })
    }

    /// Mark the account's e-mail as confirmed
    pub fn confirm_email(&self, token: &str) -> FedhaResult<PasswordAccount> {
        let invalid = || FedhaError::Auth("Invalid or expired confirmation link".into());

        let (id, secret) = split_token(token).ok_or_else(invalid)?;
        let account = self.accounts.get(id)?.ok_or_else(invalid)?;

        if account.is_email_confirmed() {
            return Ok(account);
        }

        let pending = account.confirmation.as_ref().ok_or_else(invalid)?;
        if pending.is_expired(Utc::now()) || !verify_secret(secret, &pending.token_hash)? {
            return Err(invalid());
        }

        let confirmed = self
            .accounts
            .update(id, |a| {
                a.email_confirmed_at = Some(Utc::now());
                a.confirmation = None;
            })?
            .ok_or_else(invalid)?;
        self.accounts.save()?;

        tracing::info!(account = %id, "email confirmed");
        Ok(confirmed)
    }

    /// Send a reset link. Unknown addresses succeed without sending anything.
    pub fn request_password_reset(&self, email: &str) -> FedhaResult<()> {
        if email.trim().is_empty() {
            return Err(FedhaError::Validation(
                "Please enter your email address".into(),
            ));
        }

        let Some(account) = self.find_by_email(email)? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };

        let expires_at = Utc::now() + Duration::hours(self.settings.reset_ttl_hours);
        let (token, pending) = issue_token(account.id, Some(expires_at))?;

        self.accounts
            .update(account.id, |a| a.recovery = Some(pending))?;
        self.accounts.save()?;

        self.sender.send(&OutboxMessage::email(
            &account.email,
            "Reset your FedhaSmart password",
            format!(
                "Reset your password with: fedha auth reset {} (valid for {} hour(s))",
                token, self.settings.reset_ttl_hours
            ),
        ))?;

        Ok(())
    }

    /// Set a new password using a reset token
    pub fn reset_password(&self, token: &str, new_password: &str) -> FedhaResult<PasswordAccount> {
        let invalid = || FedhaError::Auth("Invalid or expired reset link".into());

        self.check_password(new_password)?;

        let (id, secret) = split_token(token).ok_or_else(invalid)?;
        let account = self.accounts.get(id)?.ok_or_else(invalid)?;
        let pending = account.recovery.as_ref().ok_or_else(invalid)?;

        if pending.is_expired(Utc::now()) || !verify_secret(secret, &pending.token_hash)? {
            return Err(invalid());
        }

        let password_hash = hash_secret(new_password)?;
        let updated = self
            .accounts
            .update(id, |a| {
                a.password_hash = password_hash;
                a.recovery = None;
            })?
            .ok_or_else(invalid)?;
        self.accounts.save()?;

        tracing::info!(account = %id, "password reset");
        Ok(updated)
    }

    /// Replace the metadata the provider keeps for the account
    pub fn update_metadata<F>(&self, id: AccountId, change: F) -> FedhaResult<Option<PasswordAccount>>
    where
        F: FnOnce(&mut UserMetadata),
    {
        let updated = self.accounts.update(id, |a| change(&mut a.metadata))?;
        self.accounts.save()?;
        Ok(updated)
    }

    fn check_password(&self, password: &str) -> FedhaResult<()> {
        let min = self.settings.min_password_length;
        if password.chars().count() < min {
            return Err(FedhaError::Validation(format!(
                "Password should be at least {} characters",
                min
            )));
        }
        Ok(())
    }
}

fn issue_token(
    id: AccountId,
    expires_at: Option<DateTime<Utc>>,
) -> FedhaResult<(String, PendingToken)> {
    let secret = generate_token();
    let pending = PendingToken {
        token_hash: hash_secret(&secret)?,
        expires_at,
    };
    Ok((format!("{}.{}", id.as_uuid().simple(), secret), pending))
}

fn split_token(token: &str) -> Option<(AccountId, &str)> {
    let (id, secret) = token.trim().split_once('.')?;
    let id = AccountId::parse(id).ok()?;
    (!secret.is_empty()).then_some((id, secret))
}
