//! Tables owned by the identity providers
//!
//! Kept apart from the record store: application code reaches these rows
//! only through the providers.

use crate::config::paths::FedhaPaths;
use crate::error::FedhaResult;
use crate::models::{OtpChallenge, PasswordAccount, PhoneAccount};
use crate::storage::Table;

pub struct IdentityStore {
    pub password_accounts: Table<PasswordAccount>,
    pub phone_accounts: Table<PhoneAccount>,
    pub otp_challenges: Table<OtpChallenge>,
}

impl IdentityStore {
    pub fn new(paths: &FedhaPaths) -> Self {
        Self {
            password_accounts: Table::new(paths.password_accounts_file()),
            phone_accounts: Table::new(paths.phone_accounts_file()),
            otp_challenges: Table::new(paths.otp_challenges_file()),
        }
    }

    pub fn load_all(&self) -> FedhaResult<()> {
        self.password_accounts.load()?;
        self.phone_accounts.load()?;
        self.otp_challenges.load()?;
        Ok(())
    }
}
