//! Path management for Fedha
//!
//! Resolves where configuration, records, credentials, and logs live.
//!
//! ## Path Resolution Order
//!
//! 1. `FEDHA_DATA_DIR` environment variable (if set)
//! 2. The platform config directory from `directories::ProjectDirs`
//!    (`~/.config/fedha` on Linux, `%APPDATA%\fedha\config` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::FedhaError;

/// Manages all paths used by Fedha
#[derive(Debug, Clone)]
pub struct FedhaPaths {
    base_dir: PathBuf,
}

impl FedhaPaths {
    /// Resolve paths from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, FedhaError> {
        let base_dir = if let Ok(custom) = std::env::var("FEDHA_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "fedha")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    FedhaError::Config("Could not determine a home directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create FedhaPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Records owned by the application (expenses, income, ...)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Tables owned by the two identity providers
    pub fn identity_dir(&self) -> PathBuf {
        self.base_dir.join("identity")
    }

    /// Uploaded profile pictures
    pub fn avatar_dir(&self) -> PathBuf {
        self.base_dir.join("avatars")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Outgoing email and SMS messages (JSON lines)
    pub fn outbox_file(&self) -> PathBuf {
        self.base_dir.join("outbox.log")
    }

    /// The signed-in state of this device
    pub fn session_file(&self) -> PathBuf {
        self.base_dir.join("session.json")
    }

    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    pub fn income_file(&self) -> PathBuf {
        self.data_dir().join("income.json")
    }

    pub fn budgets_file(&self) -> PathBuf {
        self.data_dir().join("budgets.json")
    }

    pub fn goals_file(&self) -> PathBuf {
        self.data_dir().join("goals.json")
    }

    pub fn contributions_file(&self) -> PathBuf {
        self.data_dir().join("contributions.json")
    }

    pub fn profiles_file(&self) -> PathBuf {
        self.data_dir().join("profiles.json")
    }

    pub fn notifications_file(&self) -> PathBuf {
        self.data_dir().join("notifications.json")
    }

    /// Email/password accounts
    pub fn password_accounts_file(&self) -> PathBuf {
        self.identity_dir().join("password_accounts.json")
    }

    /// Phone accounts
    pub fn phone_accounts_file(&self) -> PathBuf {
        self.identity_dir().join("phone_accounts.json")
    }

    /// Pending one-time passcode challenges
    pub fn otp_challenges_file(&self) -> PathBuf {
        self.identity_dir().join("otp_challenges.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), FedhaError> {
        for dir in [
            self.base_dir.clone(),
            self.data_dir(),
            self.identity_dir(),
            self.avatar_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                FedhaError::Io(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        Ok(())
    }

    /// Check if Fedha has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.identity_dir(), temp_dir.path().join("identity"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        env::set_var("FEDHA_DATA_DIR", custom_path);
        let paths = FedhaPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());
        env::remove_var("FEDHA_DATA_DIR");
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.identity_dir().exists());
        assert!(paths.avatar_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FedhaPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.expenses_file(),
            temp_dir.path().join("data").join("expenses.json")
        );
        assert_eq!(
            paths.phone_accounts_file(),
            temp_dir.path().join("identity").join("phone_accounts.json")
        );
    }
}
