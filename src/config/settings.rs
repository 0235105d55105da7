//! User settings for Fedha
//!
//! Currency label, credential policy, and dashboard preferences. Every field
//! has a serde default so older config files keep loading.

use serde::{Deserialize, Serialize};

use super::paths::FedhaPaths;
use crate::error::FedhaError;

/// Credential and session policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Minimum password length at sign-up and reset
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Refuse password sign-in until the email address is confirmed
    #[serde(default)]
    pub require_email_confirmation: bool,

    /// Number of digits in a phone passcode
    #[serde(default = "default_otp_length")]
    pub otp_length: usize,

    /// Minutes before a phone passcode expires
    #[serde(default = "default_otp_ttl_minutes")]
    pub otp_ttl_minutes: i64,

    /// Wrong guesses allowed before a passcode is burned
    #[serde(default = "default_otp_max_attempts")]
    pub otp_max_attempts: u32,

    /// Hours a password session stays valid
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,

    /// Hours a password reset link stays valid
    #[serde(default = "default_reset_ttl_hours")]
    pub reset_ttl_hours: i64,
}

fn default_min_password_length() -> usize {
    6
}

fn default_otp_length() -> usize {
    6
}

fn default_otp_ttl_minutes() -> i64 {
    5
}

fn default_otp_max_attempts() -> u32 {
    5
}

fn default_session_ttl_hours() -> i64 {
    24 * 7
}

fn default_reset_ttl_hours() -> i64 {
    1
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            require_email_confirmation: false,
            otp_length: default_otp_length(),
            otp_ttl_minutes: default_otp_ttl_minutes(),
            otp_max_attempts: default_otp_max_attempts(),
            session_ttl_hours: default_session_ttl_hours(),
            reset_ttl_hours: default_reset_ttl_hours(),
        }
    }
}

/// User settings for Fedha
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency label shown before amounts
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Months shown in the dashboard trend
    #[serde(default = "default_dashboard_months")]
    pub dashboard_months: u32,

    #[serde(default)]
    pub auth: AuthSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "KES".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_dashboard_months() -> u32 {
    6
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency: default_currency(),
            date_format: default_date_format(),
            dashboard_months: default_dashboard_months(),
            auth: AuthSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &FedhaPaths) -> Result<Self, FedhaError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| FedhaError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| FedhaError::Config(format!("Failed to parse settings file: {}", e)))?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &FedhaPaths) -> Result<(), FedhaError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| FedhaError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| FedhaError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
