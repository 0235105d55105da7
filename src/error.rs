//! Error type shared by every layer of the crate
//!
//! Library code returns [`FedhaResult`]; the binary converts to `anyhow` at
//! the top. Messages are written for the person at the terminal.

use thiserror::Error;

/// The main error type for Fedha operations
#[derive(Error, Debug)]
pub enum FedhaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for submitted forms
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Wrong email or password
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// No signed-in user for an operation that needs one
    #[error("Not signed in. Run 'fedha auth signin' or 'fedha auth phone send <number>' first")]
    Unauthenticated,

    /// The operation needs a password (email) account
    #[error("{0}")]
    FullAccountRequired(String),

    /// Identity provider errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// One-time passcode errors
    #[error("Verification error: {0}")]
    Otp(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

macro_rules! not_found_constructors {
    ($($fn_name:ident => $label:literal),* $(,)?) => {
        $(
            pub fn $fn_name(identifier: impl Into<String>) -> Self {
                Self::NotFound {
                    entity_type: $label,
                    identifier: identifier.into(),
                }
            }
        )*
    };
}

impl FedhaError {
    not_found_constructors! {
        expense_not_found => "Expense",
        income_not_found => "Income",
        budget_not_found => "Budget",
        goal_not_found => "Goal",
        profile_not_found => "Profile",
        phone_account_not_found => "Phone account",
        notification_not_found => "Notification",
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error means the caller must sign in first
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

impl From<std::io::Error> for FedhaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FedhaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for FedhaError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<csv::Error> for FedhaError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for Fedha operations
pub type FedhaResult<T> = Result<T, FedhaError>;
