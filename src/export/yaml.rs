//! YAML Export functionality
//!
//! Same content as the JSON export, for reading by eye.

use std::io::Write;

use crate::auth::UnifiedUser;
use crate::error::FedhaResult;
use crate::export::json::UserExport;
use crate::storage::Storage;

/// Export the user's records to YAML
pub fn export_user_yaml<W: Write>(
    storage: &Storage,
    user: &UnifiedUser,
    writer: &mut W,
) -> FedhaResult<UserExport> {
    let export = UserExport::from_storage(storage, user)?;

    writeln!(writer, "# FedhaSmart data export for {}", user.label())?;
    writeln!(writer, "# Generated: {}", export.exported_at)?;
    writeln!(writer, "# App Version: {}", export.app_version)?;
    writeln!(writer, "#")?;
    writeln!(writer, "# Keep it secure - it contains all your financial data.")?;
    writeln!(writer)?;

    serde_yaml::to_writer(&mut *writer, &export)?;

    Ok(export)
}
