//! Profile CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::display::format_profile;
use crate::error::{FedhaError, FedhaResult};
use crate::services::ProfileService;

use super::CliContext;

/// Profile subcommands
#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show your profile
    Show,

    /// Change display name and/or bio (requires an e-mail account)
    Edit {
        #[arg(long)]
        name: Option<String>,

        /// Short bio ("" clears it)
        #[arg(long)]
        bio: Option<String>,
    },

    /// Upload a profile picture (requires an e-mail account)
    Avatar { file: PathBuf },

    /// Change the phone number on your profile
    SetPhone {
        /// Phone number with country code (e.g., +254712345678)
        phone: String,
    },
}

/// Handle a profile command
pub fn handle_profile_command(ctx: &CliContext<'_>, cmd: ProfileCommands) -> FedhaResult<()> {
    let user = ctx.require_user()?;
    let service = ProfileService::new(ctx.storage);

    match cmd {
        ProfileCommands::Show => {
            let view = service.load(&user)?;
            print!("{}", format_profile(&view));
        }

        ProfileCommands::Edit { name, bio } => {
            if name.is_none() && bio.is_none() {
                return Err(FedhaError::Validation(
                    "Nothing to change. Pass --name and/or --bio".into(),
                ));
            }
            service.save(&user, name.as_deref(), bio.as_deref())?;
            println!("Profile updated successfully");
        }

        ProfileCommands::Avatar { file } => {
            let profile = service.upload_avatar(&user, &file)?;
            println!("Profile picture updated successfully");
            if let Some(url) = profile.avatar_url {
                println!("  stored at {}", url);
            }
        }

        ProfileCommands::SetPhone { phone } => {
            let profile = ctx.auth.update_profile(&user, Some(&phone), None)?;
            println!(
                "Phone number set to {}",
                profile.phone.as_deref().unwrap_or(phone.as_str())
            );
        }
    }

    Ok(())
}
