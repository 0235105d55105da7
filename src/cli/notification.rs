//! Notification CLI commands

use chrono::Utc;
use clap::Subcommand;

use crate::display::format_notification_list;
use crate::error::FedhaResult;

use super::CliContext;

/// Notification subcommands
#[derive(Subcommand)]
pub enum NotificationCommands {
    /// List notifications, newest first
    List {
        /// Only show unread notifications
        #[arg(short, long)]
        unread: bool,
    },

    /// Mark one notification read
    Read {
        /// Notification ID (as shown by `list`)
        id: String,
    },

    /// Mark every notification read
    ReadAll,

    /// Delete all notifications
    Clear,
}

/// Handle a notification command
pub fn handle_notification_command(
    ctx: &CliContext<'_>,
    cmd: NotificationCommands,
) -> FedhaResult<()> {
    let user = ctx.require_user()?;
    let center = ctx.notifications;

    match cmd {
        NotificationCommands::List { unread } => {
            let mut notifications = center.list(user.owner())?;
            if unread {
                notifications.retain(|n| !n.read);
            }
            println!("{}", format_notification_list(&notifications, Utc::now()));
        }

        NotificationCommands::Read { id } => {
            let notification = center.mark_read(user.owner(), &id)?;
            println!("Marked read: {}", notification.title);
        }

        NotificationCommands::ReadAll => {
            let count = center.mark_all_read(user.owner())?;
            println!("Marked {} notification(s) read.", count);
        }

        NotificationCommands::Clear => {
            let count = center.clear(user.owner())?;
            println!("Cleared {} notification(s).", count);
        }
    }

    Ok(())
}
