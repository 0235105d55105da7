//! Notification display formatting

use chrono::{DateTime, Utc};

use crate::models::Notification;

/// "just now", "5 minutes ago", "3 days ago"
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let (value, unit) = match secs {
        0..=59 => return "just now".to_string(),
        60..=3_599 => (secs / 60, "minute"),
        3_600..=86_399 => (secs / 3_600, "hour"),
        _ => (secs / 86_400, "day"),
    };
    format!("{} {}{} ago", value, unit, if value == 1 { "" } else { "s" })
}

pub fn format_notification_list(notifications: &[Notification], now: DateTime<Utc>) -> String {
    if notifications.is_empty() {
        return "No new notifications".to_string();
    }

    let unread = notifications.iter().filter(|n| !n.read).count();
    let mut output = format!("Notifications ({} unread)\n", unread);
    output.push_str(&"-".repeat(60));
    output.push('\n');

    for n in notifications {
        output.push_str(&format!(
            "{} {} [{}] {}\n    {}\n    {} · {}\n",
            if n.read { " " } else { "●" },
            n.id,
            n.kind,
            n.title,
            n.message,
            time_ago(n.timestamp, now),
            n.timestamp.format("%Y-%m-%d %H:%M")
        ));
    }

    output
}
