//! Display formatting for terminal output
//!
//! Tables for record lists (via `tabled`) and plain-text detail views.

pub mod account;
pub mod notification;
pub mod planning;
pub mod records;

pub use account::{format_auth_debug, format_profile, format_user};
pub use notification::{format_notification_list, time_ago};
pub use planning::{format_budget_list, format_goal_details, format_goal_list};
pub use records::{format_expense_list, format_income_list};

/// Cut `s` to `max` characters, ending with "..." when shortened
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn notes_cell(notes: Option<&str>) -> String {
    notes.map(|n| truncate(n, 30)).unwrap_or_else(|| "-".to_string())
}

/// Text bar for a 0-100 percentage
fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
