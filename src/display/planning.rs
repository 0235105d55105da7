//! Budget and goal display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Budget, Contribution, Goal};

use super::{notes_cell, progress_bar, truncate};

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Limit")]
    limit: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Used")]
    used: String,
}

#[derive(Tabled)]
struct GoalRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Goal")]
    name: String,
    #[tabled(rename = "Saved")]
    saved: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
}

#[derive(Tabled)]
struct ContributionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

pub fn format_budget_list(budgets: &[Budget], currency: &str) -> String {
    if budgets.is_empty() {
        return "No budgets found. Create a budget to start tracking your spending.".to_string();
    }

    let rows = budgets.iter().map(|b| BudgetRow {
        id: b.id.to_string(),
        month: b.month.to_string(),
        category: b.category.clone(),
        period: b.period.to_string(),
        limit: b.limit.format_with_currency(currency),
        spent: b.spent.format_with_currency(currency),
        remaining: b.remaining().format_with_currency(currency),
        used: if b.is_over_budget() {
            format!("{:.0}% OVER", b.utilization())
        } else {
            format!("{:.0}%", b.utilization())
        },
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

pub fn format_goal_list(goals: &[Goal], currency: &str) -> String {
    if goals.is_empty() {
        return "No goals yet. Create a savings goal to get started!".to_string();
    }

    let rows = goals.iter().map(|g| GoalRow {
        id: g.id.to_string(),
        name: truncate(&g.name, 24),
        saved: g.saved_amount.format_with_currency(currency),
        target: g.target_amount.format_with_currency(currency),
        progress: if g.is_completed() {
            format!("{} done", progress_bar(g.progress(), 10))
        } else {
            format!("{} {:.0}%", progress_bar(g.progress(), 10), g.progress())
        },
        deadline: g
            .deadline
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

/// One goal's details followed by its contribution history
pub fn format_goal_details(goal: &Goal, contributions: &[Contribution], currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Goal:      {}\n", goal.name));
    output.push_str(&format!("ID:        {}\n", goal.id));
    output.push_str(&format!(
        "Saved:     {} of {}\n",
        goal.saved_amount.format_with_currency(currency),
        goal.target_amount.format_with_currency(currency)
    ));
    output.push_str(&format!(
        "Progress:  {} {:.1}%\n",
        progress_bar(goal.progress(), 20),
        goal.progress()
    ));
    output.push_str(&format!(
        "Remaining: {}\n",
        goal.remaining().format_with_currency(currency)
    ));
    if let Some(deadline) = goal.deadline {
        output.push_str(&format!("Deadline:  {}\n", deadline));
    }

    output.push('\n');
    if contributions.is_empty() {
        output.push_str("No contributions yet.");
        return output;
    }

    let rows = contributions.iter().map(|c| ContributionRow {
        date: c.date.to_string(),
        amount: c.amount.format_with_currency(currency),
        notes: notes_cell(c.notes.as_deref()),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    output.push_str(&table.to_string());
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetPeriodKind, Money, Month, OwnerId};

    #[test]
    fn test_budget_list_marks_over_budget() {
        let mut budget = Budget::new(
            OwnerId::new(),
            "Food",
            Money::from_cents(10_000),
            BudgetPeriodKind::Monthly,
            Month::new(2025, 5).unwrap(),
        );
        budget.set_spent(Money::from_cents(15_000));

        let output = format_budget_list(&[budget], "KES");
        assert!(output.contains("2025-05"));
        assert!(output.contains("150% OVER"));
        assert!(output.contains("-KES 50.00"));
    }

    #[test]
    fn test_goal_details() {
        let mut goal = Goal::new(OwnerId::new(), "Laptop", Money::from_cents(10_000));
        goal.add_saved(Money::from_cents(2_500)).unwrap();

        let output = format_goal_details(&goal, &[], "KES");
        assert!(output.contains("KES 25.00 of KES 100.00"));
        assert!(output.contains("25.0%"));
        assert!(output.ends_with("No contributions yet."));
    }

    #[test]
    fn test_empty_lists() {
        assert!(format_budget_list(&[], "KES").starts_with("No budgets found"));
        assert!(format_goal_list(&[], "KES").starts_with("No goals yet"));
    }
}
