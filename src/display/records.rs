//! Expense and income display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Expense, Income};

use super::{notes_cell, truncate};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

#[derive(Tabled)]
struct IncomeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

/// Expense table, or the empty-state hint
pub fn format_expense_list(expenses: &[Expense], currency: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found. Add your first expense to get started!".to_string();
    }

    let rows = expenses.iter().map(|e| ExpenseRow {
        id: e.id.to_string(),
        date: e.date.to_string(),
        category: e.category.name(),
        amount: e.amount.format_with_currency(currency),
        notes: notes_cell(e.notes.as_deref()),
    });

    let total: crate::models::Money = expenses.iter().map(|e| e.amount).sum();
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!(
        "{}\n\n{} expense(s), total {}",
        table,
        expenses.len(),
        total.format_with_currency(currency)
    )
}

/// Income table, or the empty-state hint
pub fn format_income_list(income: &[Income], currency: &str) -> String {
    if income.is_empty() {
        return "No income found. Add your first income to get started!".to_string();
    }

    let rows = income.iter().map(|i| IncomeRow {
        id: i.id.to_string(),
        date: i.date.to_string(),
        source: truncate(&i.source, 24),
        amount: i.amount.format_with_currency(currency),
        notes: notes_cell(i.notes.as_deref()),
    });

    let total: crate::models::Money = income.iter().map(|i| i.amount).sum();
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!(
        "{}\n\n{} record(s), total {}",
        table,
        income.len(),
        total.format_with_currency(currency)
    )
}
