//! CSV Export functionality
//!
//! One row per expense or income record, oldest first, amounts in whole
//! currency units with two decimals.

use std::io::Write;

use serde::Serialize;

use crate::error::FedhaResult;
use crate::models::OwnerId;
use crate::storage::Storage;

#[derive(Serialize)]
struct ExpenseRow<'a> {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Notes")]
    notes: &'a str,
}

#[derive(Serialize)]
struct IncomeRow<'a> {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Source")]
    source: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Notes")]
    notes: &'a str,
}

/// Export the owner's expenses. Returns the number of rows written.
pub fn export_expenses_csv<W: Write>(
    storage: &Storage,
    owner: OwnerId,
    writer: W,
) -> FedhaResult<usize> {
    let mut expenses = storage.expenses.select(|e| e.owner == owner)?;
    expenses.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.created_at.cmp(&b.created_at)));

    let mut csv = ::csv::Writer::from_writer(writer);
    if expenses.is_empty() {
        csv.write_record(["ID", "Date", "Category", "Amount", "Notes"])?;
    }
    for expense in &expenses {
        csv.serialize(ExpenseRow {
            id: expense.id.as_uuid().to_string(),
            date: expense.date.to_string(),
            category: expense.category.name(),
            amount: expense.amount.to_string(),
            notes: expense.notes.as_deref().unwrap_or_default(),
        })?;
    }
    csv.flush()?;

    Ok(expenses.len())
}

/// Export the owner's income. Returns the number of rows written.
pub fn export_income_csv<W: Write>(
    storage: &Storage,
    owner: OwnerId,
    writer: W,
) -> FedhaResult<usize> {
    let mut income = storage.income.select(|i| i.owner == owner)?;
    income.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.created_at.cmp(&b.created_at)));

    let mut csv = ::csv::Writer::from_writer(writer);
    if income.is_empty() {
        csv.write_record(["ID", "Date", "Source", "Amount", "Notes"])?;
    }
    for row in &income {
        csv.serialize(IncomeRow {
            id: row.id.as_uuid().to_string(),
            date: row.date.to_string(),
            source: &row.source,
            amount: row.amount.to_string(),
            notes: row.notes.as_deref().unwrap_or_default(),
        })?;
    }
    csv.flush()?;

    Ok(income.len())
}
