//! Expense CLI commands

use clap::Subcommand;

use crate::display::format_expense_list;
use crate::error::{FedhaError, FedhaResult};
use crate::models::ExpenseCategory;
use crate::services::ExpenseService;

use super::{parse_amount, parse_date, CliContext};

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// Amount (e.g., "1500" or "1,500.00")
        amount: String,

        /// Food, Transport, Entertainment, Shopping, Bills, Healthcare or Other
        category: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List expenses, newest first
    List {
        /// Only show one category ("all" shows every category)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID (as shown by `list`)
        id: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(ctx: &CliContext<'_>, cmd: ExpenseCommands) -> FedhaResult<()> {
    let user = ctx.require_user()?;
    let service = ExpenseService::new(ctx.storage);

    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            date,
            notes,
        } => {
            let amount = parse_amount(&amount, ctx.currency())?;
            let category = category
                .parse::<ExpenseCategory>()
                .map_err(|e| FedhaError::Validation(e.to_string()))?;
            let date = parse_date(date.as_deref())?;

            let expense = service.add(user.owner(), amount, category, date, notes)?;
            println!("Expense added successfully");
            println!(
                "  {} {} on {} ({})",
                ctx.money(expense.amount),
                expense.category,
                expense.date,
                expense.id
            );
        }

        ExpenseCommands::List { category } => {
            let filter = match category.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(c) if c.eq_ignore_ascii_case("all") => None,
                Some(c) => Some(
                    c.parse::<ExpenseCategory>()
                        .map_err(|e| FedhaError::Validation(e.to_string()))?,
                ),
            };

            let expenses = service.list(user.owner(), filter)?;
            println!("{}", format_expense_list(&expenses, ctx.currency()));
        }

        ExpenseCommands::Delete { id } => {
            let expense = service.delete(user.owner(), &id)?;
            println!(
                "Expense deleted: {} {} on {}",
                ctx.money(expense.amount),
                expense.category,
                expense.date
            );
        }
    }

    Ok(())
}
