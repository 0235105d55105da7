//! Income CLI commands

use clap::Subcommand;

use crate::display::format_income_list;
use crate::error::FedhaResult;
use crate::services::IncomeService;

use super::{parse_amount, parse_date, CliContext};

/// Income subcommands
#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Record income
    Add {
        /// Amount (e.g., "50000" or "50,000.00")
        amount: String,

        /// Where the money came from (e.g., "Salary")
        source: String,

        /// Date received (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List income, newest first
    List {
        /// Only show sources containing this text
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Delete an income record
    Delete {
        /// Income ID (as shown by `list`)
        id: String,
    },
}

/// Handle an income command
pub fn handle_income_command(ctx: &CliContext<'_>, cmd: IncomeCommands) -> FedhaResult<()> {
    let user = ctx.require_user()?;
    let service = IncomeService::new(ctx.storage);

    match cmd {
        IncomeCommands::Add {
            amount,
            source,
            date,
            notes,
        } => {
            let amount = parse_amount(&amount, ctx.currency())?;
            let date = parse_date(date.as_deref())?;

            let income = service.add(user.owner(), amount, &source, date, notes)?;
            println!("Income added successfully");
            println!(
                "  {} from {} on {} ({})",
                ctx.money(income.amount),
                income.source,
                income.date,
                income.id
            );
        }

        IncomeCommands::List { source } => {
            let income = service.list(user.owner(), source.as_deref())?;
            println!("{}", format_income_list(&income, ctx.currency()));
        }

        IncomeCommands::Delete { id } => {
            let income = service.delete(user.owner(), &id)?;
            println!(
                "Income deleted: {} from {}",
                ctx.money(income.amount),
                income.source
            );
        }
    }

    Ok(())
}
