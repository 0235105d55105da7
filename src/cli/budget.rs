//! Budget CLI commands

use clap::Subcommand;

use crate::display::format_budget_list;
use crate::error::{FedhaError, FedhaResult};
use crate::models::BudgetPeriodKind;
use crate::services::BudgetService;

use super::{parse_amount, parse_month, CliContext};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a spending limit for a category
    Create {
        /// Expense category (e.g., "Food")
        category: String,

        /// Spending limit
        limit: String,

        /// weekly, monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        period: String,

        /// Month the budget applies to (YYYY-MM, defaults to this month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List budgets
    List {
        /// Only show one month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Set the spent amount by hand
    SetSpent {
        /// Budget ID (as shown by `list`)
        id: String,
        amount: String,
    },

    /// Recompute spent amounts from your expenses
    Refresh {
        /// Only refresh one month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Delete a budget
    Delete {
        /// Budget ID (as shown by `list`)
        id: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(ctx: &CliContext<'_>, cmd: BudgetCommands) -> FedhaResult<()> {
    let user = ctx.require_user()?;
    let service = BudgetService::new(ctx.storage, ctx.currency());

    match cmd {
        BudgetCommands::Create {
            category,
            limit,
            period,
            month,
        } => {
            let limit = parse_amount(&limit, ctx.currency())?;
            let period = period
                .parse::<BudgetPeriodKind>()
                .map_err(|e| FedhaError::Validation(e.to_string()))?;
            let month = parse_month(month.as_deref())?;

            let budget = service.create(user.owner(), &category, limit, period, month)?;
            println!(
                "Created {} budget for {} in {}: {}",
                budget.period,
                budget.category,
                budget.month.label(),
                ctx.money(budget.limit)
            );
        }

        BudgetCommands::List { month } => {
            let month = parse_month(month.as_deref())?;
            let budgets = service.list(user.owner(), month)?;
            println!("{}", format_budget_list(&budgets, ctx.currency()));
        }

        BudgetCommands::SetSpent { id, amount } => {
            let amount = parse_amount(&amount, ctx.currency())?;
            let budget = service.set_spent(user.owner(), &id, amount)?;
            println!(
                "{} {}: {} of {} spent",
                budget.category,
                budget.month,
                ctx.money(budget.spent),
                ctx.money(budget.limit)
            );
            if budget.is_over_budget() {
                println!(
                    "Warning: over budget by {}",
                    ctx.money(budget.spent - budget.limit)
                );
            }
        }

        BudgetCommands::Refresh { month } => {
            let month = parse_month(month.as_deref())?;
            let report = service.refresh_spent(user.owner(), month)?;

            println!("Refreshed {} budget(s).", report.budgets.len());
            for budget in &report.newly_over {
                println!(
                    "Warning: {} budget for {} is now over by {}",
                    budget.category,
                    budget.month.label(),
                    ctx.money(budget.spent - budget.limit)
                );
            }
            if !report.budgets.is_empty() {
                println!();
                println!("{}", format_budget_list(&report.budgets, ctx.currency()));
            }
        }

        BudgetCommands::Delete { id } => {
            let budget = service.delete(user.owner(), &id)?;
            println!("Deleted budget: {} {}", budget.category, budget.month);
        }
    }

    Ok(())
}
