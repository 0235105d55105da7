//! Goal CLI commands

use clap::Subcommand;

use crate::display::{format_goal_details, format_goal_list};
use crate::error::{FedhaError, FedhaResult};
use crate::services::GoalService;

use super::{parse_amount, parse_date, CliContext};

/// Goal subcommands
#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a savings goal
    Create {
        name: String,

        /// Target amount
        target: String,

        /// Amount already saved
        #[arg(short, long)]
        saved: Option<String>,

        /// Target date (YYYY-MM-DD)
        #[arg(short, long)]
        deadline: Option<String>,
    },

    /// List goals
    List,

    /// Add money to a goal
    Contribute {
        /// Goal name or ID
        goal: String,
        amount: String,

        /// Date of the contribution (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Show a goal and its contribution history
    Contributions {
        /// Goal name or ID
        goal: String,
    },

    /// Delete a goal and its contributions
    Delete {
        /// Goal name or ID
        goal: String,
    },
}

/// Handle a goal command
pub fn handle_goal_command(ctx: &CliContext<'_>, cmd: GoalCommands) -> FedhaResult<()> {
    let user = ctx.require_user()?;
    let service = GoalService::new(ctx.storage);

    match cmd {
        GoalCommands::Create {
            name,
            target,
            saved,
            deadline,
        } => {
            let target = parse_amount(&target, ctx.currency())?;
            let saved = saved
                .as_deref()
                .map(|s| parse_amount(s, ctx.currency()))
                .transpose()?;
            let deadline = parse_date(deadline.as_deref())?;

            let goal = service.create(user.owner(), &name, target, saved, deadline)?;
            println!(
                "Created goal '{}' with target {} ({})",
                goal.name,
                ctx.money(goal.target_amount),
                goal.id
            );
        }

        GoalCommands::List => {
            let goals = service.list(user.owner())?;
            println!("{}", format_goal_list(&goals, ctx.currency()));
        }

        GoalCommands::Contribute {
            goal,
            amount,
            date,
            notes,
        } => {
            let amount = parse_amount(&amount, ctx.currency())?;
            let date = parse_date(date.as_deref())?;

            let (goal, contribution) = service.contribute(user.owner(), &goal, amount, date, notes)?;
            println!(
                "Added {} to '{}'. Saved {} of {} ({:.1}%).",
                ctx.money(contribution.amount),
                goal.name,
                ctx.money(goal.saved_amount),
                ctx.money(goal.target_amount),
                goal.progress()
            );
            if goal.is_completed() {
                println!("Goal reached!");
            }
        }

        GoalCommands::Contributions { goal } => {
            let found = service
                .find(user.owner(), &goal)?
                .ok_or_else(|| FedhaError::goal_not_found(&goal))?;
            let contributions = service.contributions(user.owner(), &found.id.to_string())?;
            println!("{}", format_goal_details(&found, &contributions, ctx.currency()));
        }

        GoalCommands::Delete { goal } => {
            let (goal, removed) = service.delete(user.owner(), &goal)?;
            println!(
                "Deleted goal '{}' and {} contribution(s).",
                goal.name, removed
            );
        }
    }

    Ok(())
}
