//! Export CLI commands
//!
//! Writes to a file when `--output` is given, otherwise to stdout. Each
//! export raises a report notification.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::error::FedhaResult;
use crate::export::{export_expenses_csv, export_income_csv, export_user_json, export_user_yaml};
use crate::models::NotificationKind;

use super::CliContext;

#[derive(Clone, Copy, ValueEnum)]
pub enum CsvKind {
    Expenses,
    Income,
}

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Expenses or income as CSV
    Csv {
        #[arg(value_enum, default_value = "expenses")]
        kind: CsvKind,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// All of your records as JSON
    Json {
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// All of your records as YAML
    Yaml {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn open_output(output: Option<&PathBuf>) -> FedhaResult<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

/// Handle an export command
pub fn handle_export_command(ctx: &CliContext<'_>, cmd: ExportCommands) -> FedhaResult<()> {
    let user = ctx.require_user()?;

    let (what, output, records) = match cmd {
        ExportCommands::Csv { kind, output } => {
            let mut writer = open_output(output.as_ref())?;
            let (what, count) = match kind {
                CsvKind::Expenses => (
                    "Expenses CSV",
                    export_expenses_csv(ctx.storage, user.owner(), &mut writer)?,
                ),
                CsvKind::Income => (
                    "Income CSV",
                    export_income_csv(ctx.storage, user.owner(), &mut writer)?,
                ),
            };
            writer.flush()?;
            (what, output, count)
        }

        ExportCommands::Json { output, compact } => {
            let mut writer = open_output(output.as_ref())?;
            let export = export_user_json(ctx.storage, &user, &mut writer, !compact)?;
            writer.flush()?;
            let m = &export.metadata;
            (
                "JSON export",
                output,
                m.expense_count + m.income_count + m.budget_count + m.goal_count + m.contribution_count,
            )
        }

        ExportCommands::Yaml { output } => {
            let mut writer = open_output(output.as_ref())?;
            let export = export_user_yaml(ctx.storage, &user, &mut writer)?;
            writer.flush()?;
            let m = &export.metadata;
            (
                "YAML export",
                output,
                m.expense_count + m.income_count + m.budget_count + m.goal_count + m.contribution_count,
            )
        }
    };

    let destination = output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());

    ctx.notifications.notify(
        user.owner(),
        NotificationKind::Report,
        "Report Exported",
        format!("{} with {} record(s) written to {}", what, records, destination),
    )?;

    if output.is_some() {
        println!("Exported {} record(s) to {}", records, destination);
    }

    Ok(())
}
