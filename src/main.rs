use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fedha::audit::{AuditLogger, EntityType};
use fedha::auth::{AuthContext, FileOutbox, IdentityStore};
use fedha::cli::{
    handle_auth_command, handle_budget_command, handle_dashboard_command, handle_expense_command,
    handle_export_command, handle_goal_command, handle_income_command,
    handle_notification_command, handle_profile_command, CliContext,
};
use fedha::config::{paths::FedhaPaths, settings::Settings};
use fedha::services::NotificationCenter;
use fedha::storage::{init, Storage};

#[derive(Parser)]
#[command(
    name = "fedha",
    version,
    about = "Terminal-based personal finance tracker",
    long_about = "FedhaSmart tracks expenses, income, monthly budgets and savings goals \
                  from the command line. Sign in with e-mail and password or with a \
                  one-time code sent to your phone."
)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,

    /// Show the most recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Only entries about one kind of record (e.g., expense, goal)
        #[arg(short, long)]
        entity: Option<EntityType>,
    },

    #[command(flatten)]
    App(AppCommands),
}

/// Commands that run against storage for the signed-in user
#[derive(Subcommand)]
enum AppCommands {
    /// Sign up, sign in and manage sessions
    #[command(subcommand)]
    Auth(fedha::cli::AuthCommands),

    /// Expense tracking
    #[command(subcommand, alias = "exp")]
    Expense(fedha::cli::ExpenseCommands),

    /// Income tracking
    #[command(subcommand)]
    Income(fedha::cli::IncomeCommands),

    /// Monthly spending limits
    #[command(subcommand)]
    Budget(fedha::cli::BudgetCommands),

    /// Savings goals
    #[command(subcommand)]
    Goal(fedha::cli::GoalCommands),

    /// Your profile
    #[command(subcommand)]
    Profile(fedha::cli::ProfileCommands),

    /// In-app notifications
    #[command(subcommand, alias = "notify")]
    Notifications(fedha::cli::NotificationCommands),

    /// Financial overview
    Dashboard {
        /// Months in the trend (defaults to the configured value)
        #[arg(short, long)]
        months: Option<u32>,
    },

    /// Export your records
    #[command(subcommand)]
    Export(fedha::cli::ExportCommands),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("fedha=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = FedhaPaths::new()?;

    let command = match cli.command {
        Some(Commands::Init) => {
            println!("Initializing FedhaSmart at: {}", paths.base_dir().display());
            init::initialize_storage(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Create an account with 'fedha auth signup <email>'");
            println!("or sign in by phone with 'fedha auth phone send <+number>'.");
            return Ok(());
        }
        Some(Commands::Config) => {
            let settings = Settings::load_or_create(&paths)?;
            println!("FedhaSmart Configuration");
            println!("========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Outbox:           {}", paths.outbox_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency:              {}", settings.currency);
            println!("  Dashboard months:      {}", settings.dashboard_months);
            println!("  Min password length:   {}", settings.auth.min_password_length);
            println!(
                "  Require email confirm: {}",
                settings.auth.require_email_confirmation
            );
            println!(
                "  OTP: {} digits, {} min, {} attempts",
                settings.auth.otp_length,
                settings.auth.otp_ttl_minutes,
                settings.auth.otp_max_attempts
            );
            return Ok(());
        }
        Some(Commands::Audit { limit, entity }) => {
            let entries = AuditLogger::new(paths.audit_log()).read_recent(limit, entity)?;
            if entries.is_empty() {
                println!("No audit entries yet.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
            return Ok(());
        }
        Some(Commands::App(command)) => command,
        None => {
            println!("FedhaSmart - Terminal-based personal finance tracker");
            println!();
            println!("Run 'fedha --help' for usage information.");
            return Ok(());
        }
    };

    let settings = if init::needs_initialization(&paths) {
        init::initialize_storage(&paths)?
    } else {
        Settings::load_or_create(&paths)?
    };

    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let identity = IdentityStore::new(&paths);
    identity.load_all()?;

    let outbox = FileOutbox::new(paths.outbox_file());
    let notifications = Arc::new(NotificationCenter::new(
        storage.notifications.clone(),
        settings.currency.clone(),
    ));
    storage.subscribe(notifications.clone());

    let ctx = CliContext {
        paths: &paths,
        settings: &settings,
        storage: &storage,
        auth: AuthContext::new(&storage, &identity, &settings.auth, &outbox),
        notifications: &notifications,
    };

    match command {
        AppCommands::Auth(cmd) => handle_auth_command(&ctx, cmd)?,
        AppCommands::Expense(cmd) => handle_expense_command(&ctx, cmd)?,
        AppCommands::Income(cmd) => handle_income_command(&ctx, cmd)?,
        AppCommands::Budget(cmd) => handle_budget_command(&ctx, cmd)?,
        AppCommands::Goal(cmd) => handle_goal_command(&ctx, cmd)?,
        AppCommands::Profile(cmd) => handle_profile_command(&ctx, cmd)?,
        AppCommands::Notifications(cmd) => handle_notification_command(&ctx, cmd)?,
        AppCommands::Dashboard { months } => handle_dashboard_command(&ctx, months)?,
        AppCommands::Export(cmd) => handle_export_command(&ctx, cmd)?,
    }

    Ok(())
}
