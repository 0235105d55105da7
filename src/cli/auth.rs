//! Auth CLI commands
//!
//! E-mail/password and phone sign-in. Messages the providers send (confirm
//! links, reset links, SMS codes) land in the outbox file.

use clap::Subcommand;

use crate::display::{format_auth_debug, format_user};
use crate::error::{FedhaError, FedhaResult};
use crate::models::ConfirmationId;

use super::{read_password, CliContext};

/// Auth subcommands
#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account with e-mail and password
    Signup {
        email: String,

        /// Phone number with country code (e.g., +254712345678)
        #[arg(long)]
        phone: Option<String>,

        /// Password (prompted when omitted)
        #[arg(long, env = "FEDHA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in with e-mail and password
    Signin {
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "FEDHA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out of every provider
    Signout,

    /// Show who is signed in
    Whoami,

    /// Confirm an e-mail address with the token from the confirmation message
    Confirm { token: String },

    /// Send a password reset message
    ResetRequest { email: String },

    /// Set a new password with the token from the reset message
    Reset {
        token: String,

        /// New password (prompted when omitted)
        #[arg(long, env = "FEDHA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show the raw session state of both providers
    Debug {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in with a one-time code sent by SMS
    #[command(subcommand)]
    Phone(PhoneCommands),
}

#[derive(Subcommand)]
pub enum PhoneCommands {
    /// Text a verification code to a phone number
    Send {
        /// Phone number with country code (e.g., +254712345678)
        phone: String,
    },

    /// Verify the code and sign in
    Verify {
        code: String,

        /// Confirmation ID printed by `send` (defaults to the latest)
        #[arg(long)]
        confirmation: Option<String>,
    },
}

/// Handle an auth command
pub fn handle_auth_command(ctx: &CliContext<'_>, cmd: AuthCommands) -> FedhaResult<()> {
    match cmd {
        AuthCommands::Signup {
            email,
            phone,
            password,
        } => {
            let password = read_password(password, "Password: ")?;
            let account = ctx.auth.sign_up(&email, &password, phone.as_deref())?;

            println!("Account created for {}", account.email);
            println!(
                "Check your email to confirm your account. Messages are written to {}",
                ctx.paths.outbox_file().display()
            );
            if ctx.settings.auth.require_email_confirmation {
                println!("You can sign in after confirming your email.");
            } else {
                println!("Sign in with 'fedha auth signin {}'.", account.email);
            }
        }

        AuthCommands::Signin { email, password } => {
            let password = read_password(password, "Password: ")?;
            let user = ctx.auth.sign_in(&email, &password)?;
            println!("Welcome back, {}!", user.label());
        }

        AuthCommands::Signout => {
            if ctx.auth.sign_out()? {
                println!("Signed out.");
            } else {
                println!("Nobody was signed in.");
            }
        }

        AuthCommands::Whoami => match ctx.auth.current_user()? {
            Some(user) => print!("{}", format_user(&user)),
            None => println!("Not signed in."),
        },

        AuthCommands::Confirm { token } => {
            let account = ctx.auth.password_provider().confirm_email(&token)?;
            println!("Email {} confirmed.", account.email);
        }

        AuthCommands::ResetRequest { email } => {
            ctx.auth.password_provider().request_password_reset(&email)?;
            println!("If an account exists for {}, a reset link has been sent.", email.trim());
        }

        AuthCommands::Reset { token, password } => {
            let password = read_password(password, "New password: ")?;
            ctx.auth
                .password_provider()
                .reset_password(&token, &password)?;
            println!("Password updated. Sign in with your new password.");
        }

        AuthCommands::Debug { json } => {
            let debug = ctx.auth.debug_state()?;
            if json {
                let text = serde_json::to_string_pretty(&debug)?;
                println!("{}", text);
            } else {
                print!("{}", format_auth_debug(&debug));
            }
        }

        AuthCommands::Phone(cmd) => handle_phone_command(ctx, cmd)?,
    }

    Ok(())
}

fn handle_phone_command(ctx: &CliContext<'_>, cmd: PhoneCommands) -> FedhaResult<()> {
    match cmd {
        PhoneCommands::Send { phone } => {
            let confirmation = ctx.auth.send_otp(&phone)?;
            println!("OTP sent successfully!");
            println!("Confirmation ID: {}", confirmation.as_uuid());
            println!(
                "Enter the code with 'fedha auth phone verify <code>'. Messages are written to {}",
                ctx.paths.outbox_file().display()
            );
        }

        PhoneCommands::Verify { code, confirmation } => {
            let confirmation = match confirmation {
                Some(id) => id.parse::<ConfirmationId>().map_err(|_| {
                    FedhaError::Validation(format!("Invalid confirmation ID: {}", id))
                })?,
                None => ctx
                    .auth
                    .phone_provider()
                    .latest_challenge()?
                    .ok_or_else(|| FedhaError::Otp("Please request OTP first".into()))?,
            };

            let signed_in = ctx.auth.verify_otp(confirmation, &code)?;
            println!("Signed in as {}", signed_in.user.label());
            match signed_in.outcome {
                Some(outcome) => println!("{}", outcome.message()),
                None => eprintln!("Warning: could not link your phone to a profile"),
            }
        }
    }

    Ok(())
}
