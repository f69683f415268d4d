use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use fraudwatch::cli;
use fraudwatch::forms::RegisterForm;

#[derive(Debug, Parser)]
#[command(name = "fraudwatch")]
#[command(about = "Upload transactions for fraud detection and inspect the results")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// Role to assume when the backend does not send one
        #[arg(long)]
        role: Option<String>,
    },
    /// Register a merchant account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        pincode: String,
        #[arg(long = "mobile", default_value = "")]
        mobile_no: String,
    },
    /// Request a password reset email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using a reset token
    ResetPassword {
        #[arg(long)]
        token: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Clear the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show the merchant's fraud history
    Dashboard {
        #[arg(long)]
        merchant: Option<String>,
    },
    /// Upload a file and run fraud detection
    Detect {
        /// fake_review, payment, chargeback or merchant
        #[arg(long)]
        fraud_type: String,
        #[arg(long)]
        file: PathBuf,
        /// Merchant whose history is shown before detection
        #[arg(long)]
        merchant: Option<String>,
        /// Write the transactions as CSV to this file or directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Clear the last detection run
    Close,
    /// Admin aggregates and fraudulent-record export
    Admin {
        /// Only list records of this fraud type
        #[arg(long)]
        fraud_type: Option<String>,
        /// Write the filtered records as CSV to this file or directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Print a raw backend analytics endpoint
    Analytics {
        #[arg(value_enum)]
        view: cli::AnalyticsView,
    },
    /// Show local activity history
    History {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check backend, config and session
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config to ~/.fraudwatch/config.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set one value, e.g. `api.base_url`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Login {
            email,
            password,
            role,
        } => cli::run_login(&email, password, role),
        Commands::Register {
            name,
            email,
            address,
            pincode,
            mobile_no,
        } => cli::run_register(RegisterForm {
            name,
            email,
            address,
            pincode,
            mobile_no,
            ..RegisterForm::default()
        }),
        Commands::ForgotPassword { email } => cli::run_forgot_password(&email),
        Commands::ResetPassword { token, password } => cli::run_reset_password(&token, password),
        Commands::Logout => cli::run_logout(),
        Commands::Whoami => cli::run_whoami(),
        Commands::Dashboard { merchant } => cli::run_dashboard(merchant),
        Commands::Detect {
            fraud_type,
            file,
            merchant,
            export,
        } => cli::run_detect(&fraud_type, &file, merchant, export.as_deref()),
        Commands::Close => cli::run_close(),
        Commands::Admin { fraud_type, export } => cli::run_admin(fraud_type, export.as_deref()),
        Commands::Analytics { view } => cli::run_analytics(view),
        Commands::History { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(fmt, days)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
