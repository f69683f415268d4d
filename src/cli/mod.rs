//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `fraudwatch login | register | forgot-password | reset-password | logout | whoami`
//! - `fraudwatch dashboard`: merchant fraud history
//! - `fraudwatch detect --fraud-type T --file F`: upload and classify a file
//! - `fraudwatch close`: clear the last detection run
//! - `fraudwatch admin`: aggregate view and record export
//! - `fraudwatch analytics <view>`: raw backend analytics endpoints
//! - `fraudwatch history`: local activity log
//! - `fraudwatch health`: backend, config and session checks
//! - `fraudwatch config show|init|set|reset`: configuration management

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::activity::reporter::{self, EventStat};
use crate::activity::{ActivityEntry, ActivityLog};
use crate::admin::AdminDashboard;
use crate::alert::TerminalNotifier;
use crate::api::{FraudType, HttpClient, Summary, Transaction};
use crate::auth::AuthService;
use crate::charts::Chart;
use crate::config::{self, FraudwatchConfig};
use crate::dashboard::{Dashboard, RunOutcome};
use crate::forms::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};
use crate::session::{self, Session};

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Backend analytics endpoints not tied to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AnalyticsView {
    Metrics,
    FraudVsLegit,
    Hourly,
    Runs,
    FakeReviews,
}

/// Everything a command needs: resolved config, the stored session, an
/// authorized client and the activity log.
struct CommandEnv {
    cfg: FraudwatchConfig,
    session: Session,
    client: HttpClient,
    log: ActivityLog,
}

fn command_env() -> CommandEnv {
    let cfg = config::load();
    let store = session::open_store(&cfg.session);
    let session = Session::load(store.as_ref());
    let client = HttpClient::from_config(&cfg.api).with_session(&session);
    let log = ActivityLog::from_config(&cfg.logging);
    CommandEnv {
        cfg,
        session,
        client,
        log,
    }
}

fn require_login(session: &Session) -> Result<()> {
    if !session.is_authenticated() {
        anyhow::bail!("Not logged in. Run `fraudwatch login` first.");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// fraudwatch login | register | forgot-password | reset-password
// ---------------------------------------------------------------------------

/// Log in and persist the session.
pub fn run_login(email: &str, password: Option<String>, role: Option<String>) -> Result<()> {
    let cfg = config::load();
    let client = HttpClient::from_config(&cfg.api);
    let mut store = session::open_store(&cfg.session);
    let log = ActivityLog::from_config(&cfg.logging);

    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };
    let mut form = LoginForm::new(email, password);
    if let Some(role) = role {
        form.role = role;
    }

    let mut auth = AuthService::new(&client, store.as_mut(), log);
    let landing = auth.login(&form)?;
    let name = auth.username().unwrap_or_else(|| session::UNKNOWN_USER.to_string());

    println!("{} Logged in as {}", "✓".green().bold(), name.bold());
    println!("  {} {}", "Landing:".dimmed(), landing);
    Ok(())
}

/// Register a merchant account.
pub fn run_register(mut form: RegisterForm) -> Result<()> {
    let cfg = config::load();
    let client = HttpClient::from_config(&cfg.api);
    let mut store = session::open_store(&cfg.session);
    let log = ActivityLog::from_config(&cfg.logging);

    if form.password.is_empty() {
        form.password = prompt("Password: ")?;
        form.confirm_password = prompt("Confirm password: ")?;
    }

    let auth = AuthService::new(&client, store.as_mut(), log);
    auth.register(&form)?;
    println!(
        "{} Registration successful. You can now log in as {}.",
        "✓".green().bold(),
        form.email.trim().bold()
    );
    Ok(())
}

pub fn run_forgot_password(email: &str) -> Result<()> {
    let cfg = config::load();
    let client = HttpClient::from_config(&cfg.api);
    let mut store = session::open_store(&cfg.session);
    let log = ActivityLog::from_config(&cfg.logging);

    let auth = AuthService::new(&client, store.as_mut(), log);
    let message = auth.forgot_password(&ForgotPasswordForm {
        email: email.to_string(),
    })?;
    println!("{} {}", "✓".green().bold(), message);
    Ok(())
}

pub fn run_reset_password(token: &str, password: Option<String>) -> Result<()> {
    let cfg = config::load();
    let client = HttpClient::from_config(&cfg.api);
    let mut store = session::open_store(&cfg.session);
    let log = ActivityLog::from_config(&cfg.logging);

    let (new_password, confirm_password) = match password {
        Some(p) => (p.clone(), p),
        None => (prompt("New password: ")?, prompt("Confirm password: ")?),
    };

    let auth = AuthService::new(&client, store.as_mut(), log);
    let message = auth.reset_password(&ResetPasswordForm {
        token: token.to_string(),
        new_password,
        confirm_password,
    })?;
    println!("{} {}", "✓".green().bold(), message);
    Ok(())
}

// ---------------------------------------------------------------------------
// fraudwatch logout | whoami
// ---------------------------------------------------------------------------

pub fn run_logout() -> Result<()> {
    let cfg = config::load();
    let client = HttpClient::from_config(&cfg.api);
    let mut store = session::open_store(&cfg.session);
    let log = ActivityLog::from_config(&cfg.logging);

    AuthService::new(&client, store.as_mut(), log).logout()?;
    println!("{} Logged out", "✓".green().bold());
    Ok(())
}

pub fn run_whoami() -> Result<()> {
    let ctx = command_env();
    if !ctx.session.is_authenticated() {
        println!("{}", "Not logged in.".yellow());
        return Ok(());
    }
    println!("  {} {}", "User:".bold(), ctx.session.display_name());
    println!(
        "  {} {}",
        "Role:".bold(),
        ctx.session.role.as_deref().unwrap_or("merchant")
    );
    println!("  {} {}", "Backend:".bold(), ctx.client.base_url());
    Ok(())
}

// ---------------------------------------------------------------------------
// fraudwatch dashboard | detect | close
// ---------------------------------------------------------------------------

/// Show the merchant's historical fraud split.
pub fn run_dashboard(merchant: Option<String>) -> Result<()> {
    let ctx = command_env();
    require_login(&ctx.session)?;

    let merchant = merchant.unwrap_or_else(|| ctx.cfg.dashboard.default_merchant.clone());
    let mut view = Dashboard::new(
        &ctx.client,
        TerminalNotifier,
        ctx.cfg.dashboard.clone(),
        ctx.session.display_name(),
    )
    .with_log(ctx.log.clone());
    view.load(&merchant)?;

    println!("{}", format!("{merchant} Dashboard").bold().cyan());
    println!("{}", "=".repeat(50));
    if let Some(summary) = view.merchant_summary() {
        for row in &summary.fraud_summary {
            println!(
                "  {:<14} {:>8} total {:>8} fraud {:>8} legit",
                row.fraud_type,
                format_number(row.total_transactions),
                format_number(row.fraudulent),
                format_number(row.non_fraudulent),
            );
        }
        println!();
    }
    print_charts(view.charts());
    Ok(())
}

/// Upload a file and run detection.
pub fn run_detect(
    fraud_type: &str,
    file: &Path,
    merchant: Option<String>,
    export: Option<&Path>,
) -> Result<()> {
    let ctx = command_env();
    require_login(&ctx.session)?;
    let fraud_type: FraudType = fraud_type.parse()?;

    let mut view = Dashboard::new(
        &ctx.client,
        TerminalNotifier,
        ctx.cfg.dashboard.clone(),
        ctx.session.display_name(),
    )
    .with_log(ctx.log.clone());

    let merchant = merchant.unwrap_or_else(|| ctx.cfg.dashboard.default_merchant.clone());
    if let Err(err) = view.load(&merchant) {
        eprintln!("  {} {err:#}", "warning:".yellow());
    }

    view.select_fraud_type(fraud_type);
    if !view.select_path(file)? {
        return Ok(());
    }

    println!(
        "{} Detecting {} fraud in {}…",
        "→".cyan(),
        fraud_type.to_string().bold(),
        file.display()
    );

    if !finished(view.run_detection())? {
        return Ok(());
    }

    if let Some(summary) = view.summary() {
        print_summary(summary);
    }
    print_transactions(view.transactions(), 20);
    print_charts(view.charts());

    if let Some(target) = export {
        match view.export_csv()? {
            Some(csv) => {
                let written = csv.save(target)?;
                println!(
                    "{} Exported {} rows to {}",
                    "✓".green().bold(),
                    csv.line_count().saturating_sub(1),
                    written.display()
                );
            }
            None => println!("{}", "No transactions to export.".yellow()),
        }
    }
    Ok(())
}

/// Clear the last detection run on the backend.
pub fn run_close() -> Result<()> {
    let ctx = command_env();
    require_login(&ctx.session)?;

    let mut view = Dashboard::new(
        &ctx.client,
        TerminalNotifier,
        ctx.cfg.dashboard.clone(),
        ctx.session.display_name(),
    )
    .with_log(ctx.log.clone());
    if view.close_dashboard() {
        println!("{} Dashboard cleared", "✓".green().bold());
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!();
    println!(
        "{}",
        format!("{} Detection Summary", summary.fraud_type).bold().cyan()
    );
    println!("{}", "=".repeat(50));
    if let Some(merchant) = &summary.merchant_name {
        println!("  {} {}", "Merchant:    ".bold(), merchant);
    }
    println!(
        "  {} {}",
        "Transactions:".bold(),
        format_number(summary.total_transactions)
    );
    println!(
        "  {} {}",
        "Fraud:       ".bold(),
        format_number(summary.total_fraud).red()
    );
    println!(
        "  {} {}",
        "Non-fraud:   ".bold(),
        format_number(summary.total_non_fraud).green()
    );
    println!("  {} {:.1}%", "Fraud rate:  ".bold(), summary.fraud_percentage);
    println!();
}

fn print_transactions(transactions: &[Transaction], limit: usize) {
    if transactions.is_empty() {
        return;
    }
    println!("{}", "Transactions".bold().cyan());
    println!("  {:<16} {:<32} Status", "ID", "Text");
    println!("  {}", "-".repeat(58));
    for (i, txn) in transactions.iter().take(limit).enumerate() {
        let status = if txn.is_fraud() {
            txn.status().red()
        } else {
            txn.status().green()
        };
        let line = format!(
            "  {:<16} {:<32}",
            truncate(&txn.id(), 16),
            truncate(&txn.captured_text(), 32)
        );
        if i % 2 == 0 {
            println!("{line} {status}");
        } else {
            println!("{} {status}", line.dimmed());
        }
    }
    if transactions.len() > limit {
        println!(
            "  {}",
            format!("… {} more (use --export to save all)", transactions.len() - limit).dimmed()
        );
    }
    println!();
}

fn print_charts<'a>(charts: impl Iterator<Item = &'a Chart>) {
    let colorize = colored::control::SHOULD_COLORIZE.should_colorize();
    for chart in charts {
        println!("{}", chart.render(colorize));
    }
}

// ---------------------------------------------------------------------------
// fraudwatch admin
// ---------------------------------------------------------------------------

/// Admin aggregates, optionally filtered and exported.
pub fn run_admin(fraud_type: Option<String>, export: Option<&Path>) -> Result<()> {
    let ctx = command_env();
    require_login(&ctx.session)?;
    if !ctx.session.is_admin() {
        anyhow::bail!("The admin view requires an admin account.");
    }

    let mut view = AdminDashboard::new(&ctx.client, ctx.cfg.dashboard.chart_width)
        .with_log(ctx.log.clone());
    for err in view.load() {
        eprintln!("  {} {err:#}", "warning:".yellow());
    }
    if let Some(selection) = &fraud_type {
        view.apply_filter(selection);
    }

    println!("{}", "Admin Dashboard".bold().cyan());
    println!("{}", "=".repeat(60));
    if !view.fraud_summary().is_empty() {
        println!(
            "  {:<14} {:>10} {:>10} {:>10} {:>8}",
            "Fraud type", "Total", "Fraud", "Legit", "Rate"
        );
        println!("  {}", "-".repeat(56));
        for row in view.fraud_summary() {
            let rate = row.fraud_percentage.unwrap_or_else(|| {
                if row.total_transactions == 0 {
                    0.0
                } else {
                    row.fraudulent as f64 / row.total_transactions as f64 * 100.0
                }
            });
            println!(
                "  {:<14} {:>10} {:>10} {:>10} {:>7.1}%",
                truncate(&row.fraud_type, 14),
                format_number(row.total_transactions),
                format_number(row.fraudulent),
                format_number(row.non_fraudulent),
                rate,
            );
        }
        println!();
    }
    print_charts(view.charts());

    let records = view.filtered();
    let label = if view.selection().is_empty() {
        "all types".to_string()
    } else {
        view.selection().to_string()
    };
    println!(
        "{}",
        format!("Fraudulent Records ({label}): {}", records.len())
            .bold()
            .cyan()
    );
    for record in records.iter().take(20) {
        println!(
            "  {:<16} {:<14} {:<14} {}",
            truncate(record.transaction_id.as_deref().unwrap_or("-"), 16),
            truncate(record.merchant_name.as_deref().unwrap_or("-"), 14),
            record.fraud_type.as_deref().unwrap_or("-"),
            record.status_label(),
        );
    }

    if let Some(target) = export {
        let csv = view.export_csv()?;
        let written = csv.save(target)?;
        println!(
            "{} Exported {} records to {}",
            "✓".green().bold(),
            csv.line_count().saturating_sub(1),
            written.display()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// fraudwatch analytics
// ---------------------------------------------------------------------------

/// Print a raw analytics endpoint as JSON.
pub fn run_analytics(view: AnalyticsView) -> Result<()> {
    let ctx = command_env();
    require_login(&ctx.session)?;

    let value = match view {
        AnalyticsView::Metrics => ctx.client.metrics(),
        AnalyticsView::FraudVsLegit => ctx.client.fraud_vs_legit(),
        AnalyticsView::Hourly => ctx.client.hourly_transactions(),
        AnalyticsView::Runs => ctx.client.runs(),
        AnalyticsView::FakeReviews => ctx.client.fake_reviews(),
    }?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// fraudwatch history
// ---------------------------------------------------------------------------

/// Summarize the local activity log.
pub fn run_history(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let cfg = config::load();
    let log = ActivityLog::from_config(&cfg.logging);
    let entries = log.read_since_days(days);

    if entries.is_empty() {
        println!("{}", "No activity recorded yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Csv => print_history_csv(&entries)?,
        OutputFormat::Table => print_history_table(&entries),
    }
    Ok(())
}

fn print_history_table(entries: &[ActivityEntry]) {
    let stats = reporter::summarize(entries);
    println!("{}", "Fraudwatch Activity".bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "  {:<16} {:>6} {:>9} {:>10} Last seen",
        "Event", "Count", "Failed", "Avg ms"
    );
    println!("  {}", "-".repeat(58));
    for stat in &stats {
        print_event_stat(stat);
    }

    println!();
    println!("{}", "Recent".bold().cyan());
    for entry in entries.iter().rev().take(10) {
        println!(
            "  {} {:<16} {:<10} {}",
            truncate(&entry.timestamp, 19).dimmed(),
            entry.event,
            entry.outcome,
            entry.detail.as_deref().unwrap_or("").dimmed(),
        );
    }
}

fn print_event_stat(stat: &EventStat) {
    let failed = format!("{} ({:.0}%)", stat.failures, stat.failure_pct());
    let failed = if stat.failures > 0 {
        failed.red()
    } else {
        failed.normal()
    };
    println!(
        "  {:<16} {:>6} {:>9} {:>10} {}",
        truncate(&stat.event, 16),
        stat.count,
        failed,
        stat.avg_duration_ms
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| "-".into()),
        truncate(&stat.last_seen, 19),
    );
}

fn print_history_csv(entries: &[ActivityEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["timestamp", "event", "outcome", "detail", "duration_ms"])?;
    for e in entries {
        let outcome = e.outcome.to_string();
        let duration = e.duration_ms.map(|d| d.to_string()).unwrap_or_default();
        writer.write_record([
            e.timestamp.as_str(),
            e.event.as_str(),
            outcome.as_str(),
            e.detail.as_deref().unwrap_or(""),
            duration.as_str(),
        ])?;
    }
    writer.flush().context("failed to write CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// fraudwatch health
// ---------------------------------------------------------------------------

/// Check config files, backend reachability, session and activity log.
pub fn run_health() -> Result<()> {
    println!("{}", "Fraudwatch Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.fraudwatch/config.toml found"
        } else {
            "not found (run `fraudwatch config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".fraudwatch.toml found"
        } else {
            "none (optional)"
        },
    );

    let ctx = command_env();
    let reachable = ctx.client.is_reachable();
    print_health_item(
        "Backend",
        reachable,
        &if reachable {
            format!("reachable at {}", ctx.client.base_url())
        } else {
            format!("not reachable at {}", ctx.client.base_url())
        },
    );

    print_health_item(
        "Session",
        ctx.session.is_authenticated(),
        &if ctx.session.is_authenticated() {
            format!(
                "{} ({})",
                ctx.session.display_name(),
                ctx.session.role.as_deref().unwrap_or("merchant")
            )
        } else {
            "not logged in".to_string()
        },
    );

    let log_exists = ctx.log.path().is_some_and(|p| p.exists());
    print_health_item(
        "Activity log",
        log_exists,
        &if log_exists {
            format!("{} entries", ctx.log.read_all().len())
        } else if ctx.cfg.logging.enabled {
            "no log file yet".to_string()
        } else {
            "disabled".to_string()
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// fraudwatch config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective Fraudwatch Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.fraudwatch/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.fraudwatch/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".fraudwatch.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            ".fraudwatch.toml (not found)".dimmed()
        );
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "FRAUDWATCH_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.fraudwatch/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether a run left results to print. A failed run becomes the command's
/// error so `main` exits non-zero after the usual cleanup.
fn finished(outcome: RunOutcome) -> Result<bool> {
    match outcome {
        RunOutcome::Completed { .. } => Ok(true),
        RunOutcome::Cancelled | RunOutcome::Rejected(_) => Ok(false),
        RunOutcome::Failed(err) => Err(err.context("detection run failed")),
    }
}

/// Read one line from stdin after printing `label`.
fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Format a number with comma separators for readability.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
