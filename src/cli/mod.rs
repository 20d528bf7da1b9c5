use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::application::{Command, LedgerHandle, LedgerService};
use crate::config::LedgerConfig;
use crate::domain::{NewDebt, Paise, RecordId, UserId, format_amount, parse_amount};
use crate::storage::LedgerSnapshot;

/// Rupee Ledger - household allowance ledger
#[derive(Parser)]
#[command(name = "rupee-ledger")]
#[command(about = "Track allowance balances, pending debts and settled history for a household")]
#[command(version)]
pub struct Cli {
    /// JSON fixture to seed the ledger from (built-in household when omitted)
    #[arg(short, long, env = "RUPEE_LEDGER_FIXTURE", global = true)]
    pub fixture: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show every user with balance and pending debt
    Users,

    /// List pending debts
    Debts {
        /// Only this user's debts
        #[arg(short, long)]
        user: Option<UserId>,
    },

    /// List settled history
    Audits {
        /// Only this user's history
        #[arg(short, long)]
        user: Option<UserId>,
    },

    /// Show ledger settings
    Settings,

    /// Print the whole ledger as JSON
    Snapshot,

    /// Deduct an amount from a user's balance
    Deduct {
        /// User id
        user: UserId,

        /// Amount to deduct (e.g., "10" or "2.5")
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Charge an amount to the whole household, shared evenly
    Split {
        /// Amount to split (negative to share a credit)
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Record a pending debt for a user
    AddDebt {
        /// User id
        user: UserId,

        /// What the debt is for
        name: String,

        /// Amount owed (negative for a refund)
        #[arg(allow_negative_numbers = true)]
        amount: String,

        /// Projected balance once settled
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        forecast: String,

        /// Date of the debt (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Remove a debt without settling it
    DeleteDebt {
        /// Debt id
        id: RecordId,
    },

    /// Settle a debt: deduct it from the user and move it into history
    Clear {
        /// User id owning the debt
        user: UserId,

        /// Debt id
        debt: RecordId,

        /// Amount to deduct (defaults to the debt's amount)
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,
    },

    /// Credit allowance to users
    Pay {
        /// Amount to credit (defaults to the configured default pay)
        #[arg(allow_negative_numbers = true)]
        amount: Option<String>,

        /// Users to pay (repeatable, defaults to everyone)
        #[arg(short, long = "user")]
        users: Vec<UserId>,
    },

    /// Change the default pay amount
    SetPay {
        /// New default pay
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Apply JSON-lines commands from a file (stdin if omitted)
    Run {
        /// Command script
        file: Option<PathBuf>,
    },
}

impl Cli {
    pub fn config(&self) -> LedgerConfig {
        LedgerConfig {
            fixture: self.fixture.clone(),
            verbose: self.verbose,
        }
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config();
        config.init_logging();

        let repo = config.load_repository().await?;
        let ledger = LedgerHandle::spawn(LedgerService::new(repo));

        match self.command {
            Commands::Users => {
                print_users(&ledger.snapshot().await?);
            }

            Commands::Debts { user } => {
                print_debts(&ledger.snapshot().await?, user)?;
            }

            Commands::Audits { user } => {
                print_audits(&ledger.snapshot().await?, user)?;
            }

            Commands::Settings => {
                let snapshot = ledger.snapshot().await?;
                println!(
                    "Default pay: {}",
                    format_amount(snapshot.settings.default_pay)
                );
            }

            Commands::Snapshot => {
                let snapshot = ledger.snapshot().await?;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }

            Commands::Deduct { user, amount } => {
                let Some(amount) = parse_input_amount(&amount)? else {
                    return Ok(());
                };
                submit(&ledger, Command::Deduct {
                    user_id: user,
                    amount,
                })
                .await?;
            }

            Commands::Split { amount } => {
                let Some(amount) = parse_input_amount(&amount)? else {
                    return Ok(());
                };
                submit(&ledger, Command::Split { amount }).await?;
            }

            Commands::AddDebt {
                user,
                name,
                amount,
                forecast,
                date,
            } => {
                let amount = parse_amount(&amount)
                    .with_context(|| format!("Invalid amount '{}'. Use '10' or '2.5'", amount))?;
                let forecast = parse_amount(&forecast).with_context(|| {
                    format!("Invalid forecast '{}'. Use '10' or '2.5'", forecast)
                })?;
                let date = match date {
                    Some(date_str) => parse_date(&date_str).with_context(|| {
                        format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                    })?,
                    None => Local::now().date_naive(),
                };

                let debt = NewDebt::new(name, amount, date).with_forecast(forecast);
                submit(&ledger, Command::AddDebt {
                    user_id: user,
                    debt,
                })
                .await?;
            }

            Commands::DeleteDebt { id } => {
                submit(&ledger, Command::DeleteDebt { id }).await?;
            }

            Commands::Clear { user, debt, amount } => {
                let amount = amount
                    .map(|a| parse_amount(&a))
                    .transpose()
                    .context("Invalid amount format. Use '10' or '2.5'")?;
                submit(&ledger, Command::ClearDebt {
                    user_id: user,
                    debt_id: debt,
                    amount,
                })
                .await?;
            }

            Commands::Pay { amount, users } => {
                let snapshot = ledger.snapshot().await?;
                let amount = match amount {
                    Some(a) => parse_amount(&a)
                        .with_context(|| format!("Invalid amount '{}'. Use '10' or '2.5'", a))?,
                    None => snapshot.settings.default_pay,
                };
                let user_id_list = if users.is_empty() {
                    snapshot.users.iter().map(|u| u.user_id).collect()
                } else {
                    users
                };
                submit(&ledger, Command::Pay {
                    user_id_list,
                    amount,
                })
                .await?;
            }

            Commands::SetPay { amount } => {
                let Some(amount) = parse_input_amount(&amount)? else {
                    return Ok(());
                };
                submit(&ledger, Command::SetDefaultPay { amount }).await?;
            }

            Commands::Run { file } => match file {
                Some(path) => {
                    let file = tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("Failed to open script: {}", path.display()))?;
                    run_script(&ledger, BufReader::new(file)).await?;
                }
                None => {
                    run_script(&ledger, BufReader::new(tokio::io::stdin())).await?;
                }
            },
        }

        Ok(())
    }
}

/// Outcome counts of a replayed script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub applied: usize,
    pub failed: usize,
}

/// Apply one JSON command per line, printing a confirmation or an error for
/// each. Blank lines and lines starting with `#` are skipped. A bad line does
/// not stop the script.
pub async fn run_script<R>(ledger: &LedgerHandle, reader: R) -> Result<ScriptSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = ScriptSummary::default();
    let mut lines = reader.lines();
    let mut line_num = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read script")? {
        line_num += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let command = match Command::from_json(line) {
            Ok(command) => command,
            Err(e) => {
                println!("line {}: invalid command: {}", line_num, e);
                summary.failed += 1;
                continue;
            }
        };

        match ledger.execute(command).await {
            Ok(confirmation) => {
                println!("{}", confirmation);
                summary.applied += 1;
            }
            Err(e) => {
                println!("line {}: {}", line_num, e);
                summary.failed += 1;
            }
        }
    }

    debug!(applied = summary.applied, failed = summary.failed, "script finished");
    Ok(summary)
}

async fn submit(ledger: &LedgerHandle, command: Command) -> Result<()> {
    let confirmation = ledger.execute(command).await?;
    println!("{}", confirmation);
    println!();
    print_users(&ledger.snapshot().await?);
    Ok(())
}

/// Parse an amount typed into a rupee box. Zero is dropped rather than applied,
/// matching how the allowance screen ignores an empty or zero entry.
fn parse_input_amount(input: &str) -> Result<Option<Paise>> {
    let amount = parse_amount(input)
        .with_context(|| format!("Invalid amount '{}'. Use '10' or '2.5'", input))?;
    if amount == 0 {
        debug!("ignoring zero amount");
        return Ok(None);
    }
    Ok(Some(amount))
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?)
}

fn print_users(snapshot: &LedgerSnapshot) {
    if snapshot.users.is_empty() {
        println!("No users found.");
        return;
    }

    println!("{:<6} {:<16} {:>12} {:>12}", "ID", "NAME", "RUPEES", "DEBT");
    println!("{}", "-".repeat(49));
    for user in &snapshot.users {
        println!(
            "{:<6} {:<16} {:>12} {:>12}",
            user.user_id,
            user.user_name,
            format_amount(user.rupee_amount),
            format_amount(user.total_debt())
        );
    }
}

fn print_debts(snapshot: &LedgerSnapshot, user: Option<UserId>) -> Result<()> {
    ensure_user(snapshot, user)?;

    println!(
        "{:<6} {:<12} {:<20} {:>10} {:>10} {:<10}",
        "ID", "USER", "NAME", "AMOUNT", "FORECAST", "DATE"
    );
    println!("{}", "-".repeat(73));
    for u in snapshot
        .users
        .iter()
        .filter(|u| user.is_none_or(|id| u.user_id == id))
    {
        for debt in &u.debt_list {
            println!(
                "{:<6} {:<12} {:<20} {:>10} {:>10} {:<10}",
                debt.id,
                u.user_name,
                debt.name,
                format_amount(debt.amount),
                format_amount(debt.forecast_amount),
                debt.date
            );
        }
    }
    Ok(())
}

fn print_audits(snapshot: &LedgerSnapshot, user: Option<UserId>) -> Result<()> {
    ensure_user(snapshot, user)?;

    println!(
        "{:<6} {:<12} {:<20} {:>10} {:>10} {:<10}",
        "ID", "USER", "NAME", "AMOUNT", "FORECAST", "DATE"
    );
    println!("{}", "-".repeat(73));
    for u in snapshot
        .users
        .iter()
        .filter(|u| user.is_none_or(|id| u.user_id == id))
    {
        for audit in &u.audit_list {
            println!(
                "{:<6} {:<12} {:<20} {:>10} {:>10} {:<10}",
                audit.id,
                u.user_name,
                audit.name,
                format_amount(audit.amount),
                format_amount(audit.forecast_amount),
                audit.date
            );
        }
    }
    Ok(())
}

fn ensure_user(snapshot: &LedgerSnapshot, user: Option<UserId>) -> Result<()> {
    if let Some(id) = user {
        if !snapshot.users.iter().any(|u| u.user_id == id) {
            anyhow::bail!("Unknown user: {}", id);
        }
    }
    Ok(())
}
