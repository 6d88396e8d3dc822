use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use assetly::app;
use assetly::clock::SystemClock;
use assetly::config::{default_config_path, ResolvedConfig};
use assetly::models::AccountType;
use assetly::storage::{JsonFileStorage, Storage};

#[derive(Parser)]
#[command(name = "assetly")]
#[command(about = "Personal net-worth tracker")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show current configuration
    Config,
    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        command: AccountsCommand,
    },
    /// Print the value grid with summaries and KPIs
    Grid {
        /// Start date (YYYY-MM-DD or ISO 8601 datetime)
        #[arg(long)]
        from: Option<String>,
        /// End date, inclusive
        #[arg(long)]
        to: Option<String>,
        /// Include archived accounts
        #[arg(long)]
        archived: bool,
    },
    /// Set an account's value for a date
    Set {
        account_id: String,
        /// Entry date (YYYY-MM-DD or ISO 8601 datetime)
        date: String,
        value: f64,
        /// Reported cash flow; omitted means derive it
        #[arg(long)]
        cash_flow: Option<f64>,
        /// Reported gain/loss; omitted means derive it
        #[arg(long)]
        gain_loss: Option<f64>,
    },
    /// Manage grid columns (one column = one date)
    Column {
        #[command(subcommand)]
        command: ColumnCommand,
    },
}

#[derive(Subcommand)]
enum AccountsCommand {
    /// List accounts
    List {
        /// Include archived accounts
        #[arg(long)]
        archived: bool,
    },
    /// Create an account with its initial value
    Add {
        name: String,
        /// cash_asset, investment_asset or liability
        #[arg(long = "type")]
        account_type: String,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        value: f64,
        /// Date of the initial entry; defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Rename an account
    Rename { id: String, name: String },
    /// Archive an account (hidden from default views)
    Archive { id: String },
    /// Restore an archived account
    Unarchive { id: String },
    /// Delete an account and all of its entries
    Remove { id: String },
}

#[derive(Subcommand)]
enum ColumnCommand {
    /// Create entries for every active account on a date
    Add { date: String },
    /// Delete all entries on a date
    Remove { date: String },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = ResolvedConfig::load_or_default(&config_path)?;
    let storage: Arc<dyn Storage> = Arc::new(JsonFileStorage::new(&config.data_dir));
    let clock = SystemClock;

    match cli.command {
        Command::Config => {
            print_json(&serde_json::json!({
                "config_file": config_path.display().to_string(),
                "data_dir": config.data_dir.display().to_string(),
                "default_currency": config.default_currency,
            }))?;
        }
        Command::Accounts { command } => match command {
            AccountsCommand::List { archived } => {
                let accounts = app::list_accounts(&storage, &config, archived).await?;
                print_json(&accounts)?;
            }
            AccountsCommand::Add {
                name,
                account_type,
                currency,
                value,
                date,
            } => {
                let account = app::add_account(
                    &storage,
                    &config,
                    &name,
                    account_type.parse::<AccountType>()?,
                    currency,
                    value,
                    date.as_deref(),
                    &clock,
                )
                .await?;
                print_json(&account)?;
            }
            AccountsCommand::Rename { id, name } => {
                let account = app::rename_account(&storage, &config, &id, &name).await?;
                print_json(&account)?;
            }
            AccountsCommand::Archive { id } => {
                let account = app::set_account_archived(&storage, &config, &id, true).await?;
                print_json(&account)?;
            }
            AccountsCommand::Unarchive { id } => {
                let account = app::set_account_archived(&storage, &config, &id, false).await?;
                print_json(&account)?;
            }
            AccountsCommand::Remove { id } => {
                app::remove_account(&storage, &config, &id).await?;
                print_json(&serde_json::json!({ "removed": id }))?;
            }
        },
        Command::Grid { from, to, archived } => {
            let grid = app::grid_data(&storage, from, to, archived).await?;
            print_json(&grid)?;
        }
        Command::Set {
            account_id,
            date,
            value,
            cash_flow,
            gain_loss,
        } => {
            let entry =
                app::set_value(&storage, &account_id, &date, value, cash_flow, gain_loss).await?;
            print_json(&entry)?;
        }
        Command::Column { command } => match command {
            ColumnCommand::Add { date } => {
                let outcome = app::add_column(&storage, &date, &clock).await?;
                print_json(&outcome)?;
            }
            ColumnCommand::Remove { date } => {
                let removed = app::remove_column(&storage, &date).await?;
                print_json(&removed)?;
            }
        },
    }

    Ok(())
}
