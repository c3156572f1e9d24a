//! BorkChain CLI
//!
//! Drives a wallet session against the BorkChain API:
//! 1. Restores or opens a session for the configured wallet
//! 2. Runs the requested command through the session store
//! 3. Logs the store's notices

use bork_client::config::Config;
use bork_client::errors::{ClientError, Result};
use bork_client::storage::LocalStore;
use bork_client::store::{NoticeLevel, TaskResult};
use bork_client::{Backend, HttpBackend, SessionStore, StaticWallet};
use bork_core::format::{format_large_number, truncate_address};
use bork_core::validation::ContributionInput;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bork")]
#[command(about = "BorkChain - earn $BORK for tasks and referrals", long_about = None)]
struct Cli {
    /// Wallet address to use (overrides BORK_WALLET_ADDRESS)
    #[arg(long, global = true)]
    address: Option<String>,

    /// Referral code or address from an invite link
    #[arg(long = "ref", global = true)]
    referral: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect the wallet and open a session
    Connect,
    /// Close the session and forget the wallet
    Disconnect,
    /// Show the connected account
    Status,
    /// List tasks and their completion state
    Tasks,
    /// Complete a task
    Complete { task_id: String },
    /// Print your referral link
    ReferralLink,
    /// Show your fundraiser badge
    Badge,
    /// Submit a fundraiser contribution
    Contribute {
        amount: f64,
        #[arg(long, default_value = "USDT")]
        currency: String,
        #[arg(long)]
        tx_hash: String,
    },
    /// Top earners
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

type Store = SessionStore<HttpBackend, StaticWallet>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.validate()?;

    let wallet_address = cli.address.clone().or_else(|| config.wallet_address.clone());
    let wallet = StaticWallet::from_raw(wallet_address.as_deref())?;
    let backend = HttpBackend::new(&config.api_url, config.timeout_secs)?;
    let storage = LocalStore::open(&config.state_file)?;

    let mut store = SessionStore::new(backend, wallet, storage).with_referral(cli.referral.clone());

    let result = run(&mut store, &config, cli.command).await;
    log_notices(&mut store);
    result
}

async fn run(store: &mut Store, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Connect => {
            store.connect().await?;
            print_status(store);
        }
        Command::Disconnect => {
            store.disconnect().await?;
        }
        Command::Status => {
            ensure_session(store).await?;
            print_status(store);
        }
        Command::Tasks => {
            if !store.restore().await? {
                store.load_tasks().await?;
            }
            for task in &store.state().tasks {
                let mark = if store.state().is_completed(&task.id) {
                    "x"
                } else {
                    " "
                };
                println!(
                    "[{}] {:>3}  {:<32} +{:<5} {} / {}",
                    mark,
                    task.id,
                    task.title,
                    task.reward,
                    task.difficulty.as_str(),
                    task.task_type.as_str()
                );
            }
        }
        Command::Complete { task_id } => {
            ensure_session(store).await?;
            let outcome = store.complete_task(&task_id).await?;
            match &outcome.result {
                TaskResult::Credited { reward, balance } => {
                    println!("+{reward} $BORK, balance {balance}")
                }
                TaskResult::AlreadyCompleted => println!("Task {task_id} already completed"),
                TaskResult::RolledBack(reason) => println!("Task {task_id} failed: {reason}"),
            }
            if let Some(url) = &outcome.destination_url {
                println!("Open: {url}");
            }
        }
        Command::ReferralLink => {
            ensure_session(store).await?;
            if let Some(link) = store.referral_link(&config.referral_base_url) {
                println!("{link}");
            }
        }
        Command::Badge => {
            ensure_session(store).await?;
            let badge = store.badge().await?;
            println!(
                "{} ({}) - contributed ${}",
                badge.name,
                badge.range,
                format_large_number(badge.total)
            );
            for benefit in &badge.benefits {
                println!("  - {benefit}");
            }
        }
        Command::Contribute {
            amount,
            currency,
            tx_hash,
        } => {
            ensure_session(store).await?;
            let contribution = store
                .contribute(ContributionInput {
                    amount,
                    currency,
                    tx_hash,
                })
                .await?;
            println!(
                "Contribution #{} recorded: {} {} (pending review)",
                contribution.id, contribution.amount, contribution.currency
            );
        }
        Command::Leaderboard { limit } => {
            let entries = store.backend().leaderboard(limit).await?;
            for entry in entries {
                println!(
                    "{:>3}. {}  {}",
                    entry.rank,
                    truncate_address(entry.address.as_str()),
                    format_large_number(entry.total_earned as f64)
                );
            }
        }
    }
    Ok(())
}

/// Restore the saved session, or connect the configured wallet.
async fn ensure_session(store: &mut Store) -> Result<()> {
    if store.state().is_connected() || store.restore().await? {
        return Ok(());
    }
    store.connect().await?;
    if store.state().is_connected() {
        Ok(())
    } else {
        Err(ClientError::NotConnected)
    }
}

fn print_status(store: &Store) {
    let state = store.state();
    match &state.user {
        Some(user) => {
            println!("Account:   {}", user.address);
            println!("Balance:   {} $BORK", format_large_number(state.balance as f64));
            println!("Earned:    {} $BORK", format_large_number(user.total_earned as f64));
            println!("Streak:    {} day(s)", user.login_streak);
            println!("Referral:  {}", user.referral_code);
            println!("Completed: {} task(s)", state.completed.len());
            if user.is_admin {
                println!("Role:      admin");
            }
        }
        None => println!("Not connected"),
    }
}

fn log_notices(store: &mut Store) {
    for notice in store.drain_notices() {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => info!("{}", notice.message),
            NoticeLevel::Warning => warn!("{}", notice.message),
            NoticeLevel::Error => error!("{}", notice.message),
        }
    }
}
