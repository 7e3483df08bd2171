//! Walletbridge CLI - a wallet node from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use walletbridge_core::logging;

mod commands;
mod output;

use commands::{address, node, preferences, redeem, transaction, wallet, watch};

/// Walletbridge - talk to a wallet node from the terminal
#[derive(Parser)]
#[command(name = "wb", version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List wallets and their balances
    Wallets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create, restore and manage wallets
    Wallet {
        #[command(subcommand)]
        command: wallet::WalletCommands,
    },

    /// Show the addresses of a wallet's first account
    Addresses {
        /// Wallet ID
        wallet_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a new receiving address
    NewAddress {
        /// Account ID
        account_id: String,
        /// Spending password of the wallet
        #[arg(short, long, env = "WALLETBRIDGE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a page of a wallet's transaction history
    History {
        /// Wallet ID
        wallet_id: String,
        /// Number of transactions to skip
        #[arg(long, default_value_t = 0)]
        skip: u64,
        /// Page size
        #[arg(long, default_value_t = 20)]
        limit: u64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send ADA from an account
    Send {
        /// Sender account ID
        #[arg(long)]
        from: String,
        /// Receiver address
        #[arg(long)]
        to: String,
        /// Amount in ADA (up to six decimals)
        #[arg(long)]
        amount: String,
        /// Spending password of the wallet
        #[arg(short, long, env = "WALLETBRIDGE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Redeem ADA certificates
    Redeem {
        #[command(subcommand)]
        command: redeem::RedeemCommands,
    },

    /// Generate a fresh recovery phrase
    Mnemonic {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check addresses, phrases and redemption keys
    Validate {
        #[command(subcommand)]
        command: node::ValidateCommands,
    },

    /// Show blockchain sync progress
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check for or apply a node software update
    Update {
        #[command(subcommand)]
        command: node::UpdateCommands,
    },

    /// Wipe node state and local preferences (test nodes only)
    Reset {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get or set the user locale
    Locale {
        #[command(subcommand)]
        command: preferences::LocaleCommands,
    },

    /// Get or record terms-of-use acceptance
    Terms {
        #[command(subcommand)]
        command: preferences::TermsCommands,
    },

    /// Stream node push notifications until the connection closes
    Watch {
        /// Output raw JSON lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging_with(if cli.verbose { "debug" } else { "info" });

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Wallets { json } => wallet::list(json).await,
        Commands::Wallet { command } => wallet::run(command).await,
        Commands::Addresses { wallet_id, json } => address::list(&wallet_id, json).await,
        Commands::NewAddress { account_id, password, json } => {
            address::create(&account_id, password, json).await
        }
        Commands::History { wallet_id, skip, limit, json } => {
            transaction::history(&wallet_id, skip, limit, json).await
        }
        Commands::Send { from, to, amount, password, yes, json } => {
            transaction::send(from, to, &amount, password, yes, json).await
        }
        Commands::Redeem { command } => redeem::run(command).await,
        Commands::Mnemonic { json } => node::mnemonic(json).await,
        Commands::Validate { command } => node::validate(command).await,
        Commands::Sync { json } => node::sync(json).await,
        Commands::Update { command } => node::update(command).await,
        Commands::Reset { force, json } => node::reset(force, json).await,
        Commands::Locale { command } => preferences::locale(command).await,
        Commands::Terms { command } => preferences::terms(command).await,
        Commands::Watch { json } => watch::run(json).await,
    }
}
