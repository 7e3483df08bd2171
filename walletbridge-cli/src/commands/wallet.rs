//! Wallet commands - list, create, restore, import and manage wallets

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use dialoguer::Input;
use serde_json::Value;
use walletbridge_core::services::{
    ChangeWalletPasswordRequest, CreateWalletRequest, RestoreWalletRequest, UpdateWalletRequest,
};
use walletbridge_core::{AssurancePolicy, Error, Wallet};

use super::{
    confirm, open_session, password_or_prompt, prompt_new_password, settle, settle_with_context,
};
use crate::output;

#[derive(Clone, Copy, ValueEnum)]
pub enum Assurance {
    Normal,
    Strict,
}

impl From<Assurance> for AssurancePolicy {
    fn from(value: Assurance) -> Self {
        match value {
            Assurance::Normal => AssurancePolicy::Normal,
            Assurance::Strict => AssurancePolicy::Strict,
        }
    }
}

#[derive(Subcommand)]
pub enum WalletCommands {
    /// Create a wallet from a freshly generated recovery phrase
    Create {
        /// Wallet name
        name: String,
        /// Spending password
        #[arg(short, long)]
        password: Option<String>,
        /// Prompt for a spending password
        #[arg(long, conflicts_with = "password")]
        ask_password: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore a wallet from its 12-word recovery phrase
    Restore {
        /// Wallet name
        name: String,
        /// Recovery phrase (prompted if omitted)
        #[arg(long)]
        phrase: Option<String>,
        /// Spending password
        #[arg(short, long)]
        password: Option<String>,
        /// Prompt for a spending password
        #[arg(long, conflicts_with = "password")]
        ask_password: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import a wallet from a secret key file
    Import {
        /// Path to the key file
        file: PathBuf,
        /// Spending password
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create the first account of a wallet whose setup was interrupted
    Resume {
        /// Wallet ID
        wallet_id: String,
        /// Account name
        #[arg(long, default_value = "Initial account")]
        name: String,
        /// Spending password
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a wallet
    Rename {
        /// Wallet ID
        wallet_id: String,
        /// New name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the assurance level of a wallet
    Assurance {
        /// Wallet ID
        wallet_id: String,
        /// Assurance level
        #[arg(value_enum)]
        level: Assurance,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set or change the spending password
    Password {
        /// Wallet ID
        wallet_id: String,
        /// Current password (omit when the wallet has none)
        #[arg(long)]
        old: Option<String>,
        /// New password (prompted if omitted)
        #[arg(long)]
        new: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a wallet from the node
    Delete {
        /// Wallet ID
        wallet_id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn list(json: bool) -> Result<()> {
    let session = open_session()?;
    let result = session.bridge.wallet_service.get_wallets().await;
    let Some(wallets) = settle(result, json)? else {
        return Ok(());
    };

    if session.demo_mode {
        output::warning("Demo mode: the node is simulated and forgets everything on exit");
        println!();
    }

    if wallets.is_empty() {
        output::warning("No wallets yet. Use 'wb wallet create' to add one.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Balance", "Assurance", "Password"]);
    for wallet in &wallets {
        table.add_row(vec![
            wallet.id.clone(),
            wallet.name.clone(),
            output::format_ada(wallet.amount),
            assurance_label(wallet.assurance).to_string(),
            if wallet.has_password { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub async fn run(command: WalletCommands) -> Result<()> {
    let session = open_session()?;
    let wallets = &session.bridge.wallet_service;

    match command {
        WalletCommands::Create { name, password, ask_password, json } => {
            let password = password_or_prompt(password, ask_password)?;
            let words = session.bridge.node_service.generate_mnemonic().await?;
            let phrase = words.join(" ");

            if !json {
                println!("{}", "Recovery phrase".bold());
                println!("  {}", phrase);
                output::warning("Write these words down. They are the only way to restore the wallet.");
                println!();
            }

            let result = wallets
                .create_wallet(CreateWalletRequest {
                    name,
                    mnemonic: phrase.clone(),
                    password,
                })
                .await;
            hint_on_pending(&result, json);
            // The phrase is the only way back into the wallet, so JSON output carries it too
            let extra = vec![("recoveryPhrase", Value::String(phrase))];
            if let Some(wallet) = settle_with_context(result, json, extra)? {
                print_wallet("Wallet created", &wallet);
            }
        }
        WalletCommands::Restore { name, phrase, password, ask_password, json } => {
            let phrase = match phrase {
                Some(p) => p,
                None => Input::<String>::new()
                    .with_prompt("Recovery phrase")
                    .interact_text()?,
            };
            let wallet_password = password_or_prompt(password, ask_password)?;

            let result = wallets
                .restore_wallet(RestoreWalletRequest {
                    recovery_phrase: phrase,
                    wallet_name: name,
                    wallet_password,
                })
                .await;
            hint_on_pending(&result, json);
            if let Some(wallet) = settle(result, json)? {
                print_wallet("Wallet restored", &wallet);
            }
        }
        WalletCommands::Import { file, password, json } => {
            let result = wallets
                .import_wallet_from_key(&file, password.as_deref())
                .await;
            if let Some(wallet) = settle(result, json)? {
                print_wallet("Wallet imported", &wallet);
            }
        }
        WalletCommands::Resume { wallet_id, name, password, json } => {
            let result = wallets
                .create_account(&wallet_id, &name, password.as_deref())
                .await;
            if let Some(wallet) = settle(result, json)? {
                print_wallet("Account created", &wallet);
            }
        }
        WalletCommands::Rename { wallet_id, name, json } => {
            let result = wallets.rename_wallet(&wallet_id, &name).await;
            if let Some(wallet) = settle(result, json)? {
                print_wallet("Wallet renamed", &wallet);
            }
        }
        WalletCommands::Assurance { wallet_id, level, json } => {
            let current = wallets
                .get_wallets()
                .await?
                .into_iter()
                .find(|w| w.id == wallet_id)
                .with_context(|| format!("Wallet not found: {}", wallet_id))?;

            let result = wallets
                .update_wallet(UpdateWalletRequest {
                    wallet_id,
                    name: current.name,
                    assurance: level.into(),
                })
                .await;
            if let Some(wallet) = settle(result, json)? {
                print_wallet("Assurance updated", &wallet);
            }
        }
        WalletCommands::Password { wallet_id, old, new, json } => {
            let new_password = match new {
                Some(p) => p,
                None => prompt_new_password("New spending password")?,
            };
            let result = match old {
                Some(old_password) => {
                    wallets
                        .change_wallet_password(ChangeWalletPasswordRequest {
                            wallet_id,
                            old_password,
                            new_password,
                        })
                        .await
                }
                None => wallets.set_wallet_password(&wallet_id, &new_password).await,
            };
            if settle(result, json)?.is_some() {
                output::success("Spending password updated");
            }
        }
        WalletCommands::Delete { wallet_id, force, json } => {
            let prompt = format!(
                "Delete wallet {}? It can only be brought back from its recovery phrase.",
                wallet_id
            );
            if !confirm(&prompt, force || json)? {
                println!("Cancelled.");
                return Ok(());
            }

            let result = wallets.delete_wallet(&wallet_id).await;
            if settle(result, json)?.is_some() {
                output::success(&format!("Deleted wallet {}", wallet_id));
            }
        }
    }

    Ok(())
}

fn hint_on_pending<T>(result: &walletbridge_core::domain::result::Result<T>, json: bool) {
    if json {
        return;
    }
    if let Err(Error::AccountPending { wallet_id }) = result {
        output::warning(&format!(
            "The wallet exists but has no account yet. Finish with: wb wallet resume {}",
            wallet_id
        ));
    }
}

fn print_wallet(headline: &str, wallet: &Wallet) {
    output::success(headline);
    println!("  ID:        {}", wallet.id);
    println!("  Name:      {}", wallet.name);
    println!("  Balance:   {}", output::format_ada(wallet.amount));
    println!("  Assurance: {}", assurance_label(wallet.assurance));
}

fn assurance_label(policy: AssurancePolicy) -> &'static str {
    match policy {
        AssurancePolicy::Normal => "normal",
        AssurancePolicy::Strict => "strict",
    }
}
