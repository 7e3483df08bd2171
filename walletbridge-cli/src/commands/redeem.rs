//! Redeem commands - ADA redemption certificates

use anyhow::{bail, Result};
use clap::Subcommand;
use dialoguer::Input;
use walletbridge_core::services::{
    RedeemAdaRequest, RedeemPaperVendedAdaRequest, REDEMPTION_MNEMONIC_WORDS,
};

use super::{open_session, settle};
use crate::output;

#[derive(Subcommand)]
pub enum RedeemCommands {
    /// Redeem a regular certificate by its redemption code
    Ada {
        /// Redemption code
        code: String,
        /// Wallet to credit
        #[arg(long)]
        wallet: String,
        /// Spending password of the wallet
        #[arg(short, long, env = "WALLETBRIDGE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Redeem a paper-vended certificate with its shielded key and passphrase
    Paper {
        /// Shielded redemption key
        key: String,
        /// Nine-word passphrase (prompted if omitted)
        #[arg(long)]
        mnemonic: Option<String>,
        /// Wallet to credit
        #[arg(long)]
        wallet: String,
        /// Spending password of the wallet
        #[arg(short, long, env = "WALLETBRIDGE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: RedeemCommands) -> Result<()> {
    let session = open_session()?;
    let service = &session.bridge.redemption_service;

    match command {
        RedeemCommands::Ada { code, wallet, password, json } => {
            let result = service
                .redeem_ada(RedeemAdaRequest {
                    redemption_code: code,
                    wallet_id: wallet,
                    wallet_password: password,
                })
                .await;
            if let Some(tx) = settle(result, json)? {
                output::success(&format!("Redeemed {}", output::format_ada(tx.amount)));
                println!("  Transaction: {}", tx.id);
            }
        }
        RedeemCommands::Paper { key, mnemonic, wallet, password, json } => {
            let mnemonic = match mnemonic {
                Some(m) => m,
                None => Input::<String>::new()
                    .with_prompt("Passphrase")
                    .interact_text()?,
            };
            let mnemonics: Vec<String> = mnemonic.split_whitespace().map(str::to_string).collect();
            if mnemonics.len() != REDEMPTION_MNEMONIC_WORDS {
                bail!(
                    "Passphrase must have {} words, got {}",
                    REDEMPTION_MNEMONIC_WORDS,
                    mnemonics.len()
                );
            }

            let result = service
                .redeem_paper_vended_ada(RedeemPaperVendedAdaRequest {
                    shielded_redemption_key: key,
                    mnemonics,
                    wallet_id: wallet,
                    wallet_password: password,
                })
                .await;
            if let Some(tx) = settle(result, json)? {
                output::success(&format!("Redeemed {}", output::format_ada(tx.amount)));
                println!("  Transaction: {}", tx.id);
            }
        }
    }

    Ok(())
}
