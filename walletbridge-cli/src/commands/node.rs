//! Node commands - mnemonics, validation, sync progress, updates and reset

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{confirm, open_session, settle};
use crate::output;

#[derive(Subcommand)]
pub enum ValidateCommands {
    /// Check a receiver address
    Address {
        address: String,
        #[arg(long)]
        json: bool,
    },
    /// Check a 12-word recovery phrase
    Mnemonic {
        phrase: String,
        #[arg(long)]
        json: bool,
    },
    /// Check a regular redemption code
    RedemptionKey {
        key: String,
        #[arg(long)]
        json: bool,
    },
    /// Check a shielded paper-vend redemption key
    PaperKey {
        key: String,
        #[arg(long)]
        json: bool,
    },
    /// Check a nine-word paper-vend passphrase
    PaperMnemonic {
        phrase: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum UpdateCommands {
    /// Show the pending node update, if any
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply the pending update and restart the node
    Apply {
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn mnemonic(json: bool) -> Result<()> {
    let session = open_session()?;
    let result = session.bridge.node_service.generate_mnemonic().await;
    if let Some(words) = settle(result, json)? {
        println!("{}", words.join(" "));
    }
    Ok(())
}

pub async fn validate(command: ValidateCommands) -> Result<()> {
    let session = open_session()?;
    let bridge = &session.bridge;

    let (subject, valid, json) = match command {
        ValidateCommands::Address { address, json } => {
            (address.clone(), bridge.address_service.is_valid_address(&address).await?, json)
        }
        ValidateCommands::Mnemonic { phrase, json } => (
            "recovery phrase".to_string(),
            bridge.node_service.is_valid_mnemonic(&phrase).await?,
            json,
        ),
        ValidateCommands::RedemptionKey { key, json } => (
            key.clone(),
            bridge.redemption_service.is_valid_redemption_key(&key).await?,
            json,
        ),
        ValidateCommands::PaperKey { key, json } => (
            key.clone(),
            bridge
                .redemption_service
                .is_valid_paper_vend_redemption_key(&key)
                .await?,
            json,
        ),
        ValidateCommands::PaperMnemonic { phrase, json } => (
            "passphrase".to_string(),
            bridge
                .redemption_service
                .is_valid_redemption_mnemonic(&phrase)
                .await?,
            json,
        ),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&json!({ "valid": valid }))?);
    } else if valid {
        output::success(&format!("Valid: {}", subject));
    } else {
        output::warning(&format!("Invalid: {}", subject));
    }
    Ok(())
}

pub async fn sync(json: bool) -> Result<()> {
    let session = open_session()?;
    let result = session.bridge.node_service.get_sync_progress().await;
    let Some(progress) = settle(result, json)? else {
        return Ok(());
    };

    println!("{}", "Blockchain sync".bold());
    println!("  Local difficulty:   {}", progress.local_difficulty);
    match (progress.network_difficulty, progress.percentage()) {
        (Some(network), Some(percentage)) => {
            println!("  Network difficulty: {}", network);
            println!("  Progress:           {:.2}%", percentage);
        }
        _ => println!("  Network difficulty: {}", "unknown".dimmed()),
    }
    Ok(())
}

pub async fn update(command: UpdateCommands) -> Result<()> {
    let session = open_session()?;
    let node = &session.bridge.node_service;

    match command {
        UpdateCommands::Check { json } => {
            let update = node.next_update().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&update)?);
                return Ok(());
            }
            match update {
                Some(update) => {
                    println!("{}", "Update available".bold());
                    println!("  Application: {}", update.application_name);
                    println!("  Version:     {}", update.version);
                    println!(
                        "  Block:       {}.{}.{}",
                        update.block_version.major,
                        update.block_version.minor,
                        update.block_version.alt
                    );
                    println!("  Votes:       {} for, {} against", update.votes_for, update.votes_against);
                }
                None => output::info("No update available"),
            }
        }
        UpdateCommands::Apply { yes, json } => {
            if !confirm("Apply the pending update? The node will restart.", yes || json)? {
                println!("Cancelled.");
                return Ok(());
            }

            let result = node.apply_update().await;
            if settle(result, json)?.is_some() {
                output::success("Update applied");
                if session.host.is_requested() {
                    output::info("Restart requested; relaunch the node to finish.");
                }
            }
        }
    }

    Ok(())
}

pub async fn reset(force: bool, json: bool) -> Result<()> {
    if !confirm("Wipe all node state and local preferences?", force || json)? {
        println!("Cancelled.");
        return Ok(());
    }

    let session = open_session()?;
    let result = session.bridge.node_service.test_reset().await;
    if settle(result, json)?.is_some() {
        output::success("Node state and preferences cleared");
    }
    Ok(())
}
