//! Preference commands - locale and terms of use

use anyhow::Result;
use clap::Subcommand;

use super::{open_session, settle};
use crate::output;

#[derive(Subcommand)]
pub enum LocaleCommands {
    /// Show the stored locale
    Get {
        #[arg(long)]
        json: bool,
    },
    /// Store a locale, e.g. en-US
    Set {
        locale: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum TermsCommands {
    /// Show whether the terms of use were accepted
    Get {
        #[arg(long)]
        json: bool,
    },
    /// Record acceptance of the terms of use
    Accept {
        #[arg(long)]
        json: bool,
    },
}

pub async fn locale(command: LocaleCommands) -> Result<()> {
    let session = open_session()?;
    let preferences = &session.bridge.preference_service;

    match command {
        LocaleCommands::Get { json } => {
            let result = preferences.get_user_locale().await;
            if let Some(locale) = settle(result, json)? {
                if locale.is_empty() {
                    output::info("No locale set");
                } else {
                    println!("{}", locale);
                }
            }
        }
        LocaleCommands::Set { locale, json } => {
            let result = preferences.set_user_locale(&locale).await;
            if let Some(locale) = settle(result, json)? {
                output::success(&format!("Locale set to {}", locale));
            }
        }
    }
    Ok(())
}

pub async fn terms(command: TermsCommands) -> Result<()> {
    let session = open_session()?;
    let preferences = &session.bridge.preference_service;

    match command {
        TermsCommands::Get { json } => {
            let result = preferences.get_terms_of_use_acceptance().await;
            if let Some(accepted) = settle(result, json)? {
                if accepted {
                    output::success("Terms of use accepted");
                } else {
                    output::warning("Terms of use not accepted yet");
                }
            }
        }
        TermsCommands::Accept { json } => {
            let result = preferences.set_terms_of_use_acceptance().await;
            if settle(result, json)?.is_some() {
                output::success("Terms of use accepted");
            }
        }
    }
    Ok(())
}
