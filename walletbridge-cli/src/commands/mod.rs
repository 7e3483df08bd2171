//! CLI command implementations

pub mod address;
pub mod node;
pub mod preferences;
pub mod redeem;
pub mod transaction;
pub mod wallet;
pub mod watch;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Password};
use serde::Serialize;
use serde_json::Value;
use walletbridge_core::adapters::host::ShutdownSignal;
use walletbridge_core::config::{self, Config};
use walletbridge_core::domain::result::Result as CoreResult;
use walletbridge_core::ports::HostProcess;
use walletbridge_core::{OperationResult, WalletBridge};

/// A connected bridge plus the restart signal it reports to
pub struct Session {
    pub bridge: WalletBridge,
    pub host: Arc<ShutdownSignal>,
    pub demo_mode: bool,
}

/// Load config from the data directory and connect to the node
pub fn open_session() -> Result<Session> {
    let data_dir = config::data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let config = Config::load(&data_dir)?;
    let host = Arc::new(ShutdownSignal::new());
    let bridge = WalletBridge::from_config(
        &config,
        &data_dir,
        Arc::clone(&host) as Arc<dyn HostProcess>,
    )
    .context("Failed to initialize wallet bridge")?;

    Ok(Session {
        bridge,
        host,
        demo_mode: config.demo_mode,
    })
}

/// Print the JSON envelope in `--json` mode, otherwise hand the value back
///
/// Returns `Ok(None)` once the envelope is printed. Failures are returned as
/// errors in both modes so the exit code reflects them.
pub fn settle<T: Serialize>(result: CoreResult<T>, json: bool) -> Result<Option<T>> {
    settle_with_context(result, json, Vec::new())
}

/// Like `settle`, with extra context entries in the JSON envelope
///
/// The entries are added whether the operation succeeded or not.
pub fn settle_with_context<T: Serialize>(
    result: CoreResult<T>,
    json: bool,
    extra: Vec<(&str, Value)>,
) -> Result<Option<T>> {
    if !json {
        return Ok(Some(result?));
    }

    println!("{}", serde_json::to_string_pretty(&envelope(&result, extra))?);
    result?;
    Ok(None)
}

fn envelope<'a, T>(result: &'a CoreResult<T>, extra: Vec<(&str, Value)>) -> OperationResult<&'a T> {
    let mut envelope = match result {
        Ok(data) => OperationResult::ok(data),
        Err(e) => OperationResult::fail(e),
    };
    if !extra.is_empty() {
        let context = envelope.context.get_or_insert_with(HashMap::new);
        for (key, value) in extra {
            context.insert(key.to_string(), value);
        }
    }
    envelope
}

/// Prompt twice for a new password
pub fn prompt_new_password(prompt: &str) -> Result<String> {
    let password = Password::new()
        .with_prompt(prompt)
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;
    Ok(password)
}

/// Use the given password, or prompt for one when `ask` is set
pub fn password_or_prompt(password: Option<String>, ask: bool) -> Result<Option<String>> {
    match password {
        Some(p) => Ok(Some(p)),
        None if ask => prompt_new_password("Spending password").map(Some),
        None => Ok(None),
    }
}

/// Ask before a destructive action; `--json` and `--force` callers are never prompted
pub fn confirm(prompt: &str, skip: bool) -> Result<bool> {
    if skip {
        return Ok(true);
    }
    Ok(Confirm::new().with_prompt(prompt).interact()?)
}
