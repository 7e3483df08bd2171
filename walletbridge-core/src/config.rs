//! Configuration management
//!
//! Settings live in `<data_dir>/settings.json`:
//! ```json
//! {
//!   "node": { "rpcUrl": "http://127.0.0.1:8090/api", "notifyUrl": "ws://127.0.0.1:8090/notify" },
//!   "demoMode": false,
//!   "transactionTitles": "literal"
//! }
//! ```
//! Missing fields fall back to defaults; unknown fields survive a save.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::TitlePolicy;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8090/api";
pub const DEFAULT_NOTIFY_URL: &str = "ws://127.0.0.1:8090/notify";

const SETTINGS_FILE: &str = "settings.json";
const PREFERENCES_DIR: &str = "preferences";

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_notify_url() -> String {
    DEFAULT_NOTIFY_URL.to_string()
}

/// Where the wallet node listens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSettings {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_notify_url")]
    pub notify_url: String,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            notify_url: default_notify_url(),
        }
    }
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    node: NodeSettings,
    #[serde(default)]
    demo_mode: bool,
    #[serde(default)]
    transaction_titles: TitlePolicy,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Resolved configuration (settings file plus environment overrides)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub node: NodeSettings,
    pub demo_mode: bool,
    pub transaction_titles: TitlePolicy,
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "TRUE" | "YES" => Some(true),
        "false" | "0" | "no" | "FALSE" | "NO" => Some(false),
        _ => None,
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }

    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(path = %settings_path.display(), "Ignoring malformed settings: {}", e);
        SettingsFile::default()
    }))
}

impl Config {
    /// Load config from the data directory
    ///
    /// Environment overrides:
    /// - `WALLETBRIDGE_NODE_URL`
    /// - `WALLETBRIDGE_NOTIFY_URL`
    /// - `WALLETBRIDGE_DEMO_MODE` (true/1/yes, false/0/no)
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_with_env(data_dir, |name| std::env::var(name).ok())
    }

    /// Load config, reading overrides through `env`
    pub fn load_with_env<F>(data_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = read_settings(data_dir)?;
        let mut node = raw.node;

        if let Some(url) = env("WALLETBRIDGE_NODE_URL").filter(|u| !u.is_empty()) {
            node.rpc_url = url;
        }
        if let Some(url) = env("WALLETBRIDGE_NOTIFY_URL").filter(|u| !u.is_empty()) {
            node.notify_url = url;
        }
        let demo_mode = env("WALLETBRIDGE_DEMO_MODE")
            .as_deref()
            .and_then(parse_flag)
            .unwrap_or(raw.demo_mode);

        Ok(Self {
            node,
            demo_mode,
            transaction_titles: raw.transaction_titles,
        })
    }

    /// Save config to the data directory
    /// Preserves settings this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let mut settings = read_settings(data_dir)?;

        settings.node = self.node.clone();
        settings.demo_mode = self.demo_mode;
        settings.transaction_titles = self.transaction_titles;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    pub fn preferences_dir(data_dir: &Path) -> PathBuf {
        data_dir.join(PREFERENCES_DIR)
    }
}

/// Data directory: `WALLETBRIDGE_DIR`, else `~/.walletbridge`
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("WALLETBRIDGE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".walletbridge"))
        .ok_or_else(|| anyhow!("Could not find home directory"))
}
