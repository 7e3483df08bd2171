//! Wallet domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Confirmation-depth policy controlling when a transaction counts as settled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssurancePolicy {
    #[default]
    #[serde(rename = "CWANormal")]
    Normal,
    #[serde(rename = "CWAStrict")]
    Strict,
}

impl AssurancePolicy {
    /// Wire tag understood by the node
    pub fn as_str(&self) -> &'static str {
        match self {
            AssurancePolicy::Normal => "CWANormal",
            AssurancePolicy::Strict => "CWAStrict",
        }
    }
}

/// A wallet as reported by the node
///
/// `amount` is always derived from the node's minor-unit balance; a newer
/// balance means a new `Wallet` built from a fresh response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub amount: Decimal,
    pub name: String,
    pub assurance: AssurancePolicy,
    pub has_password: bool,
    pub password_updated_at: DateTime<Utc>,
}
