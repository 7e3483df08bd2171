//! Response normalizer - wire DTOs to domain models
//!
//! Pure functions. Amounts arrive as minor-unit integers and leave as
//! `Decimal` display units; timestamps arrive as epoch seconds and leave as
//! UTC date-times. Every call builds fresh values.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    AccountAddresses, BlockVersion, PendingUpdate, SyncProgress, TransactionAddresses,
    TransactionType, Wallet, WalletAddress, WalletTransaction, LOVELACES_PER_ADA,
};
use crate::ports::wire::{
    ApiAccount, ApiAddress, ApiCoin, ApiSyncProgress, ApiTransaction, ApiUpdate, ApiWallet,
};

pub const TITLE_SENT: &str = "Ada sent";
pub const TITLE_RECEIVED: &str = "Ada received";

/// How a transaction title is derived
///
/// `Literal` keeps the node client's historical behavior, where any
/// non-empty node title yields "Ada sent" regardless of direction.
/// `ByDirection` shows the node title when present and otherwise the
/// direction default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TitlePolicy {
    #[default]
    Literal,
    ByDirection,
}

impl TitlePolicy {
    pub fn title(&self, node_title: Option<&str>, is_outgoing: bool) -> String {
        let node_title = node_title.unwrap_or_default();
        match self {
            TitlePolicy::Literal => {
                if !node_title.is_empty() || is_outgoing {
                    TITLE_SENT.to_string()
                } else {
                    TITLE_RECEIVED.to_string()
                }
            }
            TitlePolicy::ByDirection => {
                if !node_title.is_empty() {
                    node_title.to_string()
                } else if is_outgoing {
                    TITLE_SENT.to_string()
                } else {
                    TITLE_RECEIVED.to_string()
                }
            }
        }
    }
}

fn lovelaces() -> Decimal {
    Decimal::from(LOVELACES_PER_ADA)
}

/// Minor units to display units
pub fn to_ada(coin: &ApiCoin) -> Decimal {
    coin.coins / lovelaces()
}

/// Display units to minor units
///
/// Returns `None` for negative amounts, sub-lovelace fractions, or values
/// that do not fit a `u64`.
pub fn to_minor_units(ada: Decimal) -> Option<u64> {
    if ada.is_sign_negative() && !ada.is_zero() {
        return None;
    }
    let minor = ada.checked_mul(lovelaces())?;
    if !minor.fract().is_zero() {
        return None;
    }
    minor.to_u64()
}

/// Epoch seconds (possibly fractional) to a UTC date-time
///
/// Values chrono cannot represent fall back to the Unix epoch.
pub fn from_epoch_seconds(seconds: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64).unwrap_or_else(|| {
        warn!(seconds, "Timestamp out of range, using the Unix epoch");
        DateTime::<Utc>::default()
    })
}

pub fn wallet(data: ApiWallet) -> Wallet {
    Wallet {
        id: data.id,
        amount: to_ada(&data.amount),
        name: data.meta.name,
        assurance: data.meta.assurance,
        has_password: data.has_passphrase,
        password_updated_at: from_epoch_seconds(data.passphrase_last_update),
    }
}

pub fn address(data: ApiAddress) -> WalletAddress {
    WalletAddress {
        id: data.id,
        amount: to_ada(&data.amount),
        is_used: data.is_used,
    }
}

/// Addresses of the first account; no accounts means no account id
pub fn account_addresses(accounts: Vec<ApiAccount>) -> AccountAddresses {
    match accounts.into_iter().next() {
        Some(account) => AccountAddresses {
            account_id: Some(account.id),
            addresses: account.addresses.into_iter().map(address).collect(),
        },
        None => AccountAddresses::default(),
    }
}

pub fn transaction(data: ApiTransaction, policy: TitlePolicy) -> WalletTransaction {
    let is_outgoing = data.is_outgoing;
    let magnitude = to_ada(&data.amount);

    WalletTransaction {
        title: policy.title(data.meta.title.as_deref(), is_outgoing),
        transaction_type: if is_outgoing {
            TransactionType::Expend
        } else {
            TransactionType::Income
        },
        amount: if is_outgoing { -magnitude } else { magnitude },
        date: from_epoch_seconds(data.meta.date),
        description: data.meta.description.unwrap_or_default(),
        number_of_confirmations: data.confirmations,
        addresses: TransactionAddresses {
            from: data.input_addresses,
            to: data.output_addresses,
        },
        id: data.id,
    }
}

pub fn sync_progress(data: ApiSyncProgress) -> SyncProgress {
    SyncProgress {
        local_difficulty: data.local.difficulty,
        network_difficulty: data.network.map(|n| n.difficulty),
    }
}

pub fn update(data: ApiUpdate) -> PendingUpdate {
    PendingUpdate {
        application_name: data.software_version.app_name.name,
        version: data.software_version.number,
        block_version: BlockVersion {
            major: data.block_version.major,
            minor: data.block_version.minor,
            alt: data.block_version.alt,
        },
        script_version: data.script_version,
        implicit: data.implicit,
        votes_for: data.votes_for,
        votes_against: data.votes_against,
        positive_stake: data.positive_stake.coins / lovelaces(),
        negative_stake: data.negative_stake.coins / lovelaces(),
    }
}
