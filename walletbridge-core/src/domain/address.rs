//! Address domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A receiving address of a wallet account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAddress {
    pub id: String,
    pub amount: Decimal,
    /// Set by the node once the address received funds; never reset client-side
    pub is_used: bool,
}

/// Addresses of the first account of a wallet
///
/// A wallet without accounts is a valid state and yields no account id and
/// an empty address list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAddresses {
    pub account_id: Option<String>,
    pub addresses: Vec<WalletAddress>,
}
