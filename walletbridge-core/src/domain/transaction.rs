//! Transaction domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a transaction relative to the wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "adaExpend")]
    Expend,
    #[serde(rename = "adaIncome")]
    Income,
}

/// Source and destination addresses, copied verbatim from the node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionAddresses {
    pub from: Vec<String>,
    pub to: Vec<String>,
}

/// A wallet transaction
///
/// `amount` is signed: negative for outgoing, positive for incoming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub description: String,
    pub number_of_confirmations: u64,
    pub addresses: TransactionAddresses,
}

impl WalletTransaction {
    pub fn is_outgoing(&self) -> bool {
        self.transaction_type == TransactionType::Expend
    }
}

/// One page of wallet history plus the node's total count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<WalletTransaction>,
    pub total: u64,
}
