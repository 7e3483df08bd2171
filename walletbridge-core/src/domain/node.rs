//! Node status models: sync progress and pending software updates

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Chain difficulty reached locally versus on the network
///
/// The network difficulty may not be known yet; it is then pushed later
/// through the notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgress {
    pub local_difficulty: u64,
    pub network_difficulty: Option<u64>,
}

impl SyncProgress {
    /// Percentage of the network difficulty reached, if known
    pub fn percentage(&self) -> Option<f64> {
        match self.network_difficulty {
            Some(0) => Some(100.0),
            Some(network) => Some((self.local_difficulty as f64 / network as f64 * 100.0).min(100.0)),
            None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockVersion {
    pub major: u32,
    pub minor: u32,
    pub alt: u32,
}

/// A software update proposal the node is ready to apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUpdate {
    pub application_name: String,
    pub version: u64,
    pub block_version: BlockVersion,
    pub script_version: u32,
    pub implicit: bool,
    pub votes_for: u64,
    pub votes_against: u64,
    pub positive_stake: Decimal,
    pub negative_stake: Decimal,
}
