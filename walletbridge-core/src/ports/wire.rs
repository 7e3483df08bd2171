//! Wire DTOs exchanged with the wallet node
//!
//! Field names follow the node's JSON exactly (`cwId`, `ctMeta`, ...); the
//! normalizer turns these into domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::AssurancePolicy;

/// Coin amount in minor units
///
/// The node reports coins as decimal strings; plain JSON integers are
/// accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiCoin {
    #[serde(rename = "getCCoin", with = "coin_amount")]
    pub coins: Decimal,
}

impl ApiCoin {
    pub fn new(coins: u64) -> Self {
        Self { coins: Decimal::from(coins) }
    }
}

/// Stake amount in minor units (update votes use a different wrapper key)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiStake {
    #[serde(rename = "getCoin", with = "coin_amount")]
    pub coins: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiWalletMeta {
    #[serde(rename = "cwName")]
    pub name: String,
    #[serde(rename = "cwAssurance")]
    pub assurance: AssurancePolicy,
    #[serde(rename = "cwUnit", default)]
    pub unit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiWallet {
    #[serde(rename = "cwId")]
    pub id: String,
    #[serde(rename = "cwMeta")]
    pub meta: ApiWalletMeta,
    #[serde(rename = "cwAccountsNumber", default)]
    pub accounts_number: u32,
    #[serde(rename = "cwAmount")]
    pub amount: ApiCoin,
    #[serde(rename = "cwHasPassphrase")]
    pub has_passphrase: bool,
    /// Epoch seconds of the last passphrase change
    #[serde(rename = "cwPassphraseLU")]
    pub passphrase_last_update: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiAccountMeta {
    #[serde(rename = "caName")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiAccount {
    #[serde(rename = "caId")]
    pub id: String,
    #[serde(rename = "caMeta", default)]
    pub meta: ApiAccountMeta,
    #[serde(rename = "caAddresses", default)]
    pub addresses: Vec<ApiAddress>,
    #[serde(rename = "caAmount", default)]
    pub amount: ApiCoin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiAddress {
    #[serde(rename = "cadId")]
    pub id: String,
    #[serde(rename = "cadAmount")]
    pub amount: ApiCoin,
    #[serde(rename = "cadIsUsed")]
    pub is_used: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTransactionMeta {
    #[serde(rename = "ctmTitle", default)]
    pub title: Option<String>,
    #[serde(rename = "ctmDescription", default)]
    pub description: Option<String>,
    /// Epoch seconds
    #[serde(rename = "ctmDate")]
    pub date: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTransaction {
    #[serde(rename = "ctId")]
    pub id: String,
    /// Unsigned; direction comes from `is_outgoing`
    #[serde(rename = "ctAmount")]
    pub amount: ApiCoin,
    #[serde(rename = "ctConfirmations", default)]
    pub confirmations: u64,
    #[serde(rename = "ctMeta")]
    pub meta: ApiTransactionMeta,
    #[serde(rename = "ctInputAddrs", default)]
    pub input_addresses: Vec<String>,
    #[serde(rename = "ctOutputAddrs", default)]
    pub output_addresses: Vec<String>,
    #[serde(rename = "ctIsOutgoing")]
    pub is_outgoing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiChainDifficulty {
    #[serde(rename = "getChainDifficulty")]
    pub difficulty: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSyncProgress {
    #[serde(rename = "_spLocalCD")]
    pub local: ApiChainDifficulty,
    #[serde(rename = "_spNetworkCD", default)]
    pub network: Option<ApiChainDifficulty>,
    #[serde(rename = "_spPeers", default)]
    pub peers: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiApplicationName {
    #[serde(rename = "getApplicationName")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSoftwareVersion {
    #[serde(rename = "svAppName")]
    pub app_name: ApiApplicationName,
    #[serde(rename = "svNumber")]
    pub number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiBlockVersion {
    #[serde(rename = "bvMajor")]
    pub major: u32,
    #[serde(rename = "bvMinor")]
    pub minor: u32,
    #[serde(rename = "bvAlt")]
    pub alt: u32,
}

/// Pending update descriptor
///
/// `cuiBlockVesion` is spelled the way the node emits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiUpdate {
    #[serde(rename = "cuiSoftwareVersion")]
    pub software_version: ApiSoftwareVersion,
    #[serde(rename = "cuiBlockVesion")]
    pub block_version: ApiBlockVersion,
    #[serde(rename = "cuiScriptVersion", default)]
    pub script_version: u32,
    #[serde(rename = "cuiImplicit", default)]
    pub implicit: bool,
    #[serde(rename = "cuiVotesFor", default)]
    pub votes_for: u64,
    #[serde(rename = "cuiVotesAgainst", default)]
    pub votes_against: u64,
    #[serde(rename = "cuiPositiveStake", default)]
    pub positive_stake: ApiStake,
    #[serde(rename = "cuiNegativeStake", default)]
    pub negative_stake: ApiStake,
}

mod coin_amount {
    use rust_decimal::Decimal;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCoin {
        Text(String),
        Integer(u64),
    }

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        match RawCoin::deserialize(deserializer)? {
            RawCoin::Text(text) => text
                .trim()
                .parse::<Decimal>()
                .map_err(|e| D::Error::custom(format!("invalid coin amount {:?}: {}", text, e))),
            RawCoin::Integer(value) => Ok(Decimal::from(value)),
        }
    }
}
