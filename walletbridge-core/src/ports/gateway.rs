//! Wallet node gateway port

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AssurancePolicy;
use crate::ports::wire::{
    ApiAccount, ApiAddress, ApiSyncProgress, ApiTransaction, ApiWallet,
};

/// Unstructured failure reported by the wallet node
///
/// The node communicates failure reasons as free text; `message` is kept
/// verbatim because the error classifier matches on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GatewayError {
    pub code: Option<i64>,
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Whether the node's message contains `needle` (case-sensitive)
    pub fn mentions(&self, needle: &str) -> bool {
        self.message.contains(needle)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::new(format!("Malformed node response: {}", error))
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Backend methods exposed by the wallet node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayMethod {
    GetWallets,
    GetWalletAccounts,
    GetHistoryByWallet,
    NewWallet,
    NewAccount,
    DeleteWallet,
    NewPayment,
    NewAddress,
    IsValidAddress,
    IsValidMnemonic,
    IsValidRedemptionKey,
    IsValidPaperVendRedemptionKey,
    GenerateMnemonic,
    RestoreWallet,
    ImportWallet,
    RedeemAda,
    RedeemAdaPaperVend,
    NextUpdate,
    ApplyUpdate,
    SyncProgress,
    UpdateWallet,
    RenameWallet,
    ChangeWalletPass,
    TestReset,
}

impl GatewayMethod {
    /// JSON-RPC method name
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayMethod::GetWallets => "get_wallets",
            GatewayMethod::GetWalletAccounts => "get_wallet_accounts",
            GatewayMethod::GetHistoryByWallet => "get_history_by_wallet",
            GatewayMethod::NewWallet => "new_wallet",
            GatewayMethod::NewAccount => "new_account",
            GatewayMethod::DeleteWallet => "delete_wallet",
            GatewayMethod::NewPayment => "new_payment",
            GatewayMethod::NewAddress => "new_address",
            GatewayMethod::IsValidAddress => "is_valid_address",
            GatewayMethod::IsValidMnemonic => "is_valid_mnemonic",
            GatewayMethod::IsValidRedemptionKey => "is_valid_redemption_key",
            GatewayMethod::IsValidPaperVendRedemptionKey => "is_valid_paper_vend_redemption_key",
            GatewayMethod::GenerateMnemonic => "generate_mnemonic",
            GatewayMethod::RestoreWallet => "restore_wallet",
            GatewayMethod::ImportWallet => "import_wallet",
            GatewayMethod::RedeemAda => "redeem_ada",
            GatewayMethod::RedeemAdaPaperVend => "redeem_ada_paper_vend",
            GatewayMethod::NextUpdate => "next_update",
            GatewayMethod::ApplyUpdate => "apply_update",
            GatewayMethod::SyncProgress => "sync_progress",
            GatewayMethod::UpdateWallet => "update_wallet",
            GatewayMethod::RenameWallet => "rename_wallet",
            GatewayMethod::ChangeWalletPass => "change_wallet_pass",
            GatewayMethod::TestReset => "test_reset",
        }
    }
}

/// Raw text the node sends when the push channel closes
pub const CONNECTION_CLOSED: &str = "ConnectionClosed";

/// Receiver for the node's single push channel
///
/// `on_message` gets the raw text frame, which is either the
/// `ConnectionClosed` sentinel or a JSON document.
pub trait NotificationHandler: Send + Sync {
    fn on_message(&self, raw: &str);

    fn on_error(&self, error: &GatewayError);
}

/// Remote wallet node
///
/// Implementations resolve with raw wire DTOs or reject with the node's
/// unstructured error text. No implementation is expected to retry.
#[async_trait]
pub trait WalletGateway: Send + Sync {
    // === Wallets ===

    async fn get_wallets(&self) -> GatewayResult<Vec<ApiWallet>>;

    /// Create a wallet; it has no account until `new_account` succeeds
    async fn new_wallet(
        &self,
        name: &str,
        assurance: AssurancePolicy,
        unit: u32,
        mnemonic: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiWallet>;

    /// Restore a wallet from its recovery phrase; no account is created
    async fn restore_wallet(
        &self,
        name: &str,
        assurance: AssurancePolicy,
        unit: u32,
        mnemonic: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiWallet>;

    /// Import a wallet from a key file on the node's filesystem
    async fn import_wallet(&self, file_path: &Path, password: &str) -> GatewayResult<ApiWallet>;

    async fn update_wallet(
        &self,
        wallet_id: &str,
        name: &str,
        assurance: AssurancePolicy,
        unit: u32,
    ) -> GatewayResult<ApiWallet>;

    async fn rename_wallet(&self, wallet_id: &str, name: &str) -> GatewayResult<ApiWallet>;

    /// Change or set (when `old_password` is `None`) the spending password
    async fn change_wallet_pass(
        &self,
        wallet_id: &str,
        old_password: Option<&str>,
        new_password: &str,
    ) -> GatewayResult<()>;

    async fn delete_wallet(&self, wallet_id: &str) -> GatewayResult<()>;

    // === Accounts and addresses ===

    async fn get_wallet_accounts(&self, wallet_id: &str) -> GatewayResult<Vec<ApiAccount>>;

    async fn new_account(
        &self,
        wallet_id: &str,
        name: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiAccount>;

    async fn new_address(&self, account_id: &str, password: Option<&str>) -> GatewayResult<ApiAddress>;

    async fn is_valid_address(&self, address: &str) -> GatewayResult<bool>;

    // === Transactions ===

    /// One page of history plus the total number of transactions
    async fn get_history_by_wallet(
        &self,
        wallet_id: &str,
        skip: u64,
        limit: u64,
    ) -> GatewayResult<(Vec<ApiTransaction>, u64)>;

    /// Send `amount` minor units from an account (not a wallet) to an address
    async fn new_payment(
        &self,
        sender_account_id: &str,
        receiver: &str,
        amount: u64,
        password: Option<&str>,
    ) -> GatewayResult<ApiTransaction>;

    // === Redemption ===

    async fn redeem_ada(
        &self,
        redemption_code: &str,
        wallet_id: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiTransaction>;

    async fn redeem_ada_paper_vend(
        &self,
        shielded_redemption_key: &str,
        mnemonics: &[String],
        wallet_id: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiTransaction>;

    async fn is_valid_redemption_key(&self, key: &str) -> GatewayResult<bool>;

    async fn is_valid_paper_vend_redemption_key(&self, key: &str) -> GatewayResult<bool>;

    // === Mnemonics ===

    /// Space-delimited word sequence
    async fn generate_mnemonic(&self) -> GatewayResult<String>;

    async fn is_valid_mnemonic(&self, word_count: usize, mnemonic: &str) -> GatewayResult<bool>;

    // === Node ===

    async fn sync_progress(&self) -> GatewayResult<ApiSyncProgress>;

    /// Raw JSON update descriptor; rejects when no update is pending
    async fn next_update(&self) -> GatewayResult<String>;

    async fn apply_update(&self) -> GatewayResult<()>;

    async fn test_reset(&self) -> GatewayResult<()>;

    // === Push channel ===

    /// Attach the handler to the node's push channel
    fn notify(&self, handler: Arc<dyn NotificationHandler>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_keeps_message_verbatim() {
        let err = GatewayError::with_code(-32000, "Not enough money to send: 5 < 10");
        assert_eq!(err.to_string(), "Not enough money to send: 5 < 10");
        assert!(err.mentions("Not enough money to send"));
        assert!(!err.mentions("not enough money"));
    }

    #[test]
    fn test_method_names_are_unique() {
        use std::collections::HashSet;

        let methods = [
            GatewayMethod::GetWallets,
            GatewayMethod::GetWalletAccounts,
            GatewayMethod::GetHistoryByWallet,
            GatewayMethod::NewWallet,
            GatewayMethod::NewAccount,
            GatewayMethod::DeleteWallet,
            GatewayMethod::NewPayment,
            GatewayMethod::NewAddress,
            GatewayMethod::IsValidAddress,
            GatewayMethod::IsValidMnemonic,
            GatewayMethod::IsValidRedemptionKey,
            GatewayMethod::IsValidPaperVendRedemptionKey,
            GatewayMethod::GenerateMnemonic,
            GatewayMethod::RestoreWallet,
            GatewayMethod::ImportWallet,
            GatewayMethod::RedeemAda,
            GatewayMethod::RedeemAdaPaperVend,
            GatewayMethod::NextUpdate,
            GatewayMethod::ApplyUpdate,
            GatewayMethod::SyncProgress,
            GatewayMethod::UpdateWallet,
            GatewayMethod::RenameWallet,
            GatewayMethod::ChangeWalletPass,
            GatewayMethod::TestReset,
        ];
        let names: HashSet<_> = methods.iter().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), methods.len());
    }
}
