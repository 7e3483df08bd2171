//! Wallet service - wallet lifecycle on the node

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::result::{Error, Result};
use crate::domain::{AssurancePolicy, Wallet};
use crate::ports::wire::ApiWallet;
use crate::ports::WalletGateway;
use crate::services::classify::{fail, Operation};
use crate::services::normalize;

/// Unit passed to the node for every wallet this client creates or edits
const DEFAULT_UNIT: u32 = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    pub name: String,
    pub mnemonic: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreWalletRequest {
    pub recovery_phrase: String,
    pub wallet_name: String,
    pub wallet_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWalletRequest {
    pub wallet_id: String,
    pub name: String,
    pub assurance: AssurancePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeWalletPasswordRequest {
    pub wallet_id: String,
    pub old_password: String,
    pub new_password: String,
}

/// Progress of a two-step wallet creation or restoration
///
/// The node creates wallets without an account; the first account is a
/// separate call. A failure between the two leaves the wallet in
/// `AccountPending`, reported as `Error::AccountPending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStage {
    WalletCreated,
    AccountPending,
    AccountCreated,
}

/// Wallet service for creation, restoration and editing
pub struct WalletService {
    gateway: Arc<dyn WalletGateway>,
}

impl WalletService {
    pub fn new(gateway: Arc<dyn WalletGateway>) -> Self {
        Self { gateway }
    }

    pub async fn get_wallets(&self) -> Result<Vec<Wallet>> {
        debug!("getWallets called");
        let wallets = self
            .gateway
            .get_wallets()
            .await
            .map_err(|e| fail(Operation::GetWallets, &e))?;
        debug!(count = wallets.len(), "getWallets success");
        Ok(wallets.into_iter().map(normalize::wallet).collect())
    }

    /// Create a wallet and its first account
    pub async fn create_wallet(&self, request: CreateWalletRequest) -> Result<Wallet> {
        debug!(name = %request.name, "createWallet called");
        let CreateWalletRequest { name, mnemonic, password } = request;

        let wallet = self
            .gateway
            .new_wallet(
                &name,
                AssurancePolicy::Normal,
                DEFAULT_UNIT,
                &mnemonic,
                password.as_deref(),
            )
            .await
            .map_err(|e| fail(Operation::CreateWallet, &e))?;

        self.finish_setup(Operation::CreateWallet, wallet, &name, password.as_deref())
            .await
    }

    /// Restore a wallet from its recovery phrase and create its first account
    pub async fn restore_wallet(&self, request: RestoreWalletRequest) -> Result<Wallet> {
        debug!(name = %request.wallet_name, "restoreWallet called");
        let RestoreWalletRequest {
            recovery_phrase,
            wallet_name,
            wallet_password,
        } = request;

        let wallet = self
            .gateway
            .restore_wallet(
                &wallet_name,
                AssurancePolicy::Normal,
                DEFAULT_UNIT,
                &recovery_phrase,
                wallet_password.as_deref(),
            )
            .await
            .map_err(|e| fail(Operation::RestoreWallet, &e))?;

        self.finish_setup(
            Operation::RestoreWallet,
            wallet,
            &wallet_name,
            wallet_password.as_deref(),
        )
        .await
    }

    async fn finish_setup(
        &self,
        operation: Operation,
        wallet: ApiWallet,
        name: &str,
        password: Option<&str>,
    ) -> Result<Wallet> {
        let mut stage = SetupStage::WalletCreated;
        debug!(operation = %operation, wallet_id = %wallet.id, ?stage, "Wallet step done");

        if let Err(e) = self.gateway.new_account(&wallet.id, name, password).await {
            stage = SetupStage::AccountPending;
            error!(
                operation = %operation,
                wallet_id = %wallet.id,
                ?stage,
                "Account creation failed: {}",
                e.message
            );
            return Err(Error::AccountPending { wallet_id: wallet.id });
        }

        stage = SetupStage::AccountCreated;
        debug!(operation = %operation, wallet_id = %wallet.id, ?stage, "Wallet setup complete");
        Ok(normalize::wallet(wallet))
    }

    /// Create the first account of a wallet left in `AccountPending`
    pub async fn create_account(
        &self,
        wallet_id: &str,
        name: &str,
        password: Option<&str>,
    ) -> Result<Wallet> {
        debug!(wallet_id, "createAccount called");
        self.gateway
            .new_account(wallet_id, name, password)
            .await
            .map_err(|e| fail(Operation::CreateAccount, &e))?;

        let wallets = self
            .gateway
            .get_wallets()
            .await
            .map_err(|e| fail(Operation::CreateAccount, &e))?;

        match wallets.into_iter().find(|w| w.id == wallet_id) {
            Some(wallet) => {
                debug!(wallet_id, stage = ?SetupStage::AccountCreated, "createAccount success");
                Ok(normalize::wallet(wallet))
            }
            None => {
                error!(wallet_id, "Wallet disappeared after account creation");
                Err(Error::Generic)
            }
        }
    }

    /// Import a wallet from a key file; an absent password is sent as ""
    pub async fn import_wallet_from_key(
        &self,
        file_path: &Path,
        password: Option<&str>,
    ) -> Result<Wallet> {
        debug!(path = %file_path.display(), "importWalletFromKey called");
        let wallet = self
            .gateway
            .import_wallet(file_path, password.unwrap_or_default())
            .await
            .map_err(|e| fail(Operation::ImportWalletFromKey, &e))?;
        debug!(wallet_id = %wallet.id, "importWalletFromKey success");
        Ok(normalize::wallet(wallet))
    }

    pub async fn update_wallet(&self, request: UpdateWalletRequest) -> Result<Wallet> {
        debug!(wallet_id = %request.wallet_id, "updateWallet called");
        let UpdateWalletRequest { wallet_id, name, assurance } = request;
        let wallet = self
            .gateway
            .update_wallet(&wallet_id, &name, assurance, DEFAULT_UNIT)
            .await
            .map_err(|e| fail(Operation::UpdateWallet, &e))?;
        Ok(normalize::wallet(wallet))
    }

    pub async fn rename_wallet(&self, wallet_id: &str, name: &str) -> Result<Wallet> {
        debug!(wallet_id, name, "renameWallet called");
        let wallet = self
            .gateway
            .rename_wallet(wallet_id, name)
            .await
            .map_err(|e| fail(Operation::RenameWallet, &e))?;
        Ok(normalize::wallet(wallet))
    }

    pub async fn change_wallet_password(&self, request: ChangeWalletPasswordRequest) -> Result<()> {
        debug!(wallet_id = %request.wallet_id, "changeWalletPassword called");
        self.gateway
            .change_wallet_pass(
                &request.wallet_id,
                Some(&request.old_password),
                &request.new_password,
            )
            .await
            .map_err(|e| fail(Operation::ChangeWalletPassword, &e))?;
        debug!(wallet_id = %request.wallet_id, "changeWalletPassword success");
        Ok(())
    }

    /// Set a password on a wallet that has none
    pub async fn set_wallet_password(&self, wallet_id: &str, password: &str) -> Result<()> {
        debug!(wallet_id, "setWalletPassword called");
        self.gateway
            .change_wallet_pass(wallet_id, None, password)
            .await
            .map_err(|e| fail(Operation::SetWalletPassword, &e))
    }

    pub async fn delete_wallet(&self, wallet_id: &str) -> Result<()> {
        debug!(wallet_id, "deleteWallet called");
        self.gateway
            .delete_wallet(wallet_id)
            .await
            .map_err(|e| fail(Operation::DeleteWallet, &e))?;
        debug!(wallet_id, "deleteWallet success");
        Ok(())
    }
}
