//! Address service

use std::sync::Arc;

use tracing::debug;

use crate::domain::result::Result;
use crate::domain::{AccountAddresses, WalletAddress};
use crate::ports::{GatewayResult, WalletGateway};
use crate::services::classify::{fail, Operation};
use crate::services::normalize;

pub struct AddressService {
    gateway: Arc<dyn WalletGateway>,
}

impl AddressService {
    pub fn new(gateway: Arc<dyn WalletGateway>) -> Self {
        Self { gateway }
    }

    /// Addresses of the wallet's first account
    pub async fn get_addresses(&self, wallet_id: &str) -> Result<AccountAddresses> {
        debug!(wallet_id, "getAddresses called");
        let accounts = self
            .gateway
            .get_wallet_accounts(wallet_id)
            .await
            .map_err(|e| fail(Operation::GetAddresses, &e))?;
        debug!(wallet_id, accounts = accounts.len(), "getAddresses success");
        Ok(normalize::account_addresses(accounts))
    }

    /// New receiving address on an account (not a wallet)
    pub async fn create_address(
        &self,
        account_id: &str,
        password: Option<&str>,
    ) -> Result<WalletAddress> {
        debug!(account_id, "createAddress called");
        let address = self
            .gateway
            .new_address(account_id, password)
            .await
            .map_err(|e| fail(Operation::CreateAddress, &e))?;
        debug!(account_id, address = %address.id, "createAddress success");
        Ok(normalize::address(address))
    }

    pub async fn is_valid_address(&self, address: &str) -> GatewayResult<bool> {
        self.gateway.is_valid_address(address).await
    }
}
