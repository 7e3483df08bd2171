//! Redemption service - certificate and paper-vended ADA redemption

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::result::Result;
use crate::domain::WalletTransaction;
use crate::ports::{GatewayResult, WalletGateway};
use crate::services::classify::{fail, Operation};
use crate::services::normalize::{self, TitlePolicy};

/// Word count of a paper-vend redemption mnemonic
pub const REDEMPTION_MNEMONIC_WORDS: usize = 9;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemAdaRequest {
    pub redemption_code: String,
    pub wallet_id: String,
    pub wallet_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemPaperVendedAdaRequest {
    pub shielded_redemption_key: String,
    pub mnemonics: Vec<String>,
    pub wallet_id: String,
    pub wallet_password: Option<String>,
}

pub struct RedemptionService {
    gateway: Arc<dyn WalletGateway>,
    title_policy: TitlePolicy,
}

impl RedemptionService {
    pub fn new(gateway: Arc<dyn WalletGateway>, title_policy: TitlePolicy) -> Self {
        Self { gateway, title_policy }
    }

    pub async fn redeem_ada(&self, request: RedeemAdaRequest) -> Result<WalletTransaction> {
        debug!(wallet_id = %request.wallet_id, "redeemAda called");
        let RedeemAdaRequest {
            redemption_code,
            wallet_id,
            wallet_password,
        } = request;

        let transaction = self
            .gateway
            .redeem_ada(&redemption_code, &wallet_id, wallet_password.as_deref())
            .await
            .map_err(|e| fail(Operation::RedeemAda, &e))?;
        debug!(wallet_id, "redeemAda success");
        Ok(normalize::transaction(transaction, self.title_policy))
    }

    pub async fn redeem_paper_vended_ada(
        &self,
        request: RedeemPaperVendedAdaRequest,
    ) -> Result<WalletTransaction> {
        debug!(wallet_id = %request.wallet_id, "redeemPaperVendedAda called");
        let RedeemPaperVendedAdaRequest {
            shielded_redemption_key,
            mnemonics,
            wallet_id,
            wallet_password,
        } = request;

        let transaction = self
            .gateway
            .redeem_ada_paper_vend(
                &shielded_redemption_key,
                &mnemonics,
                &wallet_id,
                wallet_password.as_deref(),
            )
            .await
            .map_err(|e| fail(Operation::RedeemPaperVendedAda, &e))?;
        debug!(wallet_id, "redeemPaperVendedAda success");
        Ok(normalize::transaction(transaction, self.title_policy))
    }

    pub async fn is_valid_redemption_key(&self, key: &str) -> GatewayResult<bool> {
        self.gateway.is_valid_redemption_key(key).await
    }

    pub async fn is_valid_paper_vend_redemption_key(&self, key: &str) -> GatewayResult<bool> {
        self.gateway.is_valid_paper_vend_redemption_key(key).await
    }

    pub async fn is_valid_redemption_mnemonic(&self, mnemonic: &str) -> GatewayResult<bool> {
        self.gateway
            .is_valid_mnemonic(REDEMPTION_MNEMONIC_WORDS, mnemonic)
            .await
    }
}
