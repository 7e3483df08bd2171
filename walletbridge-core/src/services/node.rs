//! Node service - mnemonics, sync progress, software updates, test reset

use std::sync::Arc;

use tracing::debug;

use crate::domain::result::Result;
use crate::domain::{PendingUpdate, SyncProgress};
use crate::ports::wire::ApiUpdate;
use crate::ports::{GatewayResult, HostProcess, WalletGateway};
use crate::services::classify::{fail, Operation};
use crate::services::normalize;
use crate::services::preferences::PreferenceService;

/// Word count of a wallet recovery phrase
pub const WALLET_MNEMONIC_WORDS: usize = 12;

pub struct NodeService {
    gateway: Arc<dyn WalletGateway>,
    host: Arc<dyn HostProcess>,
    preferences: Arc<PreferenceService>,
}

impl NodeService {
    pub fn new(
        gateway: Arc<dyn WalletGateway>,
        host: Arc<dyn HostProcess>,
        preferences: Arc<PreferenceService>,
    ) -> Self {
        Self {
            gateway,
            host,
            preferences,
        }
    }

    /// Fresh recovery phrase, split into words
    pub async fn generate_mnemonic(&self) -> Result<Vec<String>> {
        debug!("generateMnemonic called");
        let phrase = self
            .gateway
            .generate_mnemonic()
            .await
            .map_err(|e| fail(Operation::GenerateMnemonic, &e))?;
        debug!("generateMnemonic success");
        Ok(phrase.split_whitespace().map(str::to_string).collect())
    }

    pub async fn is_valid_mnemonic(&self, mnemonic: &str) -> GatewayResult<bool> {
        self.gateway
            .is_valid_mnemonic(WALLET_MNEMONIC_WORDS, mnemonic)
            .await
    }

    pub async fn get_sync_progress(&self) -> Result<SyncProgress> {
        debug!("getSyncProgress called");
        let progress = self
            .gateway
            .sync_progress()
            .await
            .map_err(|e| fail(Operation::GetSyncProgress, &e))?;
        debug!(
            local = progress.local.difficulty,
            network = ?progress.network.map(|n| n.difficulty),
            "getSyncProgress success"
        );
        Ok(normalize::sync_progress(progress))
    }

    /// Pending software update, if any
    ///
    /// The node rejects when nothing is pending, so every failure here,
    /// including an unreadable descriptor, means "no update".
    pub async fn next_update(&self) -> Result<Option<PendingUpdate>> {
        debug!("nextUpdate called");
        let raw = match self.gateway.next_update().await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("nextUpdate error: {}", e);
                return Ok(None);
            }
        };

        match serde_json::from_str::<ApiUpdate>(&raw) {
            Ok(update) => {
                let update = normalize::update(update);
                debug!(
                    application = %update.application_name,
                    version = update.version,
                    "nextUpdate success"
                );
                Ok(Some(update))
            }
            Err(e) => {
                debug!("nextUpdate descriptor unreadable: {}", e);
                Ok(None)
            }
        }
    }

    /// Apply the pending update, then ask the host to restart
    pub async fn apply_update(&self) -> Result<()> {
        debug!("applyUpdate called");
        self.gateway
            .apply_update()
            .await
            .map_err(|e| fail(Operation::ApplyUpdate, &e))?;
        debug!("applyUpdate success, requesting restart");
        self.host.request_restart();
        Ok(())
    }

    /// Clear local preferences, then reset the node's test state
    pub async fn test_reset(&self) -> Result<()> {
        debug!("testReset called");
        self.preferences.clear().await?;
        self.gateway
            .test_reset()
            .await
            .map_err(|e| fail(Operation::TestReset, &e))?;
        debug!("testReset success");
        Ok(())
    }
}
