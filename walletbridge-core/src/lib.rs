//! Walletbridge Core - client boundary to a wallet node
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Value objects (Wallet, WalletTransaction, ...) and the error taxonomy
//! - **ports**: Traits for the wallet node, the preference store and the host process
//! - **services**: Normalization, error classification, push fan-out and the operations
//! - **adapters**: Concrete implementations (JSON-RPC node, demo node, file store)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::demo::DemoGateway;
use adapters::json_store::JsonFileStore;
use adapters::jsonrpc::JsonRpcGateway;
use config::Config;
use ports::{HostProcess, PreferenceStore, WalletGateway};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, ErrorKind, OperationResult};
pub use domain::{
    AccountAddresses, AssurancePolicy, PendingUpdate, SyncProgress, TransactionPage, Wallet,
    WalletAddress, WalletTransaction,
};
pub use services::{NotificationBridge, PushMessage, TitlePolicy};

/// Main entry point for wallet node operations
///
/// Owns every service and the notification bridge. The bridge is attached
/// to the gateway's push channel exactly once, at construction.
pub struct WalletBridge {
    pub gateway: Arc<dyn WalletGateway>,
    pub notifications: Arc<NotificationBridge>,
    pub wallet_service: WalletService,
    pub address_service: AddressService,
    pub transaction_service: TransactionService,
    pub redemption_service: RedemptionService,
    pub node_service: NodeService,
    pub preference_service: Arc<PreferenceService>,
}

impl WalletBridge {
    /// Wire the services around the given collaborators
    pub fn new(
        gateway: Arc<dyn WalletGateway>,
        preferences: Arc<dyn PreferenceStore>,
        host: Arc<dyn HostProcess>,
        title_policy: TitlePolicy,
    ) -> Self {
        let notifications = Arc::new(NotificationBridge::new());
        gateway.notify(Arc::clone(&notifications) as Arc<dyn ports::NotificationHandler>);

        let preference_service = Arc::new(PreferenceService::new(preferences));

        Self {
            wallet_service: WalletService::new(Arc::clone(&gateway)),
            address_service: AddressService::new(Arc::clone(&gateway)),
            transaction_service: TransactionService::new(Arc::clone(&gateway), title_policy),
            redemption_service: RedemptionService::new(Arc::clone(&gateway), title_policy),
            node_service: NodeService::new(
                Arc::clone(&gateway),
                host,
                Arc::clone(&preference_service),
            ),
            preference_service,
            notifications,
            gateway,
        }
    }

    /// Build from configuration: the demo node or a JSON-RPC node, with
    /// preferences stored under `<data_dir>/preferences`
    pub fn from_config(config: &Config, data_dir: &Path, host: Arc<dyn HostProcess>) -> Result<Self> {
        let gateway: Arc<dyn WalletGateway> = if config.demo_mode {
            Arc::new(DemoGateway::with_sample_data())
        } else {
            Arc::new(JsonRpcGateway::new(
                &config.node.rpc_url,
                &config.node.notify_url,
            )?)
        };

        let store = JsonFileStore::new(&Config::preferences_dir(data_dir))?;

        Ok(Self::new(
            gateway,
            Arc::new(store),
            host,
            config.transaction_titles,
        ))
    }
}
