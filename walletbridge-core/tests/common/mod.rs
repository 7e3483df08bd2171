//! Shared fixtures: a demo node, an in-memory store and a host that counts
//! restart requests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use walletbridge_core::adapters::demo::DemoGateway;
use walletbridge_core::adapters::memory::MemoryStore;
use walletbridge_core::ports::{HostProcess, PreferenceStore, WalletGateway};
use walletbridge_core::services::CreateWalletRequest;
use walletbridge_core::{TitlePolicy, Wallet, WalletBridge};

#[derive(Default)]
pub struct CountingHost {
    restarts: AtomicUsize,
}

impl CountingHost {
    pub fn restarts(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }
}

impl HostProcess for CountingHost {
    fn request_restart(&self) {
        self.restarts.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Fixture {
    pub node: Arc<DemoGateway>,
    pub store: Arc<MemoryStore>,
    pub host: Arc<CountingHost>,
    pub bridge: WalletBridge,
}

pub fn fixture_with(node: DemoGateway, title_policy: TitlePolicy) -> Fixture {
    let node = Arc::new(node);
    let store = Arc::new(MemoryStore::new());
    let host = Arc::new(CountingHost::default());
    let bridge = WalletBridge::new(
        Arc::clone(&node) as Arc<dyn WalletGateway>,
        Arc::clone(&store) as Arc<dyn PreferenceStore>,
        Arc::clone(&host) as Arc<dyn HostProcess>,
        title_policy,
    );
    Fixture {
        node,
        store,
        host,
        bridge,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(DemoGateway::new(), TitlePolicy::Literal)
}

/// Create a wallet (with its first account) through the facade
pub async fn create_wallet(fixture: &Fixture, name: &str) -> Wallet {
    let mnemonic = fixture
        .bridge
        .node_service
        .generate_mnemonic()
        .await
        .unwrap()
        .join(" ");
    fixture
        .bridge
        .wallet_service
        .create_wallet(CreateWalletRequest {
            name: name.to_string(),
            mnemonic,
            password: None,
        })
        .await
        .unwrap()
}

/// Account id of a wallet's first account
pub async fn first_account(fixture: &Fixture, wallet_id: &str) -> String {
    fixture
        .bridge
        .address_service
        .get_addresses(wallet_id)
        .await
        .unwrap()
        .account_id
        .unwrap()
}
