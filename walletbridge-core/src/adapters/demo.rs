//! In-memory wallet node for demo mode and tests
//!
//! Behaves like a small node: wallets own accounts, accounts own addresses,
//! balances live on addresses and every movement is written to the wallet's
//! history (newest first). Failure texts match what a real node reports.
//!
//! Test hooks:
//! - `fail_next` makes the next call of one method fail with a given text
//! - `push` / `push_error` drive the push channel
//! - `issue_redemption_code` / `issue_paper_vend_code` mint redeemable keys

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::domain::AssurancePolicy;
use crate::ports::wire::{
    ApiAccount, ApiAccountMeta, ApiAddress, ApiApplicationName, ApiBlockVersion,
    ApiChainDifficulty, ApiCoin, ApiSoftwareVersion, ApiStake, ApiSyncProgress, ApiTransaction,
    ApiTransactionMeta, ApiUpdate, ApiWallet, ApiWalletMeta,
};
use crate::ports::{
    GatewayError, GatewayMethod, GatewayResult, NotificationHandler, WalletGateway,
};

const WALLET_EXISTS: &str = "Wallet with that mnemonics already exists";
const NOT_ENOUGH_MONEY: &str = "Not enough money to send";
const PASSPHRASE_MISMATCH: &str = "Passphrase doesn't match";

const ADDRESS_PREFIX: &str = "DdzFF";
const ADDRESS_HEX_LEN: usize = 40;
const REDEMPTION_KEY_BYTES: usize = 32;
const PAPER_VEND_KEY_LEN: usize = 44;
const PAPER_VEND_WORDS: usize = 9;
const RECOVERY_WORDS: usize = 12;

const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const WORDLIST: &[&str] = &[
    "abandon", "ability", "able", "about", "above", "absent", "absorb", "abstract",
    "absurd", "abuse", "access", "accident", "account", "accuse", "achieve", "acid",
    "acoustic", "acquire", "across", "act", "action", "actor", "actress", "actual",
    "adapt", "add", "addict", "address", "adjust", "admit", "adult", "advance",
    "advice", "aerobic", "affair", "afford", "afraid", "again", "age", "agent",
    "agree", "ahead", "aim", "air", "airport", "aisle", "alarm", "album",
    "alcohol", "alert", "alien", "all", "alley", "allow", "almost", "alone",
    "alpha", "already", "also", "alter", "always", "amateur", "amazing", "among",
    "amount", "amused", "analyst", "anchor", "ancient", "anger", "angle", "angry",
    "animal", "ankle", "announce", "annual", "another", "answer", "antenna", "antique",
    "anxiety", "any", "apart", "apology", "appear", "apple", "approve", "april",
    "arch", "arctic", "area", "arena", "argue", "arm", "armed", "armor",
    "army", "around", "arrange", "arrest", "arrive", "arrow", "art", "artefact",
    "artist", "artwork", "ask", "aspect", "assault", "asset", "assist", "assume",
    "asthma", "athlete", "atom", "attack", "attend", "attitude", "attract", "auction",
    "audit", "august", "aunt", "author", "auto", "autumn", "average", "avocado",
];

struct DemoAddress {
    id: String,
    lovelaces: u64,
    used: bool,
}

struct DemoAccount {
    id: String,
    name: String,
    addresses: Vec<DemoAddress>,
}

struct DemoWallet {
    id: String,
    name: String,
    assurance: AssurancePolicy,
    unit: u32,
    password: Option<String>,
    password_changed_at: f64,
    /// Recovery phrase or key-file secret; unique across the node
    secret: String,
    accounts: Vec<DemoAccount>,
    history: Vec<ApiTransaction>,
}

struct PaperVendCode {
    mnemonics: Vec<String>,
    lovelaces: u64,
}

struct DemoState {
    wallets: Vec<DemoWallet>,
    redemption_codes: HashMap<String, u64>,
    paper_vend_codes: HashMap<String, PaperVendCode>,
    redeemed: HashSet<String>,
    sync: ApiSyncProgress,
    pending_update: Option<ApiUpdate>,
}

impl Default for DemoState {
    fn default() -> Self {
        Self {
            wallets: Vec::new(),
            redemption_codes: HashMap::new(),
            paper_vend_codes: HashMap::new(),
            redeemed: HashSet::new(),
            sync: ApiSyncProgress {
                local: ApiChainDifficulty { difficulty: 1000 },
                network: Some(ApiChainDifficulty { difficulty: 1000 }),
                peers: 3,
            },
            pending_update: None,
        }
    }
}

fn now_seconds() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

fn not_found(what: &str, id: &str) -> GatewayError {
    GatewayError::new(format!("{} not found: {}", what, id))
}

fn new_address_id() -> String {
    let bytes: [u8; ADDRESS_HEX_LEN / 2] = rand::thread_rng().gen();
    format!("{}{}", ADDRESS_PREFIX, hex::encode(bytes))
}

fn random_words(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .filter_map(|_| WORDLIST.choose(&mut rng).map(|w| w.to_string()))
        .collect()
}

fn address_format_ok(address: &str) -> bool {
    address
        .strip_prefix(ADDRESS_PREFIX)
        .map(|tail| tail.len() == ADDRESS_HEX_LEN && tail.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

fn redemption_key_format_ok(key: &str) -> bool {
    BASE64
        .decode(key.trim())
        .map(|bytes| bytes.len() == REDEMPTION_KEY_BYTES)
        .unwrap_or(false)
}

fn paper_vend_key_format_ok(key: &str) -> bool {
    key.len() == PAPER_VEND_KEY_LEN && key.bytes().all(|b| BASE58_ALPHABET.contains(&b))
}

fn check_password(wallet: &DemoWallet, password: Option<&str>) -> GatewayResult<()> {
    match wallet.password.as_deref() {
        Some(expected) if password != Some(expected) => Err(GatewayError::new(PASSPHRASE_MISMATCH)),
        _ => Ok(()),
    }
}

impl DemoAccount {
    fn new(wallet_id: &str, name: &str) -> Self {
        let index: u32 = rand::thread_rng().gen();
        Self {
            id: format!("{}@{}", wallet_id, index),
            name: name.to_string(),
            addresses: vec![DemoAddress {
                id: new_address_id(),
                lovelaces: 0,
                used: false,
            }],
        }
    }

    fn balance(&self) -> u64 {
        self.addresses.iter().map(|a| a.lovelaces).sum()
    }

    fn to_api(&self) -> ApiAccount {
        ApiAccount {
            id: self.id.clone(),
            meta: ApiAccountMeta { name: self.name.clone() },
            addresses: self.addresses.iter().map(DemoAddress::to_api).collect(),
            amount: ApiCoin::new(self.balance()),
        }
    }
}

impl DemoAddress {
    fn to_api(&self) -> ApiAddress {
        ApiAddress {
            id: self.id.clone(),
            amount: ApiCoin::new(self.lovelaces),
            is_used: self.used,
        }
    }
}

impl DemoWallet {
    fn new(name: &str, assurance: AssurancePolicy, unit: u32, secret: &str, password: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            name: name.to_string(),
            assurance,
            unit,
            password: password.filter(|p| !p.is_empty()).map(str::to_string),
            password_changed_at: now_seconds(),
            secret: secret.to_string(),
            accounts: Vec::new(),
            history: Vec::new(),
        }
    }

    fn to_api(&self) -> ApiWallet {
        ApiWallet {
            id: self.id.clone(),
            meta: ApiWalletMeta {
                name: self.name.clone(),
                assurance: self.assurance,
                unit: self.unit,
            },
            accounts_number: self.accounts.len() as u32,
            amount: ApiCoin::new(self.accounts.iter().map(DemoAccount::balance).sum()),
            has_passphrase: self.password.is_some(),
            passphrase_last_update: self.password_changed_at,
        }
    }

    /// Credit the first address of the first account
    fn credit(&mut self, lovelaces: u64) -> GatewayResult<String> {
        let account = self
            .accounts
            .first_mut()
            .ok_or_else(|| GatewayError::new("Wallet has no accounts"))?;
        if account.addresses.is_empty() {
            account.addresses.push(DemoAddress {
                id: new_address_id(),
                lovelaces: 0,
                used: false,
            });
        }
        let address = &mut account.addresses[0];
        address.lovelaces += lovelaces;
        address.used = true;
        Ok(address.id.clone())
    }

    fn record(&mut self, transaction: ApiTransaction) {
        self.history.insert(0, transaction);
    }
}

fn history_entry(
    id: &str,
    lovelaces: u64,
    is_outgoing: bool,
    inputs: Vec<String>,
    outputs: Vec<String>,
) -> ApiTransaction {
    ApiTransaction {
        id: id.to_string(),
        amount: ApiCoin::new(lovelaces),
        confirmations: 0,
        meta: ApiTransactionMeta {
            title: None,
            description: None,
            date: now_seconds(),
        },
        input_addresses: inputs,
        output_addresses: outputs,
        is_outgoing,
    }
}

impl DemoState {
    fn wallet(&self, wallet_id: &str) -> GatewayResult<&DemoWallet> {
        self.wallets
            .iter()
            .find(|w| w.id == wallet_id)
            .ok_or_else(|| not_found("Wallet", wallet_id))
    }

    fn wallet_mut(&mut self, wallet_id: &str) -> GatewayResult<&mut DemoWallet> {
        self.wallets
            .iter_mut()
            .find(|w| w.id == wallet_id)
            .ok_or_else(|| not_found("Wallet", wallet_id))
    }

    /// (wallet index, account index) of an account id
    fn locate_account(&self, account_id: &str) -> GatewayResult<(usize, usize)> {
        self.wallets
            .iter()
            .enumerate()
            .find_map(|(wi, w)| {
                w.accounts
                    .iter()
                    .position(|a| a.id == account_id)
                    .map(|ai| (wi, ai))
            })
            .ok_or_else(|| not_found("Account", account_id))
    }

    /// (wallet index, account index, address index) of a local address
    fn locate_address(&self, address: &str) -> Option<(usize, usize, usize)> {
        self.wallets.iter().enumerate().find_map(|(wi, w)| {
            w.accounts.iter().enumerate().find_map(|(ai, a)| {
                a.addresses
                    .iter()
                    .position(|d| d.id == address)
                    .map(|di| (wi, ai, di))
            })
        })
    }

    fn ensure_unique_secret(&self, secret: &str) -> GatewayResult<()> {
        if self.wallets.iter().any(|w| w.secret == secret) {
            return Err(GatewayError::new(WALLET_EXISTS));
        }
        Ok(())
    }

    fn add_wallet(&mut self, wallet: DemoWallet) -> ApiWallet {
        let api = wallet.to_api();
        self.wallets.push(wallet);
        api
    }

    fn pay(
        &mut self,
        sender: &str,
        receiver: &str,
        lovelaces: u64,
        password: Option<&str>,
    ) -> GatewayResult<ApiTransaction> {
        let (wi, ai) = self.locate_account(sender)?;
        check_password(&self.wallets[wi], password)?;

        if !address_format_ok(receiver) {
            return Err(GatewayError::new(format!("Invalid receiver address: {}", receiver)));
        }
        if lovelaces == 0 {
            return Err(GatewayError::new("Payment amount must be positive"));
        }

        let balance = self.wallets[wi].accounts[ai].balance();
        if lovelaces > balance {
            return Err(GatewayError::new(format!(
                "{}: balance is {} but {} was requested",
                NOT_ENOUGH_MONEY, balance, lovelaces
            )));
        }

        let mut remaining = lovelaces;
        let mut inputs = Vec::new();
        for address in self.wallets[wi].accounts[ai].addresses.iter_mut() {
            if remaining == 0 {
                break;
            }
            if address.lovelaces == 0 {
                continue;
            }
            let taken = address.lovelaces.min(remaining);
            address.lovelaces -= taken;
            remaining -= taken;
            inputs.push(address.id.clone());
        }

        let tx_id = hex::encode(Uuid::new_v4().as_bytes());
        let outgoing = history_entry(&tx_id, lovelaces, true, inputs.clone(), vec![receiver.to_string()]);
        self.wallets[wi].record(outgoing.clone());

        if let Some((rwi, rai, rdi)) = self.locate_address(receiver) {
            let address = &mut self.wallets[rwi].accounts[rai].addresses[rdi];
            address.lovelaces += lovelaces;
            address.used = true;
            let incoming = history_entry(&tx_id, lovelaces, false, inputs, vec![receiver.to_string()]);
            self.wallets[rwi].record(incoming);
        }

        Ok(outgoing)
    }

    fn redeem(&mut self, key: &str, lovelaces: u64, wallet_id: &str, password: Option<&str>) -> GatewayResult<ApiTransaction> {
        let wallet = self.wallet_mut(wallet_id)?;
        check_password(wallet, password)?;
        let address = wallet.credit(lovelaces)?;

        let transaction = history_entry(
            &hex::encode(Uuid::new_v4().as_bytes()),
            lovelaces,
            false,
            Vec::new(),
            vec![address],
        );
        wallet.record(transaction.clone());
        self.redeemed.insert(key.to_string());
        Ok(transaction)
    }
}

/// Simulated wallet node
pub struct DemoGateway {
    state: Mutex<DemoState>,
    faults: Mutex<HashMap<GatewayMethod, String>>,
    handlers: Mutex<Vec<Arc<dyn NotificationHandler>>>,
}

impl Default for DemoGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoGateway {
    /// An empty node, fully synced, with no pending update
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DemoState::default()),
            faults: Mutex::new(HashMap::new()),
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// A node holding one funded wallet with some history and a pending update
    pub fn with_sample_data() -> Self {
        let gateway = Self::new();
        {
            let mut state = gateway.state();
            let mut wallet = DemoWallet::new(
                "Demo wallet",
                AssurancePolicy::Normal,
                0,
                &random_words(RECOVERY_WORDS).join(" "),
                None,
            );
            wallet.accounts.push(DemoAccount::new(&wallet.id, "Demo wallet"));

            let external = new_address_id();
            for (lovelaces, outgoing) in [
                (1_000_000_000u64, false),
                (500_000_000, false),
                (249_500_000, true),
            ] {
                let tx_id = hex::encode(Uuid::new_v4().as_bytes());
                let own = if outgoing {
                    wallet.accounts[0].addresses[0].id.clone()
                } else {
                    wallet.credit(lovelaces).unwrap_or_default()
                };
                if outgoing {
                    if let Some(address) = wallet.accounts[0].addresses.first_mut() {
                        address.lovelaces = address.lovelaces.saturating_sub(lovelaces);
                    }
                }
                let (inputs, outputs) = if outgoing {
                    (vec![own], vec![external.clone()])
                } else {
                    (vec![external.clone()], vec![own])
                };
                wallet.record(history_entry(&tx_id, lovelaces, outgoing, inputs, outputs));
            }

            state.wallets.push(wallet);
            state.pending_update = Some(sample_update());
        }
        gateway
    }

    fn state(&self) -> MutexGuard<'_, DemoState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_fault(&self, method: GatewayMethod) -> GatewayResult<()> {
        let mut faults = self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match faults.remove(&method) {
            Some(message) => {
                debug!(method = method.as_str(), "Injected demo node failure");
                Err(GatewayError::new(message))
            }
            None => Ok(()),
        }
    }

    fn handlers(&self) -> Vec<Arc<dyn NotificationHandler>> {
        self.handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Make the next call of `method` fail with `message`
    pub fn fail_next(&self, method: GatewayMethod, message: impl Into<String>) {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(method, message.into());
    }

    /// Send a raw frame down the push channel
    pub fn push(&self, raw: &str) {
        for handler in self.handlers() {
            handler.on_message(raw);
        }
    }

    /// Report a transport error on the push channel
    pub fn push_error(&self, message: &str) {
        let error = GatewayError::new(message);
        for handler in self.handlers() {
            handler.on_error(&error);
        }
    }

    /// Number of handlers attached to the push channel
    pub fn notify_subscriptions(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Credit `lovelaces` to an account's first address
    pub fn fund_account(&self, account_id: &str, lovelaces: u64) -> GatewayResult<()> {
        let mut state = self.state();
        let (wi, ai) = state.locate_account(account_id)?;
        let account = &mut state.wallets[wi].accounts[ai];
        match account.addresses.first_mut() {
            Some(address) => {
                address.lovelaces += lovelaces;
                address.used = true;
                Ok(())
            }
            None => Err(GatewayError::new("Account has no addresses")),
        }
    }

    /// Mint a certificate redemption key worth `lovelaces`
    pub fn issue_redemption_code(&self, lovelaces: u64) -> String {
        let bytes: [u8; REDEMPTION_KEY_BYTES] = rand::thread_rng().gen();
        let code = BASE64.encode(bytes);
        self.state().redemption_codes.insert(code.clone(), lovelaces);
        code
    }

    /// Mint a paper-vend key and its 9-word mnemonic worth `lovelaces`
    pub fn issue_paper_vend_code(&self, lovelaces: u64) -> (String, Vec<String>) {
        let mut rng = rand::thread_rng();
        let key: String = (0..PAPER_VEND_KEY_LEN)
            .map(|_| BASE58_ALPHABET[rng.gen_range(0..BASE58_ALPHABET.len())] as char)
            .collect();
        let mnemonics = random_words(PAPER_VEND_WORDS);
        self.state().paper_vend_codes.insert(
            key.clone(),
            PaperVendCode {
                mnemonics: mnemonics.clone(),
                lovelaces,
            },
        );
        (key, mnemonics)
    }

    pub fn set_sync_progress(&self, local: u64, network: Option<u64>) {
        let mut state = self.state();
        state.sync.local = ApiChainDifficulty { difficulty: local };
        state.sync.network = network.map(|difficulty| ApiChainDifficulty { difficulty });
    }

    pub fn set_pending_update(&self, update: Option<ApiUpdate>) {
        self.state().pending_update = update;
    }
}

/// Update descriptor offered by the sample node
pub fn sample_update() -> ApiUpdate {
    ApiUpdate {
        software_version: ApiSoftwareVersion {
            app_name: ApiApplicationName {
                name: "cardano".to_string(),
            },
            number: 1,
        },
        block_version: ApiBlockVersion {
            major: 0,
            minor: 1,
            alt: 0,
        },
        script_version: 1,
        implicit: false,
        votes_for: 2,
        votes_against: 0,
        positive_stake: ApiStake {
            coins: Decimal::from(66_666u64),
        },
        negative_stake: ApiStake::default(),
    }
}

#[async_trait]
impl WalletGateway for DemoGateway {
    async fn get_wallets(&self) -> GatewayResult<Vec<ApiWallet>> {
        self.take_fault(GatewayMethod::GetWallets)?;
        Ok(self.state().wallets.iter().map(DemoWallet::to_api).collect())
    }

    async fn new_wallet(
        &self,
        name: &str,
        assurance: AssurancePolicy,
        unit: u32,
        mnemonic: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiWallet> {
        self.take_fault(GatewayMethod::NewWallet)?;
        let mut state = self.state();
        state.ensure_unique_secret(mnemonic)?;
        Ok(state.add_wallet(DemoWallet::new(name, assurance, unit, mnemonic, password)))
    }

    async fn restore_wallet(
        &self,
        name: &str,
        assurance: AssurancePolicy,
        unit: u32,
        mnemonic: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiWallet> {
        self.take_fault(GatewayMethod::RestoreWallet)?;
        let words = mnemonic.split_whitespace().count();
        if words != RECOVERY_WORDS {
            return Err(GatewayError::new(format!(
                "Invalid mnemonic: expected {} words, got {}",
                RECOVERY_WORDS, words
            )));
        }
        let mut state = self.state();
        state.ensure_unique_secret(mnemonic)?;
        Ok(state.add_wallet(DemoWallet::new(name, assurance, unit, mnemonic, password)))
    }

    async fn import_wallet(&self, file_path: &Path, password: &str) -> GatewayResult<ApiWallet> {
        self.take_fault(GatewayMethod::ImportWallet)?;
        let content = tokio::fs::read_to_string(file_path).await.map_err(|e| {
            GatewayError::new(format!("Failed to read key file {}: {}", file_path.display(), e))
        })?;
        let secret = content.trim();
        if secret.is_empty() {
            return Err(GatewayError::new("Key file is empty"));
        }

        let name = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Imported wallet".to_string());

        let mut state = self.state();
        state.ensure_unique_secret(secret)?;
        let mut wallet = DemoWallet::new(&name, AssurancePolicy::Normal, 0, secret, Some(password));
        wallet.accounts.push(DemoAccount::new(&wallet.id, &name));
        Ok(state.add_wallet(wallet))
    }

    async fn update_wallet(
        &self,
        wallet_id: &str,
        name: &str,
        assurance: AssurancePolicy,
        unit: u32,
    ) -> GatewayResult<ApiWallet> {
        self.take_fault(GatewayMethod::UpdateWallet)?;
        let mut state = self.state();
        let wallet = state.wallet_mut(wallet_id)?;
        wallet.name = name.to_string();
        wallet.assurance = assurance;
        wallet.unit = unit;
        Ok(wallet.to_api())
    }

    async fn rename_wallet(&self, wallet_id: &str, name: &str) -> GatewayResult<ApiWallet> {
        self.take_fault(GatewayMethod::RenameWallet)?;
        let mut state = self.state();
        let wallet = state.wallet_mut(wallet_id)?;
        wallet.name = name.to_string();
        Ok(wallet.to_api())
    }

    async fn change_wallet_pass(
        &self,
        wallet_id: &str,
        old_password: Option<&str>,
        new_password: &str,
    ) -> GatewayResult<()> {
        self.take_fault(GatewayMethod::ChangeWalletPass)?;
        let mut state = self.state();
        let wallet = state.wallet_mut(wallet_id)?;
        check_password(wallet, old_password)?;
        wallet.password = Some(new_password.to_string()).filter(|p| !p.is_empty());
        wallet.password_changed_at = now_seconds();
        Ok(())
    }

    async fn delete_wallet(&self, wallet_id: &str) -> GatewayResult<()> {
        self.take_fault(GatewayMethod::DeleteWallet)?;
        let mut state = self.state();
        let before = state.wallets.len();
        state.wallets.retain(|w| w.id != wallet_id);
        if state.wallets.len() == before {
            return Err(not_found("Wallet", wallet_id));
        }
        Ok(())
    }

    async fn get_wallet_accounts(&self, wallet_id: &str) -> GatewayResult<Vec<ApiAccount>> {
        self.take_fault(GatewayMethod::GetWalletAccounts)?;
        let state = self.state();
        let wallet = state.wallet(wallet_id)?;
        Ok(wallet.accounts.iter().map(DemoAccount::to_api).collect())
    }

    async fn new_account(
        &self,
        wallet_id: &str,
        name: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiAccount> {
        self.take_fault(GatewayMethod::NewAccount)?;
        let mut state = self.state();
        let wallet = state.wallet_mut(wallet_id)?;
        check_password(wallet, password)?;
        let account = DemoAccount::new(wallet_id, name);
        let api = account.to_api();
        wallet.accounts.push(account);
        Ok(api)
    }

    async fn new_address(&self, account_id: &str, password: Option<&str>) -> GatewayResult<ApiAddress> {
        self.take_fault(GatewayMethod::NewAddress)?;
        let mut state = self.state();
        let (wi, ai) = state.locate_account(account_id)?;
        check_password(&state.wallets[wi], password)?;

        let address = DemoAddress {
            id: new_address_id(),
            lovelaces: 0,
            used: false,
        };
        let api = address.to_api();
        state.wallets[wi].accounts[ai].addresses.push(address);
        Ok(api)
    }

    async fn is_valid_address(&self, address: &str) -> GatewayResult<bool> {
        self.take_fault(GatewayMethod::IsValidAddress)?;
        Ok(address_format_ok(address))
    }

    async fn get_history_by_wallet(
        &self,
        wallet_id: &str,
        skip: u64,
        limit: u64,
    ) -> GatewayResult<(Vec<ApiTransaction>, u64)> {
        self.take_fault(GatewayMethod::GetHistoryByWallet)?;
        let state = self.state();
        let wallet = state.wallet(wallet_id)?;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let page = wallet.history.iter().skip(skip).take(limit).cloned().collect();
        Ok((page, wallet.history.len() as u64))
    }

    async fn new_payment(
        &self,
        sender_account_id: &str,
        receiver: &str,
        amount: u64,
        password: Option<&str>,
    ) -> GatewayResult<ApiTransaction> {
        self.take_fault(GatewayMethod::NewPayment)?;
        self.state().pay(sender_account_id, receiver, amount, password)
    }

    async fn redeem_ada(
        &self,
        redemption_code: &str,
        wallet_id: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiTransaction> {
        self.take_fault(GatewayMethod::RedeemAda)?;
        let code = redemption_code.trim();
        if !redemption_key_format_ok(code) {
            return Err(GatewayError::new("Invalid redemption key"));
        }

        let mut state = self.state();
        if state.redeemed.contains(code) {
            return Err(GatewayError::new("Redemption key already used"));
        }
        let lovelaces = *state
            .redemption_codes
            .get(code)
            .ok_or_else(|| GatewayError::new("Unknown redemption key"))?;

        let transaction = state.redeem(code, lovelaces, wallet_id, password)?;
        state.redemption_codes.remove(code);
        Ok(transaction)
    }

    async fn redeem_ada_paper_vend(
        &self,
        shielded_redemption_key: &str,
        mnemonics: &[String],
        wallet_id: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiTransaction> {
        self.take_fault(GatewayMethod::RedeemAdaPaperVend)?;
        let key = shielded_redemption_key.trim();
        if !paper_vend_key_format_ok(key) {
            return Err(GatewayError::new("Invalid paper vend redemption key"));
        }

        let mut state = self.state();
        if state.redeemed.contains(key) {
            return Err(GatewayError::new("Redemption key already used"));
        }
        let lovelaces = match state.paper_vend_codes.get(key) {
            Some(code) if code.mnemonics.as_slice() == mnemonics => code.lovelaces,
            Some(_) => return Err(GatewayError::new("Redemption mnemonic does not match key")),
            None => return Err(GatewayError::new("Unknown redemption key")),
        };

        let transaction = state.redeem(key, lovelaces, wallet_id, password)?;
        state.paper_vend_codes.remove(key);
        Ok(transaction)
    }

    async fn is_valid_redemption_key(&self, key: &str) -> GatewayResult<bool> {
        self.take_fault(GatewayMethod::IsValidRedemptionKey)?;
        Ok(redemption_key_format_ok(key))
    }

    async fn is_valid_paper_vend_redemption_key(&self, key: &str) -> GatewayResult<bool> {
        self.take_fault(GatewayMethod::IsValidPaperVendRedemptionKey)?;
        Ok(paper_vend_key_format_ok(key.trim()))
    }

    async fn generate_mnemonic(&self) -> GatewayResult<String> {
        self.take_fault(GatewayMethod::GenerateMnemonic)?;
        Ok(random_words(RECOVERY_WORDS).join(" "))
    }

    async fn is_valid_mnemonic(&self, word_count: usize, mnemonic: &str) -> GatewayResult<bool> {
        self.take_fault(GatewayMethod::IsValidMnemonic)?;
        let words: Vec<&str> = mnemonic.split_whitespace().collect();
        Ok(words.len() == word_count && words.iter().all(|w| WORDLIST.contains(w)))
    }

    async fn sync_progress(&self) -> GatewayResult<ApiSyncProgress> {
        self.take_fault(GatewayMethod::SyncProgress)?;
        Ok(self.state().sync)
    }

    async fn next_update(&self) -> GatewayResult<String> {
        self.take_fault(GatewayMethod::NextUpdate)?;
        match &self.state().pending_update {
            Some(update) => Ok(serde_json::to_string(update)?),
            None => Err(GatewayError::new("No updates available")),
        }
    }

    async fn apply_update(&self) -> GatewayResult<()> {
        self.take_fault(GatewayMethod::ApplyUpdate)?;
        match self.state().pending_update.take() {
            Some(_) => Ok(()),
            None => Err(GatewayError::new("No update to apply")),
        }
    }

    async fn test_reset(&self) -> GatewayResult<()> {
        self.take_fault(GatewayMethod::TestReset)?;
        *self.state() = DemoState::default();
        Ok(())
    }

    fn notify(&self, handler: Arc<dyn NotificationHandler>) {
        self.handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn funded_wallet(gateway: &DemoGateway, lovelaces: u64) -> (String, String) {
        let mnemonic = gateway.generate_mnemonic().await.unwrap();
        let wallet = gateway
            .new_wallet("w", AssurancePolicy::Normal, 0, &mnemonic, None)
            .await
            .unwrap();
        let account = gateway.new_account(&wallet.id, "w", None).await.unwrap();
        gateway.fund_account(&account.id, lovelaces).unwrap();
        (wallet.id, account.id)
    }

    #[tokio::test]
    async fn test_sample_data_balance() {
        let gateway = DemoGateway::with_sample_data();
        let wallets = gateway.get_wallets().await.unwrap();
        assert_eq!(wallets.len(), 1);
        assert_eq!(wallets[0].amount, ApiCoin::new(1_250_500_000));

        let (history, total) = gateway
            .get_history_by_wallet(&wallets[0].id, 0, 10)
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert!(history[0].is_outgoing);
    }

    #[tokio::test]
    async fn test_new_wallet_has_no_account() {
        let gateway = DemoGateway::new();
        let wallet = gateway
            .new_wallet("w", AssurancePolicy::Normal, 0, "some words", None)
            .await
            .unwrap();
        assert_eq!(wallet.accounts_number, 0);
        assert!(gateway.get_wallet_accounts(&wallet.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payment_between_local_wallets() {
        let gateway = DemoGateway::new();
        let (sender_wallet, sender_account) = funded_wallet(&gateway, 5_000_000).await;
        let (receiver_wallet, _) = funded_wallet(&gateway, 0).await;
        let receiver_address = gateway.get_wallet_accounts(&receiver_wallet).await.unwrap()[0]
            .addresses[0]
            .id
            .clone();

        let tx = gateway
            .new_payment(&sender_account, &receiver_address, 2_000_000, None)
            .await
            .unwrap();
        assert!(tx.is_outgoing);

        let wallets = gateway.get_wallets().await.unwrap();
        let balance = |id: &str| wallets.iter().find(|w| w.id == id).unwrap().amount.clone();
        assert_eq!(balance(&sender_wallet), ApiCoin::new(3_000_000));
        assert_eq!(balance(&receiver_wallet), ApiCoin::new(2_000_000));

        let (history, _) = gateway.get_history_by_wallet(&receiver_wallet, 0, 10).await.unwrap();
        assert_eq!(history[0].id, tx.id);
        assert!(!history[0].is_outgoing);
    }

    #[tokio::test]
    async fn test_overdraft_reports_node_text() {
        let gateway = DemoGateway::new();
        let (_, account) = funded_wallet(&gateway, 1_000).await;
        let err = gateway
            .new_payment(&account, &new_address_id(), 1_001, None)
            .await
            .unwrap_err();
        assert!(err.mentions(NOT_ENOUGH_MONEY));
    }

    #[tokio::test]
    async fn test_password_required_for_spending() {
        let gateway = DemoGateway::new();
        let wallet = gateway
            .new_wallet("w", AssurancePolicy::Normal, 0, "m", Some("secret"))
            .await
            .unwrap();
        assert!(wallet.has_passphrase);
        assert!(gateway.new_account(&wallet.id, "w", None).await.is_err());
        assert!(gateway.new_account(&wallet.id, "w", Some("secret")).await.is_ok());
    }

    #[tokio::test]
    async fn test_redemption_code_single_use() {
        let gateway = DemoGateway::new();
        let (wallet, _) = funded_wallet(&gateway, 0).await;
        let code = gateway.issue_redemption_code(7_000_000);
        assert!(gateway.is_valid_redemption_key(&code).await.unwrap());

        let tx = gateway.redeem_ada(&code, &wallet, None).await.unwrap();
        assert_eq!(tx.amount, ApiCoin::new(7_000_000));
        let err = gateway.redeem_ada(&code, &wallet, None).await.unwrap_err();
        assert!(err.mentions("already used"));
    }

    #[tokio::test]
    async fn test_paper_vend_requires_matching_mnemonic() {
        let gateway = DemoGateway::new();
        let (wallet, _) = funded_wallet(&gateway, 0).await;
        let (key, mnemonics) = gateway.issue_paper_vend_code(3_000_000);
        assert!(gateway.is_valid_paper_vend_redemption_key(&key).await.unwrap());

        let wrong = random_words(PAPER_VEND_WORDS);
        if wrong != mnemonics {
            assert!(gateway.redeem_ada_paper_vend(&key, &wrong, &wallet, None).await.is_err());
        }
        assert!(gateway.redeem_ada_paper_vend(&key, &mnemonics, &wallet, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_fault_injection_is_one_shot() {
        let gateway = DemoGateway::new();
        gateway.fail_next(GatewayMethod::GetWallets, "boom");
        assert_eq!(gateway.get_wallets().await.unwrap_err().message, "boom");
        assert!(gateway.get_wallets().await.is_ok());
    }

    #[tokio::test]
    async fn test_mnemonic_validation() {
        let gateway = DemoGateway::new();
        let phrase = gateway.generate_mnemonic().await.unwrap();
        assert!(gateway.is_valid_mnemonic(12, &phrase).await.unwrap());
        assert!(!gateway.is_valid_mnemonic(9, &phrase).await.unwrap());
        assert!(!gateway.is_valid_mnemonic(1, "zzzz").await.unwrap());
    }
}
