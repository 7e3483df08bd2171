//! JSON-RPC gateway to a wallet node
//!
//! Requests go over HTTP as JSON-RPC 2.0 with positional params; the push
//! channel is a websocket carrying one text frame per notification.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

use crate::domain::AssurancePolicy;
use crate::ports::wire::{ApiAccount, ApiAddress, ApiSyncProgress, ApiTransaction, ApiWallet};
use crate::ports::{
    GatewayError, GatewayMethod, GatewayResult, NotificationHandler, WalletGateway,
    CONNECTION_CLOSED,
};

/// JSON-RPC request ID counter
static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        GatewayError::new(format!("Node request failed: {}", error))
    }
}

/// Wallet node reached over JSON-RPC
///
/// The HTTP client has no request timeout; a slow node keeps the caller
/// waiting.
pub struct JsonRpcGateway {
    client: reqwest::Client,
    rpc_url: Url,
    notify_url: Url,
}

impl JsonRpcGateway {
    pub fn new(rpc_url: &str, notify_url: &str) -> Result<Self> {
        let rpc_url = Url::parse(rpc_url).with_context(|| format!("Invalid node URL: {}", rpc_url))?;
        if !matches!(rpc_url.scheme(), "http" | "https") {
            return Err(anyhow!("Node URL must be http(s), got {}", rpc_url.scheme()));
        }

        let notify_url = Url::parse(notify_url)
            .with_context(|| format!("Invalid notify URL: {}", notify_url))?;
        if !matches!(notify_url.scheme(), "ws" | "wss") {
            return Err(anyhow!("Notify URL must be ws(s), got {}", notify_url.scheme()));
        }

        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            rpc_url,
            notify_url,
        })
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    pub fn notify_url(&self) -> &Url {
        &self.notify_url
    }

    async fn call_raw(&self, method: GatewayMethod, params: Value) -> GatewayResult<Value> {
        let id = REQUEST_ID.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: method.as_str(),
            params,
            id,
        };
        debug!(method = method.as_str(), id, "RPC request");

        let response = self
            .client
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::new(format!("HTTP error: {}", response.status())));
        }

        let body: JsonRpcResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(GatewayError {
                code: error.code,
                message: error.message,
            });
        }

        Ok(body.result.unwrap_or(Value::Null))
    }

    async fn call<T: DeserializeOwned>(&self, method: GatewayMethod, params: Value) -> GatewayResult<T> {
        let result = self.call_raw(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn call_unit(&self, method: GatewayMethod, params: Value) -> GatewayResult<()> {
        self.call_raw(method, params).await.map(|_| ())
    }
}

async fn listen(url: Url, handler: Arc<dyn NotificationHandler>) {
    let mut socket = match connect_async(url.as_str()).await {
        Ok((socket, _)) => socket,
        Err(e) => {
            handler.on_error(&GatewayError::new(format!("Push channel connect failed: {}", e)));
            return;
        }
    };
    debug!(url = %url, "Push channel connected");

    while let Some(frame) = socket.next().await {
        match frame {
            Ok(Message::Text(text)) => handler.on_message(&text),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                handler.on_error(&GatewayError::new(format!("Push channel error: {}", e)));
                return;
            }
        }
    }

    debug!(url = %url, "Push channel closed");
    handler.on_message(CONNECTION_CLOSED);
}

#[async_trait]
impl WalletGateway for JsonRpcGateway {
    async fn get_wallets(&self) -> GatewayResult<Vec<ApiWallet>> {
        self.call(GatewayMethod::GetWallets, json!([])).await
    }

    async fn new_wallet(
        &self,
        name: &str,
        assurance: AssurancePolicy,
        unit: u32,
        mnemonic: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiWallet> {
        self.call(
            GatewayMethod::NewWallet,
            json!([name, assurance.as_str(), unit, mnemonic, password]),
        )
        .await
    }

    async fn restore_wallet(
        &self,
        name: &str,
        assurance: AssurancePolicy,
        unit: u32,
        mnemonic: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiWallet> {
        self.call(
            GatewayMethod::RestoreWallet,
            json!([name, assurance.as_str(), unit, mnemonic, password]),
        )
        .await
    }

    async fn import_wallet(&self, file_path: &Path, password: &str) -> GatewayResult<ApiWallet> {
        self.call(
            GatewayMethod::ImportWallet,
            json!([file_path.to_string_lossy(), password]),
        )
        .await
    }

    async fn update_wallet(
        &self,
        wallet_id: &str,
        name: &str,
        assurance: AssurancePolicy,
        unit: u32,
    ) -> GatewayResult<ApiWallet> {
        self.call(
            GatewayMethod::UpdateWallet,
            json!([wallet_id, name, assurance.as_str(), unit]),
        )
        .await
    }

    async fn rename_wallet(&self, wallet_id: &str, name: &str) -> GatewayResult<ApiWallet> {
        self.call(GatewayMethod::RenameWallet, json!([wallet_id, name])).await
    }

    async fn change_wallet_pass(
        &self,
        wallet_id: &str,
        old_password: Option<&str>,
        new_password: &str,
    ) -> GatewayResult<()> {
        self.call_unit(
            GatewayMethod::ChangeWalletPass,
            json!([wallet_id, old_password, new_password]),
        )
        .await
    }

    async fn delete_wallet(&self, wallet_id: &str) -> GatewayResult<()> {
        self.call_unit(GatewayMethod::DeleteWallet, json!([wallet_id])).await
    }

    async fn get_wallet_accounts(&self, wallet_id: &str) -> GatewayResult<Vec<ApiAccount>> {
        self.call(GatewayMethod::GetWalletAccounts, json!([wallet_id])).await
    }

    async fn new_account(
        &self,
        wallet_id: &str,
        name: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiAccount> {
        self.call(GatewayMethod::NewAccount, json!([wallet_id, name, password]))
            .await
    }

    async fn new_address(&self, account_id: &str, password: Option<&str>) -> GatewayResult<ApiAddress> {
        self.call(GatewayMethod::NewAddress, json!([account_id, password]))
            .await
    }

    async fn is_valid_address(&self, address: &str) -> GatewayResult<bool> {
        self.call(GatewayMethod::IsValidAddress, json!([address])).await
    }

    async fn get_history_by_wallet(
        &self,
        wallet_id: &str,
        skip: u64,
        limit: u64,
    ) -> GatewayResult<(Vec<ApiTransaction>, u64)> {
        self.call(
            GatewayMethod::GetHistoryByWallet,
            json!([wallet_id, skip, limit]),
        )
        .await
    }

    async fn new_payment(
        &self,
        sender_account_id: &str,
        receiver: &str,
        amount: u64,
        password: Option<&str>,
    ) -> GatewayResult<ApiTransaction> {
        self.call(
            GatewayMethod::NewPayment,
            json!([sender_account_id, receiver, amount.to_string(), password]),
        )
        .await
    }

    async fn redeem_ada(
        &self,
        redemption_code: &str,
        wallet_id: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiTransaction> {
        self.call(
            GatewayMethod::RedeemAda,
            json!([redemption_code, wallet_id, password]),
        )
        .await
    }

    async fn redeem_ada_paper_vend(
        &self,
        shielded_redemption_key: &str,
        mnemonics: &[String],
        wallet_id: &str,
        password: Option<&str>,
    ) -> GatewayResult<ApiTransaction> {
        self.call(
            GatewayMethod::RedeemAdaPaperVend,
            json!([shielded_redemption_key, mnemonics, wallet_id, password]),
        )
        .await
    }

    async fn is_valid_redemption_key(&self, key: &str) -> GatewayResult<bool> {
        self.call(GatewayMethod::IsValidRedemptionKey, json!([key])).await
    }

    async fn is_valid_paper_vend_redemption_key(&self, key: &str) -> GatewayResult<bool> {
        self.call(GatewayMethod::IsValidPaperVendRedemptionKey, json!([key]))
            .await
    }

    async fn generate_mnemonic(&self) -> GatewayResult<String> {
        self.call(GatewayMethod::GenerateMnemonic, json!([])).await
    }

    async fn is_valid_mnemonic(&self, word_count: usize, mnemonic: &str) -> GatewayResult<bool> {
        self.call(GatewayMethod::IsValidMnemonic, json!([word_count, mnemonic]))
            .await
    }

    async fn sync_progress(&self) -> GatewayResult<ApiSyncProgress> {
        self.call(GatewayMethod::SyncProgress, json!([])).await
    }

    async fn next_update(&self) -> GatewayResult<String> {
        // The descriptor may come back as JSON text or as a JSON object
        match self.call_raw(GatewayMethod::NextUpdate, json!([])).await? {
            Value::String(raw) => Ok(raw),
            Value::Null => Err(GatewayError::new("No update available")),
            other => Ok(other.to_string()),
        }
    }

    async fn apply_update(&self) -> GatewayResult<()> {
        self.call_unit(GatewayMethod::ApplyUpdate, json!([])).await
    }

    async fn test_reset(&self) -> GatewayResult<()> {
        self.call_unit(GatewayMethod::TestReset, json!([])).await
    }

    fn notify(&self, handler: Arc<dyn NotificationHandler>) {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(listen(self.notify_url.clone(), handler));
            }
            Err(_) => warn!("No async runtime; push channel not started"),
        }
    }
}
