//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-facing failure of a wallet operation
///
/// Every backend failure is classified into exactly one of these before it
/// reaches the caller. The raw backend text is logged, never carried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Generic API error")]
    Generic,

    #[error("Wallet already restored")]
    WalletAlreadyRestored,

    #[error("Not enough money to send")]
    NotEnoughMoneyToSend,

    #[error("Ada redemption failed")]
    RedeemAda,

    #[error("Wallet key import failed")]
    WalletKeyImport,

    /// The wallet exists on the node but its first account could not be
    /// created. State is known: resume with `WalletService::create_account`.
    #[error("Wallet {wallet_id} was created but its account is still pending")]
    AccountPending { wallet_id: String },
}

/// Stable error kind a presentation layer maps to localized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Generic,
    WalletAlreadyRestored,
    NotEnoughMoney,
    Redemption,
    KeyImport,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Generic | Error::AccountPending { .. } => ErrorKind::Generic,
            Error::WalletAlreadyRestored => ErrorKind::WalletAlreadyRestored,
            Error::NotEnoughMoneyToSend => ErrorKind::NotEnoughMoney,
            Error::RedeemAda => ErrorKind::Redemption,
            Error::WalletKeyImport => ErrorKind::KeyImport,
        }
    }

    /// Wallet id left behind by a half-finished create/restore, if any
    pub fn pending_wallet_id(&self) -> Option<&str> {
        match self {
            Error::AccountPending { wallet_id } => Some(wallet_id),
            _ => None,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for FFI serialization)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorKind>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: &Error) -> Self {
        let context = error.pending_wallet_id().map(|id| {
            let mut context = HashMap::new();
            context.insert("walletId".to_string(), serde_json::Value::from(id));
            context
        });

        Self {
            success: false,
            data: None,
            error: Some(error.kind()),
            context,
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(&e),
        }
    }
}
