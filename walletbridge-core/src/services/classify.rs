//! Error classifier - free-text node failures to the typed taxonomy
//!
//! The node reports failures as unstructured text. The substrings below are
//! an exact external contract with the node and are matched case-sensitively.

use std::fmt;

use tracing::error;

use crate::domain::result::Error;
use crate::ports::GatewayError;

/// Node text for a restore/import of a recovery phrase already in use
pub const WALLET_ALREADY_EXISTS: &str = "Wallet with that mnemonics already exists";

/// Node text for a payment exceeding the sender's balance
pub const NOT_ENOUGH_MONEY: &str = "Not enough money to send";

/// Facade operations, as seen by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetWallets,
    CreateWallet,
    RestoreWallet,
    ImportWalletFromKey,
    UpdateWallet,
    RenameWallet,
    ChangeWalletPassword,
    SetWalletPassword,
    DeleteWallet,
    CreateAccount,
    GetAddresses,
    CreateAddress,
    GetTransactions,
    CreateTransaction,
    RedeemAda,
    RedeemPaperVendedAda,
    GenerateMnemonic,
    GetSyncProgress,
    ApplyUpdate,
    TestReset,
    GetUserLocale,
    SetUserLocale,
    GetTermsOfUseAcceptance,
    SetTermsOfUseAcceptance,
    ClearPreferences,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GetWallets => "getWallets",
            Operation::CreateWallet => "createWallet",
            Operation::RestoreWallet => "restoreWallet",
            Operation::ImportWalletFromKey => "importWalletFromKey",
            Operation::UpdateWallet => "updateWallet",
            Operation::RenameWallet => "renameWallet",
            Operation::ChangeWalletPassword => "changeWalletPassword",
            Operation::SetWalletPassword => "setWalletPassword",
            Operation::DeleteWallet => "deleteWallet",
            Operation::CreateAccount => "createAccount",
            Operation::GetAddresses => "getAddresses",
            Operation::CreateAddress => "createAddress",
            Operation::GetTransactions => "getTransactions",
            Operation::CreateTransaction => "createTransaction",
            Operation::RedeemAda => "redeemAda",
            Operation::RedeemPaperVendedAda => "redeemPaperVendedAda",
            Operation::GenerateMnemonic => "generateMnemonic",
            Operation::GetSyncProgress => "getSyncProgress",
            Operation::ApplyUpdate => "applyUpdate",
            Operation::TestReset => "testReset",
            Operation::GetUserLocale => "getUserLocale",
            Operation::SetUserLocale => "setUserLocale",
            Operation::GetTermsOfUseAcceptance => "getTermsOfUseAcceptance",
            Operation::SetTermsOfUseAcceptance => "setTermsOfUseAcceptance",
            Operation::ClearPreferences => "clearPreferences",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a failure of `operation` to a typed error by its node text
pub fn classify(operation: Operation, err: &GatewayError) -> Error {
    match operation {
        Operation::RestoreWallet if err.mentions(WALLET_ALREADY_EXISTS) => {
            Error::WalletAlreadyRestored
        }
        Operation::ImportWalletFromKey if err.mentions(WALLET_ALREADY_EXISTS) => {
            Error::WalletAlreadyRestored
        }
        Operation::ImportWalletFromKey => Error::WalletKeyImport,
        Operation::CreateTransaction if err.mentions(NOT_ENOUGH_MONEY) => {
            Error::NotEnoughMoneyToSend
        }
        Operation::RedeemAda | Operation::RedeemPaperVendedAda => Error::RedeemAda,
        _ => Error::Generic,
    }
}

/// Log a gateway failure and classify it
pub fn fail(operation: Operation, err: &GatewayError) -> Error {
    error!(operation = %operation, code = ?err.code, "{}", err.message);
    classify(operation, err)
}

/// Log a preference store failure; these are always generic
pub fn store_failure(operation: Operation, err: &anyhow::Error) -> Error {
    error!(operation = %operation, "Preference store failed: {:#}", err);
    Error::Generic
}
