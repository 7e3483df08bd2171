//! Service layer - business logic orchestration
//!
//! Each service calls the gateway, normalizes successful responses and
//! classifies failures. `normalize`, `classify` and `notify` hold the pure
//! pieces the services share.

mod address;
pub mod classify;
mod node;
pub mod normalize;
pub mod notify;
mod preferences;
mod redemption;
mod transaction;
mod wallet;

pub use address::AddressService;
pub use classify::Operation;
pub use node::{NodeService, WALLET_MNEMONIC_WORDS};
pub use normalize::TitlePolicy;
pub use notify::{NotificationBridge, PushMessage, CONNECTION_CLOSED};
pub use preferences::{PreferenceService, TERMS_OF_USE_KEY, USER_LOCALE_KEY};
pub use redemption::{
    RedeemAdaRequest, RedeemPaperVendedAdaRequest, RedemptionService, REDEMPTION_MNEMONIC_WORDS,
};
pub use transaction::{CreateTransactionRequest, TransactionService};
pub use wallet::{
    ChangeWalletPasswordRequest, CreateWalletRequest, RestoreWalletRequest, SetupStage,
    UpdateWalletRequest, WalletService,
};
