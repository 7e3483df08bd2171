//! Core domain entities
//!
//! Immutable value objects produced by the response normalizer. Every
//! backend call builds fresh instances; nothing here performs I/O.

mod address;
mod node;
mod transaction;
mod wallet;
pub mod result;

pub use address::{AccountAddresses, WalletAddress};
pub use node::{BlockVersion, PendingUpdate, SyncProgress};
pub use transaction::{TransactionAddresses, TransactionPage, TransactionType, WalletTransaction};
pub use wallet::{AssurancePolicy, Wallet};

/// Minor units (lovelaces) per displayed unit (ADA)
pub const LOVELACES_PER_ADA: u64 = 1_000_000;
