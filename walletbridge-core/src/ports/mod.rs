//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators: the wallet node,
//! the preference store and the host process. Services depend only on these
//! traits, never on concrete adapters.

mod gateway;
mod host;
mod preferences;
pub mod wire;

pub use gateway::{
    GatewayError, GatewayMethod, GatewayResult, NotificationHandler, WalletGateway,
    CONNECTION_CLOSED,
};
pub use host::HostProcess;
pub use preferences::PreferenceStore;
