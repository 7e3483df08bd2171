//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - JSON-RPC over HTTP plus a websocket push channel for the wallet node
//! - An in-memory node for demo mode and tests
//! - JSON files (or memory) for preferences
//! - A watch channel for the host restart signal

pub mod demo;
pub mod host;
pub mod json_store;
pub mod jsonrpc;
pub mod memory;
