//! Preference store port - small JSON values under named keys

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// Key/value store for user preferences (locale, terms of use)
///
/// Each key holds one small JSON document and is created, overwritten and
/// removed independently.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read a key; `None` when it was never set or has been removed
    async fn get(&self, key: &str) -> Result<Option<JsonValue>>;

    /// Create or overwrite a key
    async fn set(&self, key: &str, value: JsonValue) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}
