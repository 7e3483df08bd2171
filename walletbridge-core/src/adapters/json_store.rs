//! File-backed preference store
//!
//! One pretty-printed `<key>.json` file per key inside a directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::ports::PreferenceStore;

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create preferences directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            bail!("Invalid preference key: {:?}", key);
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl PreferenceStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        let path = self.path_for(key)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Malformed preference file {}", path.display()))?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<()> {
        let path = self.path_for(key)?;
        let content = serde_json::to_string_pretty(&value)?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(key, "Preference saved");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip_and_missing_key() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(&temp.path().join("preferences")).unwrap();

        assert_eq!(store.get("userLocale").await.unwrap(), None);
        store.set("userLocale", json!({ "locale": "de-DE" })).await.unwrap();
        assert_eq!(
            store.get("userLocale").await.unwrap(),
            Some(json!({ "locale": "de-DE" }))
        );
        assert!(temp.path().join("preferences/userLocale.json").exists());

        store.remove("userLocale").await.unwrap();
        store.remove("userLocale").await.unwrap();
        assert_eq!(store.get("userLocale").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path()).unwrap();
        assert!(store.get("../settings").await.is_err());
        assert!(store.set("", json!(1)).await.is_err());
        assert!(store.remove("a/b").await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path()).unwrap();
        std::fs::write(temp.path().join("termsOfUseAcceptance.json"), "{oops").unwrap();
        assert!(store.get("termsOfUseAcceptance").await.is_err());
    }
}
