//! In-memory preference store

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::ports::PreferenceStore;

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, JsonValue>>,
    fault: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, JsonValue>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make the next store operation fail with `message`
    pub fn fail_next(&self, message: &str) {
        *self.fault.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(message.to_string());
    }

    fn take_fault(&self) -> Result<()> {
        match self.fault.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).take() {
            Some(message) => Err(anyhow!(message)),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        self.take_fault()?;
        Ok(self.values().get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<()> {
        self.take_fault()?;
        self.values().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.take_fault()?;
        self.values().remove(key);
        Ok(())
    }
}
