//! Preference service - locale and terms-of-use acceptance

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::result::Result;
use crate::ports::PreferenceStore;
use crate::services::classify::{store_failure, Operation};

pub const USER_LOCALE_KEY: &str = "userLocale";
pub const TERMS_OF_USE_KEY: &str = "termsOfUseAcceptance";

pub struct PreferenceService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceService {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Stored locale, or "" when none was saved
    pub async fn get_user_locale(&self) -> Result<String> {
        debug!("getUserLocale called");
        let record = self
            .store
            .get(USER_LOCALE_KEY)
            .await
            .map_err(|e| store_failure(Operation::GetUserLocale, &e))?;

        let locale = record
            .as_ref()
            .and_then(|r| r.get("locale"))
            .and_then(|l| l.as_str())
            .unwrap_or_default()
            .to_string();
        debug!(locale = %locale, "getUserLocale success");
        Ok(locale)
    }

    pub async fn set_user_locale(&self, locale: &str) -> Result<String> {
        debug!(locale, "setUserLocale called");
        self.store
            .set(USER_LOCALE_KEY, json!({ "locale": locale }))
            .await
            .map_err(|e| store_failure(Operation::SetUserLocale, &e))?;
        Ok(locale.to_string())
    }

    /// Whether the terms of use were accepted; false when never recorded
    pub async fn get_terms_of_use_acceptance(&self) -> Result<bool> {
        debug!("getTermsOfUseAcceptance called");
        let record = self
            .store
            .get(TERMS_OF_USE_KEY)
            .await
            .map_err(|e| store_failure(Operation::GetTermsOfUseAcceptance, &e))?;

        Ok(record
            .as_ref()
            .and_then(|r| r.get("accepted"))
            .and_then(|a| a.as_bool())
            .unwrap_or(false))
    }

    pub async fn set_terms_of_use_acceptance(&self) -> Result<()> {
        debug!("setTermsOfUseAcceptance called");
        self.store
            .set(TERMS_OF_USE_KEY, json!({ "accepted": true }))
            .await
            .map_err(|e| store_failure(Operation::SetTermsOfUseAcceptance, &e))
    }

    /// Remove both preference records
    pub async fn clear(&self) -> Result<()> {
        for key in [USER_LOCALE_KEY, TERMS_OF_USE_KEY] {
            self.store
                .remove(key)
                .await
                .map_err(|e| store_failure(Operation::ClearPreferences, &e))?;
        }
        Ok(())
    }
}
