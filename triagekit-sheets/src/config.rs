use std::fmt;

use secrecy::SecretString;

use crate::client::SheetsHttpClient;
use crate::{SheetsError, SheetsTableStore};

pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Default, Clone)]
pub struct SheetsStoreBuilder {
    base_url: Option<String>,
    access_token: Option<String>,
}

impl fmt::Debug for SheetsStoreBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access_token = if self.access_token.is_some() {
            "<redacted>"
        } else {
            "<none>"
        };

        f.debug_struct("SheetsStoreBuilder")
            .field("base_url", &self.base_url)
            .field("access_token", &access_token)
            .finish()
    }
}

impl SheetsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.base_url = Some(value.into());
        self
    }

    pub fn access_token(mut self, value: impl Into<String>) -> Self {
        self.access_token = Some(value.into());
        self
    }

    pub fn base_url_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            self.base_url = Some(value);
        }
        self
    }

    pub fn access_token_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            self.access_token = Some(value);
        }
        self
    }

    pub fn build(self) -> Result<SheetsTableStore, SheetsError> {
        let access_token = self
            .access_token
            .ok_or_else(|| SheetsError::Config("access_token is required".to_string()))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| SHEETS_BASE_URL.to_string());

        let client = SheetsHttpClient::new(&base_url, SecretString::new(access_token))?;
        Ok(SheetsTableStore::new(client))
    }
}
