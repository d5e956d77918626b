//! Credential resolution for the notes database.
//!
//! A [`SecretStore`] returns the raw secret string for an identifier; the
//! [`CredentialResolver`] turns that into typed [`Credentials`]. Every failure
//! surfaces as a [`SecretError`], nothing here retries.

pub mod env;
pub mod extension;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub use env::EnvSecretStore;
pub use extension::ExtensionSecretStore;

/// Errors from secret retrieval
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret unavailable: {0} is not set")]
    NotConfigured(&'static str),

    #[error("Secret unavailable: lookup of '{secret_id}' failed: {reason}")]
    Unavailable { secret_id: String, reason: String },

    #[error("Secret unavailable: malformed credentials: {0}")]
    Malformed(String),
}

/// Lookup of a secret's string value by identifier
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn secret_string(&self, secret_id: &str) -> Result<String, SecretError>;
}

/// Database connection credentials as stored in the secret
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub host: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    #[serde(default, alias = "database")]
    pub dbname: Option<String>,
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Database to connect to; Postgres falls back to the user name when unset
    pub fn database(&self) -> &str {
        self.dbname
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(self.username.as_str())
    }

    fn validate(self) -> Result<Self, SecretError> {
        if self.host.trim().is_empty() {
            return Err(SecretError::Malformed("host is empty".to_string()));
        }
        if self.username.trim().is_empty() {
            return Err(SecretError::Malformed("username is empty".to_string()));
        }
        Ok(self)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Resolves database credentials from a secret store
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn SecretStore>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Fetch and parse credentials for `secret_id`. One store lookup per call.
    pub async fn resolve(&self, secret_id: Option<&str>) -> Result<Credentials, SecretError> {
        let secret_id = secret_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(SecretError::NotConfigured("DB_SECRET_ARN"))?;

        let raw = self.store.secret_string(secret_id).await?;
        let credentials: Credentials =
            serde_json::from_str(&raw).map_err(|e| SecretError::Malformed(e.to_string()))?;

        credentials.validate()
    }
}
