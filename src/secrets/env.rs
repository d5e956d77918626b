use async_trait::async_trait;

use super::{SecretError, SecretStore};

/// Secret store that reads the secret JSON from an environment variable.
/// Intended for local development where no secret service is reachable.
pub struct EnvSecretStore {
    var: String,
}

impl EnvSecretStore {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn secret_string(&self, secret_id: &str) -> Result<String, SecretError> {
        std::env::var(&self.var).map_err(|e| SecretError::Unavailable {
            secret_id: secret_id.to_string(),
            reason: format!("{}: {}", self.var, e),
        })
    }
}
