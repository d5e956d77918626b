use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{SecretError, SecretStore};

const TOKEN_HEADER: &str = "X-Aws-Parameters-Secrets-Token";

/// Secret store backed by the Parameters and Secrets extension on localhost.
///
/// The extension caches Secrets Manager values inside the execution
/// environment; requests authenticate with the function's session token.
pub struct ExtensionSecretStore {
    client: reqwest::Client,
    base_url: String,
    session_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetSecretValueReply {
    #[serde(rename = "SecretString")]
    secret_string: Option<String>,
}

impl ExtensionSecretStore {
    pub fn new(port: u16, timeout: Duration) -> Result<Self, SecretError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SecretError::Unavailable {
                secret_id: String::new(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: format!("http://localhost:{}", port),
            session_token: std::env::var("AWS_SESSION_TOKEN").ok(),
        })
    }

    fn url(&self) -> String {
        format!("{}/secretsmanager/get", self.base_url)
    }
}

#[async_trait]
impl SecretStore for ExtensionSecretStore {
    async fn secret_string(&self, secret_id: &str) -> Result<String, SecretError> {
        let unavailable = |reason: String| SecretError::Unavailable {
            secret_id: secret_id.to_string(),
            reason,
        };

        let mut request = self.client.get(self.url()).query(&[("secretId", secret_id)]);
        if let Some(token) = &self.session_token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await.map_err(|e| unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(format!("status {}: {}", status, body.trim())));
        }

        let reply: GetSecretValueReply = response
            .json()
            .await
            .map_err(|e| SecretError::Malformed(e.to_string()))?;

        reply
            .secret_string
            .ok_or_else(|| SecretError::Malformed("secret has no SecretString".to_string()))
    }
}
