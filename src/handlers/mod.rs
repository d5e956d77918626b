// handlers/mod.rs - note handlers and the context they share
//
// Each handler takes a `ProxyRequest`, checks the caller's identity before
// touching storage, runs one scoped statement through the `NoteStore`, and
// always answers with a `ProxyResponse`. Failures never escape a handler.

pub mod create_note;
pub mod delete_note;
pub mod list_notes;

pub use create_note::{create_note, CreateNoteRequest, CreateNoteResponse};
pub use delete_note::{delete_note, DeleteNoteResponse};
pub use list_notes::{list_notes, ListNotesResponse};

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::api::{ApiResult, ProxyRequest, ProxyResponse};
use crate::config::{AppConfig, SecretSource};
use crate::database::{NoteStore, PgNoteStore, PgPoolBuilder, PoolManager};
use crate::error::ApiError;
use crate::secrets::{CredentialResolver, EnvSecretStore, ExtensionSecretStore, SecretError, SecretStore};

/// Dependencies shared by every handler invocation in a process
#[derive(Clone)]
pub struct HandlerContext {
    store: Arc<dyn NoteStore>,
    expose_error_details: bool,
    log_events: bool,
}

impl HandlerContext {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            store,
            expose_error_details: true,
            log_events: false,
        }
    }

    /// Wire the Postgres store, pool manager and secret store from configuration.
    /// Nothing is fetched or connected until the first handler needs the pool.
    pub fn from_config(config: &AppConfig) -> Result<Self, SecretError> {
        let secrets: Arc<dyn SecretStore> = match config.secrets.source {
            SecretSource::Extension => Arc::new(ExtensionSecretStore::new(
                config.secrets.extension_port,
                Duration::from_millis(config.secrets.extension_timeout_ms),
            )?),
            SecretSource::Env => Arc::new(EnvSecretStore::new(config.secrets.env_var.clone())),
        };

        let pools = PoolManager::new(
            CredentialResolver::new(secrets),
            config.secrets.secret_id.clone(),
            PgPoolBuilder::from_config(&config.database),
        );

        Ok(Self::new(Arc::new(PgNoteStore::new(Arc::new(pools))))
            .with_error_details(config.api.expose_error_details)
            .with_event_logging(config.api.log_events))
    }

    /// Whether 500 responses carry the underlying error text
    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }

    pub fn with_event_logging(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }

    pub fn store(&self) -> &dyn NoteStore {
        self.store.as_ref()
    }

    fn log_event(&self, operation: &str, event: &ProxyRequest) {
        if self.log_events {
            tracing::debug!("{} event: {:?}", operation, event);
        }
    }

    fn finish<T: Serialize>(&self, operation: &str, result: ApiResult<T>) -> ProxyResponse {
        match result.and_then(|response| response.into_proxy_response()) {
            Ok(response) => response,
            Err(err) => self.error_response(operation, err),
        }
    }

    fn error_response(&self, operation: &str, err: ApiError) -> ProxyResponse {
        match &err {
            ApiError::InternalServerError(detail) => {
                tracing::error!("{} failed: {}", operation, detail);
            }
            other => tracing::debug!("{} rejected: {}", operation, other),
        }

        if self.expose_error_details {
            err.into()
        } else {
            err.redacted().into()
        }
    }
}
