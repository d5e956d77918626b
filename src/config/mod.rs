use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub secrets: SecretsConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Where database credentials come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecretSource {
    /// Parameters and Secrets extension listening on localhost
    Extension,
    /// Secret JSON stored directly in an environment variable (local development)
    Env,
}

impl SecretSource {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "extension" => Some(SecretSource::Extension),
            "env" => Some(SecretSource::Env),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Identifier of the secret holding database credentials (DB_SECRET_ARN)
    pub secret_id: Option<String>,
    pub source: SecretSource,
    pub extension_port: u16,
    pub extension_timeout_ms: u64,
    pub env_var: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub idle_timeout_secs: u64,
    pub connect_timeout_ms: u64,
    pub require_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub expose_error_details: bool,
    pub log_events: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Secrets
        if let Ok(v) = env::var("DB_SECRET_ARN") {
            let v = v.trim();
            self.secrets.secret_id = (!v.is_empty()).then(|| v.to_string());
        }
        if let Ok(v) = env::var("SECRET_SOURCE") {
            self.secrets.source = SecretSource::parse(&v).unwrap_or(self.secrets.source);
        }
        if let Ok(v) = env::var("PARAMETERS_SECRETS_EXTENSION_HTTP_PORT") {
            self.secrets.extension_port = v.parse().unwrap_or(self.secrets.extension_port);
        }
        if let Ok(v) = env::var("SECRET_EXTENSION_TIMEOUT_MS") {
            self.secrets.extension_timeout_ms = v.parse().unwrap_or(self.secrets.extension_timeout_ms);
        }
        if let Ok(v) = env::var("DB_SECRET_ENV_VAR") {
            self.secrets.env_var = v;
        }

        // Database
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_IDLE_TIMEOUT_SECS") {
            self.database.idle_timeout_secs = v.parse().unwrap_or(self.database.idle_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_MS") {
            self.database.connect_timeout_ms = v.parse().unwrap_or(self.database.connect_timeout_ms);
        }
        if let Ok(v) = env::var("DATABASE_REQUIRE_TLS") {
            self.database.require_tls = v.parse().unwrap_or(self.database.require_tls);
        }

        // API
        if let Some(port) = env::var("NOTES_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_EXPOSE_ERROR_DETAILS") {
            self.api.expose_error_details = v.parse().unwrap_or(self.api.expose_error_details);
        }
        if let Ok(v) = env::var("API_LOG_EVENTS") {
            self.api.log_events = v.parse().unwrap_or(self.api.log_events);
        }

        // Security
        if let Ok(v) = env::var("LOCAL_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self
    }

    fn secrets_defaults() -> SecretsConfig {
        SecretsConfig {
            secret_id: None,
            source: SecretSource::Extension,
            extension_port: 2773,
            extension_timeout_ms: 3000,
            env_var: "DB_SECRET_JSON".to_string(),
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            secrets: SecretsConfig {
                source: SecretSource::Env,
                ..Self::secrets_defaults()
            },
            database: DatabaseConfig {
                max_connections: 2,
                idle_timeout_secs: 30,
                connect_timeout_ms: 2000,
                require_tls: false,
            },
            api: ApiConfig {
                port: 3000,
                expose_error_details: true,
                log_events: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            secrets: Self::secrets_defaults(),
            database: DatabaseConfig {
                max_connections: 2,
                idle_timeout_secs: 30,
                connect_timeout_ms: 2000,
                require_tls: true,
            },
            api: ApiConfig {
                port: 3000,
                expose_error_details: true,
                log_events: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            secrets: Self::secrets_defaults(),
            database: DatabaseConfig {
                max_connections: 2,
                idle_timeout_secs: 30,
                connect_timeout_ms: 2000,
                require_tls: true,
            },
            api: ApiConfig {
                port: 3000,
                expose_error_details: false,
                log_events: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
