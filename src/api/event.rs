use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inbound invocation event in the API Gateway proxy shape.
///
/// Only the fields the note handlers read are modelled; anything else in the
/// event is ignored. Gateways send `null` for absent sections, hence the
/// `Option`s throughout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub authorizer: Option<Authorizer>,
}

/// Claims attached by the upstream authorizer, trusted as-is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authorizer {
    #[serde(default)]
    pub claims: Option<Map<String, Value>>,
}

impl ProxyRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticated caller: the authorizer's `sub` claim, if a non-empty string
    pub fn user_id(&self) -> Option<&str> {
        self.request_context
            .as_ref()?
            .authorizer
            .as_ref()?
            .claims
            .as_ref()?
            .get("sub")?
            .as_str()
            .filter(|sub| !sub.is_empty())
    }

    /// Non-empty path parameter by name
    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()?
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Parse the body as JSON; an absent or empty body reads as `{}`
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self.body.as_deref() {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw),
            _ => serde_json::from_str("{}"),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.http_method = Some(method.into());
        self.path = Some(path.into());
        self
    }

    /// Attach an authorizer `sub` claim
    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        let context = self.request_context.get_or_insert_with(RequestContext::default);
        let authorizer = context.authorizer.get_or_insert_with(Authorizer::default);
        authorizer
            .claims
            .get_or_insert_with(Map::new)
            .insert("sub".to_string(), Value::String(sub.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_path_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }
}
