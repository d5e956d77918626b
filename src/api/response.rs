use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Outbound invocation result: status, headers and a JSON-encoded body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ProxyResponse {
    /// JSON response carrying the standard content-type and CORS headers
    pub fn json(status_code: u16, body: &Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());

        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    /// Decode the body back into JSON
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

impl From<ApiError> for ProxyResponse {
    fn from(err: ApiError) -> Self {
        ProxyResponse::json(err.status_code(), &err.to_json())
    }
}

/// Successful handler result before encoding
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self {
            data,
            status_code: Some(StatusCode::CREATED),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status_code.unwrap_or(StatusCode::OK)
    }

    pub fn into_proxy_response(self) -> Result<ProxyResponse, ApiError> {
        let status = self.status();
        let body = serde_json::to_value(&self.data).map_err(|e| {
            tracing::error!("Failed to serialize response data: {}", e);
            ApiError::internal_server_error(format!("Failed to serialize response data: {}", e))
        })?;
        Ok(ProxyResponse::json(status.as_u16(), &body))
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

// Lets the local HTTP server return handler results directly
impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!("Dropping invalid response header '{}'", name),
            }
        }

        response
    }
}
