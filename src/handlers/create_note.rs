// handlers/create_note.rs - POST /notes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiResponse, ApiResult, ProxyRequest, ProxyResponse};
use crate::database::Note;
use crate::error::ApiError;

use super::HandlerContext;

/// Create body. Fields stay loosely typed: scalars are stored as text and
/// falsy values (`null`, `false`, `0`, `""`) count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub content: Option<Value>,
}

impl CreateNoteRequest {
    /// Read the body; non-object JSON carries no fields, `null` is unreadable
    pub fn from_event(event: &ProxyRequest) -> Result<Self, ApiError> {
        let body: Value = event
            .json_body()
            .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

        match body {
            Value::Null => Err(ApiError::internal_server_error(
                "Cannot destructure request body: body is null",
            )),
            Value::Object(_) => {
                serde_json::from_value(body).map_err(|e| ApiError::internal_server_error(e.to_string()))
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn title(&self) -> Option<String> {
        self.title.as_ref().and_then(text_value)
    }

    pub fn content(&self) -> String {
        self.content.as_ref().and_then(text_value).unwrap_or_default()
    }
}

/// Text form of a JSON value, or `None` when the value is falsy
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Serialize)]
pub struct CreateNoteResponse {
    pub note: Note,
}

/// Create a note owned by the caller.
///
/// `title` is required; `content` defaults to `""`.
/// Answers 201 with `{ "note": { id, title, content, created_at, updated_at } }`.
pub async fn create_note(ctx: &HandlerContext, event: &ProxyRequest) -> ProxyResponse {
    ctx.log_event("create_note", event);
    let result = create(ctx, event).await;
    ctx.finish("create_note", result)
}

async fn create(ctx: &HandlerContext, event: &ProxyRequest) -> ApiResult<CreateNoteResponse> {
    let user_id = event.user_id().ok_or_else(ApiError::unauthorized)?;

    let request = CreateNoteRequest::from_event(event)?;
    let title = request
        .title()
        .ok_or_else(|| ApiError::bad_request("Title is required"))?;
    let content = request.content();

    let note = ctx.store().create(user_id, &title, &content).await?;
    tracing::info!("Created note {} for user {}", note.id, user_id);

    Ok(ApiResponse::created(CreateNoteResponse { note }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values_are_absent() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert_eq!(text_value(&value), None, "{}", value);
        }
    }

    #[test]
    fn scalars_become_text() {
        assert_eq!(text_value(&json!("T")).as_deref(), Some("T"));
        assert_eq!(text_value(&json!(5)).as_deref(), Some("5"));
        assert_eq!(text_value(&json!(1.5)).as_deref(), Some("1.5"));
        assert_eq!(text_value(&json!(true)).as_deref(), Some("true"));
        assert_eq!(text_value(&json!({"a":1})).as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn non_object_body_has_no_fields() {
        let request = CreateNoteRequest::from_event(&ProxyRequest::new().with_body("[1,2]")).unwrap();
        assert_eq!(request.title(), None);
        assert_eq!(request.content(), "");
    }

    #[test]
    fn null_body_is_unreadable() {
        let err = CreateNoteRequest::from_event(&ProxyRequest::new().with_body("null")).unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
