// handlers/list_notes.rs - GET /notes

use serde::Serialize;

use crate::api::{ApiResponse, ApiResult, ProxyRequest, ProxyResponse};
use crate::database::Note;
use crate::error::ApiError;

use super::HandlerContext;

#[derive(Debug, Serialize)]
pub struct ListNotesResponse {
    pub notes: Vec<Note>,
    pub count: usize,
}

/// List the caller's notes, most recently updated first
pub async fn list_notes(ctx: &HandlerContext, event: &ProxyRequest) -> ProxyResponse {
    ctx.log_event("list_notes", event);
    let result = list(ctx, event).await;
    ctx.finish("list_notes", result)
}

async fn list(ctx: &HandlerContext, event: &ProxyRequest) -> ApiResult<ListNotesResponse> {
    let user_id = event.user_id().ok_or_else(ApiError::unauthorized)?;

    let notes = ctx.store().list(user_id).await?;
    let count = notes.len();

    Ok(ApiResponse::success(ListNotesResponse { notes, count }))
}
