// handlers/delete_note.rs - DELETE /notes/:id

use serde::Serialize;
use uuid::Uuid;

use crate::api::{ApiResponse, ApiResult, ProxyRequest, ProxyResponse};
use crate::error::ApiError;

use super::HandlerContext;

#[derive(Debug, Serialize)]
pub struct DeleteNoteResponse {
    pub message: &'static str,
    pub id: Uuid,
}

/// Delete one of the caller's notes.
///
/// The delete matches on both note id and owner, so another user's note is
/// indistinguishable from a missing one: both answer 404.
pub async fn delete_note(ctx: &HandlerContext, event: &ProxyRequest) -> ProxyResponse {
    ctx.log_event("delete_note", event);
    let result = delete(ctx, event).await;
    ctx.finish("delete_note", result)
}

async fn delete(ctx: &HandlerContext, event: &ProxyRequest) -> ApiResult<DeleteNoteResponse> {
    let user_id = event.user_id().ok_or_else(ApiError::unauthorized)?;

    let raw_id = event
        .path_parameter("id")
        .ok_or_else(|| ApiError::bad_request("Note ID is required"))?;

    // A malformed id cannot name any stored note
    let Ok(note_id) = Uuid::parse_str(raw_id) else {
        tracing::debug!("Rejecting delete of malformed note id '{}'", raw_id);
        return Err(ApiError::not_found("Note not found"));
    };

    let id = ctx
        .store()
        .delete(user_id, note_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;

    tracing::info!("Deleted note {} for user {}", id, user_id);

    Ok(ApiResponse::success(DeleteNoteResponse {
        message: "Note deleted successfully",
        id,
    }))
}
