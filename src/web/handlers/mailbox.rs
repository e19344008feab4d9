//! Mailbox, message and draft handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::mail::MessageContent;
use crate::web::dto::{
    ApiResponse, FolderChangeResponse, MailboxResponse, MessageDetailResponse, MessageRequest,
    MessageResponse, PurgeResponse, SendResponse, UnreadCountResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// GET /api/mailbox - All four folders.
pub async fn get_mailbox(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<MailboxResponse>>, ApiError> {
    let view = state.mail().mailbox(user.account_id()).await?;
    Ok(Json(ApiResponse::new(view.into())))
}

/// GET /api/mailbox/unread-count - Unread inbox messages.
pub async fn get_unread_count(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, ApiError> {
    let count = state.mail().unread_count(user.account_id()).await?;
    Ok(Json(ApiResponse::new(UnreadCountResponse { count })))
}

/// POST /api/messages - Send a message.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<MessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SendResponse>>), ApiError> {
    let content = MessageContent::from(req);
    let outcome = state.mail().send(user.account_id(), &content).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(SendResponse {
            sent: outcome.sent.into(),
            reply: outcome.reply.into(),
        })),
    ))
}

/// GET /api/messages/:id - One message of the caller's mailbox.
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageDetailResponse>>, ApiError> {
    let (message, folder) = state.mail().get_message(user.account_id(), id).await?;

    Ok(Json(ApiResponse::new(MessageDetailResponse {
        message: message.into(),
        folder,
    })))
}

/// DELETE /api/messages/:id - Permanently delete from trash or drafts.
pub async fn purge_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PurgeResponse>>, ApiError> {
    let mail = state.mail();
    let purged_from = mail.purge(user.account_id(), id).await?;
    let view = mail.mailbox(user.account_id()).await?;

    Ok(Json(ApiResponse::new(PurgeResponse {
        mailbox: view.into(),
        purged_from,
    })))
}

/// PUT /api/messages/:id/trash - Move to trash.
pub async fn trash_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FolderChangeResponse>>, ApiError> {
    let change = state.mail().move_to_trash(user.account_id(), id).await?;
    Ok(Json(ApiResponse::new(change.into())))
}

/// PUT /api/messages/:id/restore - Move out of trash.
pub async fn restore_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FolderChangeResponse>>, ApiError> {
    let change = state
        .mail()
        .restore_from_trash(user.account_id(), id)
        .await?;
    Ok(Json(ApiResponse::new(change.into())))
}

/// PUT /api/messages/:id/flags/:command - `read`, `unread`, `favorite` or `unfavorite`.
pub async fn toggle_flag(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((id, command)): Path<(i64, String)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let message = state
        .mail()
        .toggle(user.account_id(), id, &command)
        .await?;
    Ok(Json(ApiResponse::new(message.into())))
}

/// POST /api/drafts - Save a new draft.
pub async fn save_draft(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<MessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), ApiError> {
    let content = MessageContent::from(req);
    let draft = state.mail().save_draft(user.account_id(), &content).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(draft.into()))))
}

/// PUT /api/drafts/:id - Replace a draft's content.
pub async fn update_draft(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<MessageRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let content = MessageContent::from(req);
    let draft = state
        .mail()
        .update_draft(user.account_id(), id, &content)
        .await?;

    Ok(Json(ApiResponse::new(draft.into())))
}
