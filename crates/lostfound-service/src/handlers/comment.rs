//! 评论 API 处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{ApiResponse, CreateCommentRequest},
    error::ServiceError,
    middleware::CurrentUser,
    models::CommentWithAuthor,
    service::dto::{CommentResult, HelpfulResult},
    state::AppState,
};

/// 评论列表（按时间正序）
///
/// GET /api/v1/items/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CommentWithAuthor>>>, ServiceError> {
    let comments = state.queries.comments(item_id).await?;
    Ok(Json(ApiResponse::success(comments)))
}

/// 发表评论
///
/// POST /api/v1/items/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResult>>), ServiceError> {
    req.validate()?;

    let result = state.items.add_comment(user_id, item_id, &req.text).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(result))))
}

/// 发布者标记评论为有帮助
///
/// POST /api/v1/items/{id}/comments/{comment_id}/helpful
pub async fn mark_helpful(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((item_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<HelpfulResult>>, ServiceError> {
    let result = state
        .items
        .mark_helpful(user_id, item_id, comment_id)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}
