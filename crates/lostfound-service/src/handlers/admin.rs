//! 管理员 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::ApiResponse,
    error::ServiceError,
    middleware::CurrentUser,
    models::LeaderboardEntry,
    service::dto::FeedItem,
    state::AppState,
};

/// 待审核物品
///
/// GET /api/v1/admin/items/pending
pub async fn list_pending(
    State(state): State<AppState>,
    CurrentUser(admin_id): CurrentUser,
) -> Result<Json<ApiResponse<Vec<FeedItem>>>, ServiceError> {
    let items = state.items.list_pending(admin_id).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// 审核通过
///
/// POST /api/v1/admin/items/{id}/approve
pub async fn approve_item(
    State(state): State<AppState>,
    CurrentUser(admin_id): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.items.approve_item(admin_id, item_id).await?;
    Ok(Json(ApiResponse::success_empty()))
}

/// 立即评选上周 Campus Hero
///
/// POST /api/v1/admin/campus-hero
pub async fn crown_campus_hero(
    State(state): State<AppState>,
    CurrentUser(admin_id): CurrentUser,
) -> Result<Json<ApiResponse<Option<LeaderboardEntry>>>, ServiceError> {
    state.items.require_admin(admin_id).await?;

    let hero = state.rewards.crown_weekly_hero(Utc::now()).await?;
    info!(admin_id = %admin_id, crowned = hero.is_some(), "手动触发 Campus Hero 评选");

    Ok(Json(ApiResponse::success(hero)))
}
