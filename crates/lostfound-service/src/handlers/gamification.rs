//! 积分与徽章目录 API 处理器

use axum::{Json, extract::State};

use crate::{
    dto::ApiResponse,
    error::ServiceError,
    models::Hashtag,
    service::dto::{ActionPoints, BadgeView},
    state::AppState,
};

/// 行为积分表
///
/// GET /api/v1/gamification/actions
pub async fn list_actions(State(state): State<AppState>) -> Json<ApiResponse<Vec<ActionPoints>>> {
    Json(ApiResponse::success(state.queries.catalog().actions))
}

/// 徽章目录
///
/// GET /api/v1/gamification/badges
pub async fn list_badges(State(state): State<AppState>) -> Json<ApiResponse<Vec<BadgeView>>> {
    Json(ApiResponse::success(state.queries.catalog().badges))
}

/// 已使用的标签
///
/// GET /api/v1/hashtags
pub async fn list_hashtags(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Hashtag>>>, ServiceError> {
    let tags = state.queries.hashtags().await?;
    Ok(Json(ApiResponse::success(tags)))
}
