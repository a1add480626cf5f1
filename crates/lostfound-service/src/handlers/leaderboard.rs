//! 排行榜 API 处理器

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

use crate::{
    dto::{ApiResponse, LeaderboardQuery},
    error::ServiceError,
    service::dto::Leaderboard,
    state::AppState,
};

/// 排行榜，默认周榜前 10
///
/// GET /api/v1/leaderboard?period=weekly&limit=10
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<ApiResponse<Leaderboard>>, ServiceError> {
    let board = state
        .queries
        .leaderboard(query.period, query.limit, Utc::now())
        .await?;
    Ok(Json(ApiResponse::success(board)))
}
