//! 物品 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    dto::{ApiResponse, FeedQuery},
    error::ServiceError,
    middleware::CurrentUser,
    service::dto::{ClaimResult, CreateItemRequest, FeedPage, ItemDetail, PostItemResult},
    state::AppState,
};

/// 信息流
///
/// GET /api/v1/items?page=1&pageSize=12
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<ApiResponse<FeedPage>>, ServiceError> {
    let page = state.queries.feed(query.page, query.page_size).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// 发布物品
///
/// POST /api/v1/items
pub async fn create_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostItemResult>>), ServiceError> {
    let result = state.items.post_item(user_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(result, "发布成功")),
    ))
}

/// 物品详情
///
/// GET /api/v1/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ItemDetail>>, ServiceError> {
    let detail = state.queries.item_detail(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// 删除物品（发布者或管理员）
///
/// DELETE /api/v1/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.items.delete_item(user_id, id).await?;
    Ok(Json(ApiResponse::success_empty()))
}

/// 认领物品
///
/// POST /api/v1/items/{id}/claim
pub async fn claim_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ClaimResult>>, ServiceError> {
    let result = state.items.claim_item(user_id, id).await?;
    Ok(Json(ApiResponse::success_with_message(result, "认领成功")))
}
