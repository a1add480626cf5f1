//! 个人主页 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    dto::ApiResponse, error::ServiceError, service::dto::Profile, state::AppState,
};

/// GET /api/v1/users/{id}
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Profile>>, ServiceError> {
    let profile = state.queries.profile(user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}
