//! 路由配置模块

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{handlers, middleware::auth_middleware, state::AppState};

/// 物品与评论路由
fn item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/items",
            get(handlers::item::list_items).post(handlers::item::create_item),
        )
        .route(
            "/items/{id}",
            get(handlers::item::get_item).delete(handlers::item::delete_item),
        )
        .route("/items/{id}/claim", post(handlers::item::claim_item))
        .route(
            "/items/{id}/comments",
            get(handlers::comment::list_comments).post(handlers::comment::create_comment),
        )
        .route(
            "/items/{id}/comments/{comment_id}/helpful",
            post(handlers::comment::mark_helpful),
        )
}

/// 用户、排行榜和积分目录路由
fn community_routes() -> Router<AppState> {
    Router::new()
        .route("/users/{id}", get(handlers::profile::get_profile))
        .route("/leaderboard", get(handlers::leaderboard::get_leaderboard))
        .route(
            "/gamification/actions",
            get(handlers::gamification::list_actions),
        )
        .route(
            "/gamification/badges",
            get(handlers::gamification::list_badges),
        )
        .route("/hashtags", get(handlers::gamification::list_hashtags))
}

/// 管理员路由
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/items/pending", get(handlers::admin::list_pending))
        .route(
            "/admin/items/{id}/approve",
            post(handlers::admin::approve_item),
        )
        .route(
            "/admin/campus-hero",
            post(handlers::admin::crown_campus_hero),
        )
}

/// 全部 API 路由（需在外层 nest 到 /api/v1）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(item_routes())
        .merge(community_routes())
        .merge(admin_routes())
}

/// 组装挂载了认证中间件的应用路由
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
