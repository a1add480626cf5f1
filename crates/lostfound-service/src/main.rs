//! 校园失物招领服务
//!
//! 提供物品发布、认领、评论、积分排行等 REST API，并在后台按周评选 Campus Hero。

use std::sync::Arc;

use axum::{
    Json,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use lostfound::{
    auth::JwtManager,
    repository::{CommentRepository, ItemRepository, RewardRepository, UserRepository},
    routes,
    service::{ItemService, QueryService, RewardService},
    state::AppState,
    worker::CampusHeroWorker,
};
use lostfound_shared::{
    config::AppConfig,
    database::Database,
    observability::{self, middleware as obs_middleware},
    storage::{ObjectStorage, StorageClient},
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "lostfound-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;
    let _guard = observability::init(&config.observability).await?;

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    if config.is_production() && config.auth.jwt_secret == AppConfig::default().auth.jwt_secret {
        anyhow::bail!("生产环境必须通过 LOSTFOUND_AUTH__JWT_SECRET 配置 JWT 密钥");
    }

    let db = Database::connect(&config.database).await?;
    let storage: Arc<dyn ObjectStorage> = Arc::new(StorageClient::new(&config.storage)?);

    let users = Arc::new(UserRepository::new(db.pool().clone()));
    let items = Arc::new(ItemRepository::new(db.pool().clone()));
    let comments = Arc::new(CommentRepository::new(db.pool().clone()));
    let reward_repo = Arc::new(RewardRepository::new(db.pool().clone()));

    let rewards = Arc::new(RewardService::new(reward_repo.clone(), items.clone()));
    let item_service = Arc::new(ItemService::new(
        items.clone(),
        comments.clone(),
        users.clone(),
        rewards.clone(),
        storage.clone(),
    ));
    let query_service = Arc::new(QueryService::new(
        items,
        comments,
        users,
        reward_repo,
        storage,
        config.gamification.leaderboard_limit,
    ));
    let jwt = Arc::new(JwtManager::new(&config.auth));

    let state = AppState::new(item_service, query_service, rewards.clone(), jwt);

    if config.gamification.campus_hero_enabled {
        let worker = CampusHeroWorker::new(rewards, &config.gamification.campus_hero_cron)?;
        tokio::spawn(async move {
            worker.run().await;
        });
    } else {
        info!("Campus Hero 定时评选已关闭");
    }

    let app = routes::app(state)
        .route("/health", get(health_check))
        .route(
            "/ready",
            get({
                let db_for_ready = db.clone();
                move || readiness_check(db_for_ready.clone())
            }),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer(&config))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 按配置构建 CORS，`*` 放开全部来源
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let allowed_origins = config.server.cors_origins.trim();

    if allowed_origins == "*" {
        if config.is_production() {
            warn!("cors_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("0"));
    response
}

/// 监听 Ctrl+C 与 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// 就绪探针：检查数据库往返耗时和连接池占用
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let database = match db.ping().await {
        Ok(status) => serde_json::json!({ "status": "ok", "pool": status }),
        Err(e) => {
            warn!(error = %e, "数据库就绪检查失败");
            serde_json::json!({ "status": "fail" })
        }
    };
    let ready = database["status"] == "ok";

    Json(serde_json::json!({
        "status": if ready { "ok" } else { "degraded" },
        "service": SERVICE_NAME,
        "checks": {
            "database": database
        }
    }))
}
