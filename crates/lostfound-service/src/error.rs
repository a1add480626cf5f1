//! 服务错误类型定义
//!
//! 业务错误映射为 4xx，系统错误统一为 500 并隐藏细节

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lostfound_shared::error::InfraError;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源不存在
    #[error("用户不存在: {0}")]
    UserNotFound(Uuid),
    #[error("物品不存在: {0}")]
    ItemNotFound(Uuid),
    #[error("评论不存在: {0}")]
    CommentNotFound(Uuid),

    // 业务错误
    #[error("物品当前不可认领: {0}")]
    ItemNotAvailable(Uuid),
    #[error("不能认领自己发布的物品")]
    SelfClaim,
    #[error("不能将自己的评论标记为有帮助")]
    SelfHelpful,
    #[error("该评论已被标记为有帮助")]
    AlreadyMarkedHelpful,

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("基础设施错误: {0}")]
    Infra(#[from] InfraError),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ServiceError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            Self::Validation(_) | Self::SelfClaim | Self::SelfHelpful => StatusCode::BAD_REQUEST,

            Self::UserNotFound(_) | Self::ItemNotFound(_) | Self::CommentNotFound(_) => {
                StatusCode::NOT_FOUND
            }

            Self::ItemNotAvailable(_) | Self::AlreadyMarkedHelpful => StatusCode::CONFLICT,

            Self::Database(_) | Self::Infra(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::CommentNotFound(_) => "COMMENT_NOT_FOUND",
            Self::ItemNotAvailable(_) => "ITEM_NOT_AVAILABLE",
            Self::SelfClaim => "SELF_CLAIM",
            Self::SelfHelpful => "SELF_HELPFUL",
            Self::AlreadyMarkedHelpful => "ALREADY_MARKED_HELPFUL",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Infra(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(_) => true,
            Self::Infra(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Infra(e) => {
                tracing::error!(error = %e, "基础设施调用失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
