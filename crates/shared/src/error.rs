//! 基础设施错误
//!
//! 数据库、对象存储、配置加载等基础设施层的错误类型。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("对象存储请求失败: {0}")]
    StorageRequest(#[from] reqwest::Error),

    #[error("对象存储返回错误: status={status}, body={body}")]
    StorageRejected { status: u16, body: String },

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("内部错误: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, InfraError>;

impl InfraError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::StorageRequest(_) | Self::StorageRejected { .. } => "STORAGE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(_) | Self::StorageRequest(_) => true,
            Self::StorageRejected { status, .. } => *status >= 500,
            Self::Config(_) | Self::Internal(_) => false,
        }
    }
}
