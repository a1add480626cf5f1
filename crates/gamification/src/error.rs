//! 枚举解析错误
//!
//! 查表本身不会失败，只有把外部字符串（数据库列、URL 参数）解析为枚举时才可能出错。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseKindError {
    #[error("未知的行为类型: {0}")]
    UnknownAction(String),

    #[error("未知的徽章类型: {0}")]
    UnknownBadge(String),
}
