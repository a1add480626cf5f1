//! 行为类型与积分表
//!
//! 每种可获得积分的用户行为绑定一个固定的非负积分值。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseKindError;

/// 可获得积分的用户行为
///
/// 数据库 `points.reason` 列和 JSON 中均以 `NEW_POST` 形式存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// 发布失物
    NewPost,
    /// 失物被认领（奖励发布者）
    ClaimVerified,
    /// 发表评论
    Comment,
    /// 评论被发布者标记为有帮助
    HelpfulComment,
}

impl ActionKind {
    /// 全部行为，按积分表顺序
    pub const ALL: [ActionKind; 4] = [
        Self::NewPost,
        Self::ClaimVerified,
        Self::Comment,
        Self::HelpfulComment,
    ];

    /// 该行为对应的积分
    pub const fn points(self) -> u32 {
        match self {
            Self::NewPost => 10,
            Self::ClaimVerified => 20,
            Self::Comment => 2,
            Self::HelpfulComment => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewPost => "NEW_POST",
            Self::ClaimVerified => "CLAIM_VERIFIED",
            Self::Comment => "COMMENT",
            Self::HelpfulComment => "HELPFUL_COMMENT",
        }
    }
}

/// 计算某个行为应发放的积分
pub const fn points_for(action: ActionKind) -> u32 {
    action.points()
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseKindError::UnknownAction(s.to_string()))
    }
}
