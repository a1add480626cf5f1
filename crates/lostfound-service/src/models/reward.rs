//! 积分与徽章记录

use chrono::{DateTime, Utc};
use gamification::{ActionKind, BadgeKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 积分流水
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PointRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i32,
    pub reason: ActionKind,
    /// 关联对象（物品或评论）
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// 徽章授予记录
///
/// 同一用户可多次获得同一徽章（如 Campus Hero 按周评选）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BadgeAward {
    pub id: Uuid,
    pub user_id: Uuid,
    pub badge_type: BadgeKind,
    pub awarded_at: DateTime<Utc>,
}

/// 排行榜条目
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 名次由服务层按顺序填充
    #[sqlx(default)]
    pub rank: i64,
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub points: i64,
}
