//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，便于 mock 测试

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gamification::{ActionKind, BadgeKind};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    BadgeAward, Comment, CommentWithAuthor, Hashtag, Image, Item, ItemSummary, LeaderboardEntry,
    NewImage, NewItem, PointRecord, User,
};

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn is_admin(&self, id: Uuid) -> Result<bool>;
}

/// 物品仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepositoryTrait: Send + Sync {
    /// 在同一事务中写入物品、图片和标签
    async fn create_item(&self, item: &NewItem, images: &[NewImage]) -> Result<Item>;
    async fn get_item(&self, id: Uuid) -> Result<Option<Item>>;
    async fn list_images(&self, item_id: Uuid) -> Result<Vec<Image>>;
    /// 过滤出仍被任意物品引用的存储路径
    async fn referenced_paths(&self, paths: &[String]) -> Result<Vec<String>>;
    /// 返回当前页和总数
    async fn list_feed(&self, offset: i64, limit: i64) -> Result<(Vec<ItemSummary>, i64)>;
    async fn list_by_poster(&self, user_id: Uuid) -> Result<Vec<ItemSummary>>;
    /// 仅当物品仍为 available 时更新，返回是否更新成功
    async fn mark_claimed(&self, item_id: Uuid, claimer: Uuid) -> Result<bool>;
    /// 删除物品并返回其图片，供清理对象存储
    async fn delete_item(&self, item_id: Uuid) -> Result<Vec<Image>>;
    async fn list_pending(&self) -> Result<Vec<ItemSummary>>;
    async fn approve(&self, item_id: Uuid) -> Result<bool>;
    async fn count_posts_by(&self, user_id: Uuid) -> Result<i64>;
    /// 该用户发布且已被认领的物品数
    async fn count_claims_helped(&self, user_id: Uuid) -> Result<i64>;
    async fn list_hashtags(&self, limit: i64) -> Result<Vec<Hashtag>>;
}

/// 评论仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepositoryTrait: Send + Sync {
    async fn create_comment(&self, item_id: Uuid, user_id: Uuid, text: &str) -> Result<Comment>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn list_by_item(&self, item_id: Uuid) -> Result<Vec<CommentWithAuthor>>;
}

/// 积分与徽章仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardRepositoryTrait: Send + Sync {
    /// 写入积分流水并累加用户总积分，返回新的总积分
    async fn record_points(
        &self,
        user_id: Uuid,
        action: ActionKind,
        amount: u32,
        reference_id: Option<Uuid>,
    ) -> Result<i64>;
    /// 同一 (action, reference_id) 只记一次，已记录时返回 None
    async fn record_points_once(
        &self,
        user_id: Uuid,
        action: ActionKind,
        amount: u32,
        reference_id: Uuid,
    ) -> Result<Option<i64>>;
    async fn list_points(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointRecord>>;
    async fn list_badges(&self, user_id: Uuid) -> Result<Vec<BadgeAward>>;
    /// 用户已持有该徽章时返回 None
    async fn award_badge(&self, user_id: Uuid, kind: BadgeKind) -> Result<Option<BadgeAward>>;
    /// `since` 之后该徽章已授予过任何人时返回 None
    async fn award_periodic_badge(
        &self,
        user_id: Uuid,
        kind: BadgeKind,
        since: DateTime<Utc>,
    ) -> Result<Option<BadgeAward>>;
    async fn badge_awarded_since(&self, kind: BadgeKind, since: DateTime<Utc>) -> Result<bool>;
    /// 按积分降序；`since` 为空时使用用户累计积分
    async fn leaderboard(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>>;
}
