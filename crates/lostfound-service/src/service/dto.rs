//! 服务层数据传输对象

use chrono::{DateTime, Utc};
use gamification::{ActionKind, BadgeKind};
use lostfound_shared::storage::ObjectStorage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Result, ServiceError};
use crate::models::{
    BadgeAward, CommentWithAuthor, Image, Item, ItemSummary, LeaderboardEntry, LeaderboardPeriod,
    MAX_IMAGE_BYTES, NewImage, PointRecord, User, is_owned_path,
};

/// 单张物品允许的最多图片数
pub const MAX_IMAGES_PER_ITEM: usize = 3;

/// 发布物品请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 100, message = "标题长度必须在1-100个字符之间"))]
    pub title: String,
    #[validate(length(max = 1000, message = "描述不能超过1000个字符"))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100, message = "地点长度必须在1-100个字符之间"))]
    pub location_tag: String,
    /// 原始标签输入，如 "#backpack, blue"
    #[serde(default)]
    pub hashtags: String,
    #[validate(length(min = 1, max = 3, message = "需要上传1-3张图片"), nested)]
    pub images: Vec<NewImage>,
}

impl CreateItemRequest {
    /// 去除文本字段首尾空白，长度校验针对清洗后的内容
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            location_tag: self.location_tag.trim().to_string(),
            ..self
        }
    }

    /// 图片总大小不超过 1.5MB，且都位于发布者自己的上传目录
    pub fn check_images(&self, owner: Uuid) -> Result<()> {
        let total: i64 = self.images.iter().map(|i| i64::from(i.size_bytes)).sum();
        if total > i64::from(MAX_IMAGE_BYTES) {
            return Err(ServiceError::Validation(
                "图片总大小不能超过 1.5MB".to_string(),
            ));
        }

        if let Some(image) = self
            .images
            .iter()
            .find(|i| !is_owned_path(&i.storage_path, owner))
        {
            return Err(ServiceError::Validation(format!(
                "图片路径无效: {}",
                image.storage_path
            )));
        }

        Ok(())
    }
}

/// 积分发放结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardOutcome {
    pub action: ActionKind,
    pub points_awarded: u32,
    pub total_points: i64,
    pub new_badges: Vec<BadgeKind>,
}

/// 徽章展示信息
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeView {
    pub kind: BadgeKind,
    pub name: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awarded_at: Option<DateTime<Utc>>,
}

impl BadgeView {
    pub fn of(kind: BadgeKind) -> Self {
        let info = gamification::badge_metadata(kind);
        Self {
            kind,
            name: info.name,
            description: info.description,
            emoji: info.emoji,
            awarded_at: None,
        }
    }
}

impl From<&BadgeAward> for BadgeView {
    fn from(award: &BadgeAward) -> Self {
        Self {
            awarded_at: Some(award.awarded_at),
            ..Self::of(award.badge_type)
        }
    }
}

/// 行为积分表条目
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPoints {
    pub action: ActionKind,
    pub points: u32,
}

/// 积分与徽章目录
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub actions: Vec<ActionPoints>,
    pub badges: Vec<BadgeView>,
}

/// 发布物品结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostItemResult {
    pub item: Item,
    /// 积分发放失败时为空，物品仍已发布
    pub reward: Option<RewardOutcome>,
}

/// 认领结果，积分发给帮助认领的发布者
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResult {
    pub item_id: Uuid,
    pub claimed_by: Uuid,
    pub poster_reward: Option<RewardOutcome>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResult {
    pub comment: CommentWithAuthor,
    pub reward: Option<RewardOutcome>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpfulResult {
    pub comment_id: Uuid,
    pub commenter_reward: RewardOutcome,
}

/// 图片（附公开地址）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    pub id: Uuid,
    pub url: String,
    pub width: i32,
    pub height: i32,
    pub order_num: i32,
}

impl ImageView {
    pub fn new(image: &Image, url: String) -> Self {
        Self {
            id: image.id,
            url,
            width: image.width,
            height: image.height,
            order_num: image.order_num,
        }
    }
}

/// 用户公开信息
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBrief {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<User> for UserBrief {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
        }
    }
}

/// 物品详情
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub poster: Option<UserBrief>,
    pub claimer: Option<UserBrief>,
    pub images: Vec<ImageView>,
    pub comments: Vec<CommentWithAuthor>,
}

/// 信息流条目（封面已转为公开地址）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(flatten)]
    pub summary: ItemSummary,
    pub cover_url: Option<String>,
}

impl FeedItem {
    pub fn new(summary: ItemSummary, storage: &dyn ObjectStorage) -> Self {
        let cover_url = summary
            .cover_image
            .as_deref()
            .map(|path| storage.public_url(path));
        Self { summary, cover_url }
    }
}

/// 信息流分页
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub has_more: bool,
}

/// 个人主页
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: User,
    pub badges: Vec<BadgeView>,
    pub items: Vec<FeedItem>,
    pub total_posts: i64,
    pub claims_helped: i64,
    pub recent_points: Vec<PointRecord>,
}

/// 排行榜
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub period: LeaderboardPeriod,
    pub since: Option<DateTime<Utc>>,
    pub entries: Vec<LeaderboardEntry>,
}
