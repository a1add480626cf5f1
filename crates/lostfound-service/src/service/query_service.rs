//! 查询服务
//!
//! 信息流、物品详情、个人主页、排行榜和积分目录等只读接口

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gamification::{ActionKind, BadgeKind, points_for};
use lostfound_shared::storage::ObjectStorage;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::models::{CommentWithAuthor, Hashtag, LeaderboardPeriod};
use crate::repository::{
    CommentRepositoryTrait, ItemRepositoryTrait, RewardRepositoryTrait, UserRepositoryTrait,
};
use crate::service::dto::{
    ActionPoints, BadgeView, Catalog, FeedItem, FeedPage, ImageView, ItemDetail, Leaderboard,
    Profile, UserBrief,
};

pub const DEFAULT_PAGE_SIZE: i64 = 12;
pub const MAX_PAGE_SIZE: i64 = 50;
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;
const RECENT_POINTS_LIMIT: i64 = 20;
const HASHTAG_LIMIT: i64 = 100;

pub struct QueryService {
    items: Arc<dyn ItemRepositoryTrait>,
    comments: Arc<dyn CommentRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    rewards: Arc<dyn RewardRepositoryTrait>,
    storage: Arc<dyn ObjectStorage>,
    default_leaderboard_limit: i64,
}

impl QueryService {
    pub fn new(
        items: Arc<dyn ItemRepositoryTrait>,
        comments: Arc<dyn CommentRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        rewards: Arc<dyn RewardRepositoryTrait>,
        storage: Arc<dyn ObjectStorage>,
        default_leaderboard_limit: i64,
    ) -> Self {
        Self {
            items,
            comments,
            users,
            rewards,
            storage,
            default_leaderboard_limit,
        }
    }

    /// 信息流，按发布时间倒序分页
    ///
    /// `page` 从 1 开始，`page_size` 默认 12，最大 50
    #[instrument(skip(self))]
    pub async fn feed(&self, page: Option<i64>, page_size: Option<i64>) -> Result<FeedPage> {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| ServiceError::Validation("页码超出范围".to_string()))?;

        let (summaries, total) = self.items.list_feed(offset, page_size).await?;
        let has_more = offset.saturating_add(summaries.len() as i64) < total;

        Ok(FeedPage {
            items: summaries
                .into_iter()
                .map(|summary| FeedItem::new(summary, self.storage.as_ref()))
                .collect(),
            total,
            page,
            page_size,
            has_more,
        })
    }

    /// 物品详情，包括发布者、认领者、图片和评论
    #[instrument(skip(self))]
    pub async fn item_detail(&self, item_id: Uuid) -> Result<ItemDetail> {
        let item = self
            .items
            .get_item(item_id)
            .await?
            .ok_or(ServiceError::ItemNotFound(item_id))?;

        let poster = self.users.get_user(item.posted_by).await?.map(UserBrief::from);
        let claimer = match item.claimed_by {
            Some(id) => self.users.get_user(id).await?.map(UserBrief::from),
            None => None,
        };

        let images = self
            .items
            .list_images(item_id)
            .await?
            .iter()
            .map(|image| ImageView::new(image, self.storage.public_url(&image.storage_path)))
            .collect();
        let comments = self.comments.list_by_item(item_id).await?;

        Ok(ItemDetail {
            item,
            poster,
            claimer,
            images,
            comments,
        })
    }

    pub async fn comments(&self, item_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        if self.items.get_item(item_id).await?.is_none() {
            return Err(ServiceError::ItemNotFound(item_id));
        }
        self.comments.list_by_item(item_id).await
    }

    /// 个人主页
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> Result<Profile> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;

        let badges = self
            .rewards
            .list_badges(user_id)
            .await?
            .iter()
            .map(BadgeView::from)
            .collect();
        let items = self
            .items
            .list_by_poster(user_id)
            .await?
            .into_iter()
            .map(|summary| FeedItem::new(summary, self.storage.as_ref()))
            .collect();

        Ok(Profile {
            user,
            badges,
            items,
            total_posts: self.items.count_posts_by(user_id).await?,
            claims_helped: self.items.count_claims_helped(user_id).await?,
            recent_points: self.rewards.list_points(user_id, RECENT_POINTS_LIMIT).await?,
        })
    }

    /// 排行榜，名次从 1 开始
    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        period: Option<LeaderboardPeriod>,
        limit: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Leaderboard> {
        let period = period.unwrap_or_default();
        let limit = limit
            .unwrap_or(self.default_leaderboard_limit)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        let since = period.window_start(now);

        let mut entries = self.rewards.leaderboard(since, None, limit).await?;
        for (index, entry) in entries.iter_mut().enumerate() {
            entry.rank = index as i64 + 1;
        }

        Ok(Leaderboard {
            period,
            since,
            entries,
        })
    }

    pub async fn hashtags(&self) -> Result<Vec<Hashtag>> {
        self.items.list_hashtags(HASHTAG_LIMIT).await
    }

    /// 行为积分表与徽章目录
    pub fn catalog(&self) -> Catalog {
        catalog()
    }
}

pub fn catalog() -> Catalog {
    Catalog {
        actions: ActionKind::ALL
            .iter()
            .map(|&action| ActionPoints {
                action,
                points: points_for(action),
            })
            .collect(),
        badges: BadgeKind::ALL.iter().map(|&kind| BadgeView::of(kind)).collect(),
    }
}
