//! 物品流转服务
//!
//! 处理发布、认领、评论、标记有帮助、删除和审核。
//! 每个成功的行为都通过 [`RewardService`] 发放对应积分：
//!
//! - 发布物品 -> 发布者 NEW_POST
//! - 认领物品 -> 发布者 CLAIM_VERIFIED（帮助失主找回）
//! - 发表评论 -> 评论者 COMMENT
//! - 评论被发布者标记为有帮助 -> 评论者 HELPFUL_COMMENT（每条评论一次）

use std::sync::Arc;

use gamification::ActionKind;
use lostfound_shared::observability::metrics;
use lostfound_shared::storage::ObjectStorage;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Result, ServiceError};
use crate::models::{
    CommentWithAuthor, Item, ItemStatus, NewItem, User, is_owned_path, parse_hashtags,
};
use crate::repository::{CommentRepositoryTrait, ItemRepositoryTrait, UserRepositoryTrait};
use crate::service::RewardService;
use crate::service::dto::{
    ClaimResult, CommentResult, CreateItemRequest, FeedItem, HelpfulResult, PostItemResult,
    RewardOutcome,
};

/// 评论最大长度（字符）
pub const MAX_COMMENT_CHARS: usize = 500;

pub struct ItemService {
    items: Arc<dyn ItemRepositoryTrait>,
    comments: Arc<dyn CommentRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    rewards: Arc<RewardService>,
    storage: Arc<dyn ObjectStorage>,
}

impl ItemService {
    pub fn new(
        items: Arc<dyn ItemRepositoryTrait>,
        comments: Arc<dyn CommentRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        rewards: Arc<RewardService>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            items,
            comments,
            users,
            rewards,
            storage,
        }
    }

    /// 发布拾获物品
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn post_item(&self, user_id: Uuid, request: CreateItemRequest) -> Result<PostItemResult> {
        let request = request.trimmed();
        request.validate()?;
        request.check_images(user_id)?;

        self.require_user(user_id).await?;

        let new_item = NewItem {
            hashtags: parse_hashtags(&request.hashtags),
            title: request.title,
            description: request.description,
            location_tag: request.location_tag,
            posted_by: user_id,
        };

        let item = self.items.create_item(&new_item, &request.images).await?;
        metrics::record_item_posted();
        info!(item_id = %item.id, user_id = %user_id, images = request.images.len(), "物品发布成功");

        let reward = self
            .settle_reward(user_id, ActionKind::NewPost, item.id)
            .await;

        Ok(PostItemResult { item, reward })
    }

    /// 认领物品
    ///
    /// 条件更新防止并发重复认领，积分发给帮助失主的发布者
    #[instrument(skip(self))]
    pub async fn claim_item(&self, user_id: Uuid, item_id: Uuid) -> Result<ClaimResult> {
        self.require_user(user_id).await?;
        let item = self.require_item(item_id).await?;

        if item.is_posted_by(user_id) {
            return Err(ServiceError::SelfClaim);
        }
        if !item.status.can_transition_to(ItemStatus::Claimed) {
            return Err(ServiceError::ItemNotAvailable(item_id));
        }
        if !self.items.mark_claimed(item_id, user_id).await? {
            warn!(item_id = %item_id, "认领冲突，物品已被他人认领");
            return Err(ServiceError::ItemNotAvailable(item_id));
        }

        metrics::record_item_claimed();
        info!(item_id = %item_id, claimed_by = %user_id, "物品认领成功");

        let poster_reward = self
            .settle_reward(item.posted_by, ActionKind::ClaimVerified, item_id)
            .await;

        Ok(ClaimResult {
            item_id,
            claimed_by: user_id,
            poster_reward,
        })
    }

    /// 发表评论
    #[instrument(skip(self, text))]
    pub async fn add_comment(&self, user_id: Uuid, item_id: Uuid, text: &str) -> Result<CommentResult> {
        let text = text.trim();
        let length = text.chars().count();
        if length == 0 || length > MAX_COMMENT_CHARS {
            return Err(ServiceError::Validation(format!(
                "评论长度必须在1-{}个字符之间",
                MAX_COMMENT_CHARS
            )));
        }

        let author = self.require_user(user_id).await?;
        self.require_item(item_id).await?;

        let comment = self.comments.create_comment(item_id, user_id, text).await?;
        info!(comment_id = %comment.id, item_id = %item_id, "评论发表成功");

        let reward = self
            .settle_reward(user_id, ActionKind::Comment, comment.id)
            .await;

        Ok(CommentResult {
            comment: CommentWithAuthor {
                comment,
                author_name: author.display_name,
                author_avatar_url: author.avatar_url,
            },
            reward,
        })
    }

    /// 发布者将评论标记为有帮助
    #[instrument(skip(self))]
    pub async fn mark_helpful(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        comment_id: Uuid,
    ) -> Result<HelpfulResult> {
        let item = self.require_item(item_id).await?;
        if !item.is_posted_by(user_id) {
            return Err(ServiceError::Forbidden(
                "只有物品发布者可以标记有帮助的评论".to_string(),
            ));
        }

        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .filter(|c| c.item_id == item_id)
            .ok_or(ServiceError::CommentNotFound(comment_id))?;

        if comment.user_id == user_id {
            return Err(ServiceError::SelfHelpful);
        }

        // 标记本身就是积分记录，同一评论并发标记只有一次成功
        let commenter_reward = self
            .rewards
            .reward_once(comment.user_id, ActionKind::HelpfulComment, comment_id)
            .await?
            .ok_or(ServiceError::AlreadyMarkedHelpful)?;

        Ok(HelpfulResult {
            comment_id,
            commenter_reward,
        })
    }

    /// 删除物品
    ///
    /// 先删除数据库记录，再按返回的图片清理对象存储。只清理发布者上传目录内、
    /// 且不再被其他物品引用的路径，存储清理失败只记录日志
    #[instrument(skip(self))]
    pub async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<()> {
        let item = self.require_item(item_id).await?;
        if !item.is_posted_by(user_id) && !self.users.is_admin(user_id).await? {
            return Err(ServiceError::Forbidden("只能删除自己发布的物品".to_string()));
        }

        let images = self.items.delete_item(item_id).await?;
        info!(item_id = %item_id, deleted_by = %user_id, "物品已删除");

        let owned: Vec<String> = images
            .into_iter()
            .map(|image| image.storage_path)
            .filter(|path| {
                let owned = is_owned_path(path, item.posted_by);
                if !owned {
                    warn!(item_id = %item_id, path = %path, "图片不在发布者目录内，跳过清理");
                }
                owned
            })
            .collect();
        if owned.is_empty() {
            return Ok(());
        }

        let shared = match self.items.referenced_paths(&owned).await {
            Ok(shared) => shared,
            Err(e) => {
                warn!(item_id = %item_id, error = %e, "查询图片引用失败，跳过清理");
                return Ok(());
            }
        };
        let paths: Vec<String> = owned
            .into_iter()
            .filter(|path| !shared.contains(path))
            .collect();
        if paths.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.storage.remove(&paths).await {
            warn!(item_id = %item_id, error = %e, "清理物品图片失败，记录已删除");
        }

        Ok(())
    }

    /// 发放积分，失败只记录日志
    ///
    /// 积分是主操作的附带结果，主操作已经提交，不能因积分失败而向客户端报错
    async fn settle_reward(
        &self,
        user_id: Uuid,
        action: ActionKind,
        reference_id: Uuid,
    ) -> Option<RewardOutcome> {
        match self.rewards.reward(user_id, action, Some(reference_id)).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(user_id = %user_id, action = %action, reference_id = %reference_id, error = %e, "积分发放失败");
                metrics::record_reward_failure(action.as_str());
                None
            }
        }
    }

    /// 审核通过
    #[instrument(skip(self))]
    pub async fn approve_item(&self, admin_id: Uuid, item_id: Uuid) -> Result<()> {
        self.require_admin(admin_id).await?;

        if !self.items.approve(item_id).await? {
            return Err(ServiceError::ItemNotFound(item_id));
        }
        info!(item_id = %item_id, approved_by = %admin_id, "物品审核通过");

        Ok(())
    }

    /// 待审核列表
    pub async fn list_pending(&self, admin_id: Uuid) -> Result<Vec<FeedItem>> {
        self.require_admin(admin_id).await?;

        let items = self.items.list_pending().await?;
        Ok(items
            .into_iter()
            .map(|summary| FeedItem::new(summary, self.storage.as_ref()))
            .collect())
    }

    /// 校验管理员身份
    pub async fn require_admin(&self, user_id: Uuid) -> Result<()> {
        if self.users.is_admin(user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("需要管理员权限".to_string()))
        }
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))
    }

    async fn require_item(&self, item_id: Uuid) -> Result<Item> {
        self.items
            .get_item(item_id)
            .await?
            .ok_or(ServiceError::ItemNotFound(item_id))
    }
}
