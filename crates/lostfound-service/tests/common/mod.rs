//! 集成测试公共设施：内存仓储、内存对象存储、Token 签发

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, Duration, Utc};
use gamification::{ActionKind, BadgeKind};
use jsonwebtoken::{EncodingKey, Header, encode};
use lostfound::{
    Result,
    auth::{Claims, JwtManager},
    models::{
        BadgeAward, Comment, CommentWithAuthor, Hashtag, Image, Item, ItemStatus, ItemSummary,
        LeaderboardEntry, NewImage, NewItem, PointRecord, User,
    },
    repository::{
        CommentRepositoryTrait, ItemRepositoryTrait, RewardRepositoryTrait, UserRepositoryTrait,
    },
    routes,
    service::{ItemService, QueryService, RewardService},
    state::AppState,
};
use lostfound_shared::config::AuthConfig;
use lostfound_shared::storage::ObjectStorage;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    admins: Vec<Uuid>,
    items: Vec<Item>,
    images: Vec<Image>,
    hashtags: Vec<Hashtag>,
    comments: Vec<Comment>,
    points: Vec<PointRecord>,
    badges: Vec<BadgeAward>,
}

/// 内存版数据库，实现全部仓储接口
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// 打开后积分写入全部失败，模拟积分表不可用
    fail_points: AtomicBool,
}

impl MemoryStore {
    pub fn add_user(&self, name: &str) -> Uuid {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            display_name: name.to_string(),
            avatar_url: None,
            points: 0,
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        self.tables.lock().unwrap().users.push(user);
        id
    }

    pub fn add_admin(&self, name: &str) -> Uuid {
        let id = self.add_user(name);
        self.tables.lock().unwrap().admins.push(id);
        id
    }

    pub fn user_points(&self, id: Uuid) -> i64 {
        let tables = self.tables.lock().unwrap();
        tables.users.iter().find(|u| u.id == id).map_or(0, |u| u.points)
    }

    pub fn badges_of(&self, id: Uuid) -> Vec<BadgeKind> {
        let tables = self.tables.lock().unwrap();
        tables
            .badges
            .iter()
            .filter(|b| b.user_id == id)
            .map(|b| b.badge_type)
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.tables.lock().unwrap().items.len()
    }

    pub fn fail_points(&self, on: bool) {
        self.fail_points.store(on, Ordering::SeqCst);
    }

    fn check_points_available(&self) -> Result<()> {
        if self.fail_points.load(Ordering::SeqCst) {
            return Err(lostfound::ServiceError::Internal("points unavailable".to_string()));
        }
        Ok(())
    }

    /// 绕过服务层直接写入物品和图片行，用于构造历史数据
    pub fn seed_item(&self, poster: Uuid, paths: &[String]) -> Uuid {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let id = Uuid::new_v4();
        tables.items.push(Item {
            id,
            title: "Seeded".to_string(),
            description: None,
            status: ItemStatus::Available,
            location_tag: "Union".to_string(),
            hashtags: vec![],
            posted_by: poster,
            claimed_by: None,
            is_approved: true,
            created_at: now,
            claimed_at: None,
            archived_at: None,
            updated_at: now,
        });
        for (order, path) in paths.iter().enumerate() {
            tables.images.push(Image {
                id: Uuid::new_v4(),
                item_id: id,
                storage_path: path.clone(),
                width: 800,
                height: 600,
                size_bytes: 100_000,
                order_num: order as i32,
                created_at: now,
            });
        }
        id
    }

    /// 将某用户全部积分流水平移，用于构造上周数据
    pub fn shift_points(&self, user_id: Uuid, by: Duration) {
        let mut tables = self.tables.lock().unwrap();
        for record in tables.points.iter_mut().filter(|p| p.user_id == user_id) {
            record.created_at += by;
        }
    }

    fn summary(tables: &Tables, item: &Item) -> ItemSummary {
        let cover_image = tables
            .images
            .iter()
            .filter(|i| i.item_id == item.id)
            .min_by_key(|i| i.order_num)
            .map(|i| i.storage_path.clone());
        ItemSummary {
            id: item.id,
            title: item.title.clone(),
            status: item.status,
            location_tag: item.location_tag.clone(),
            hashtags: item.hashtags.clone(),
            posted_by: item.posted_by,
            poster_name: tables
                .users
                .iter()
                .find(|u| u.id == item.posted_by)
                .map(|u| u.display_name.clone())
                .unwrap_or_default(),
            cover_image,
            comment_count: tables.comments.iter().filter(|c| c.item_id == item.id).count() as i64,
            is_approved: item.is_approved,
            created_at: item.created_at,
        }
    }

    fn newest_first(tables: &Tables, filter: impl Fn(&Item) -> bool) -> Vec<ItemSummary> {
        let mut items: Vec<&Item> = tables.items.iter().filter(|i| filter(i)).collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.into_iter().map(|i| Self::summary(tables, i)).collect()
    }
}

#[async_trait]
impl UserRepositoryTrait for MemoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.lock().unwrap().users.iter().find(|u| u.id == id).cloned())
    }

    async fn is_admin(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.lock().unwrap().admins.contains(&id))
    }
}

#[async_trait]
impl ItemRepositoryTrait for MemoryStore {
    async fn create_item(&self, item: &NewItem, images: &[NewImage]) -> Result<Item> {
        let mut tables = self.tables.lock().unwrap();
        // 同一测试内的多次发布需要可区分的时间顺序
        let now = Utc::now() + Duration::milliseconds(tables.items.len() as i64);
        let created = Item {
            id: Uuid::new_v4(),
            title: item.title.clone(),
            description: item.description.clone(),
            status: ItemStatus::Available,
            location_tag: item.location_tag.clone(),
            hashtags: item.hashtags.clone(),
            posted_by: item.posted_by,
            claimed_by: None,
            is_approved: false,
            created_at: now,
            claimed_at: None,
            archived_at: None,
            updated_at: now,
        };
        for (order, image) in images.iter().enumerate() {
            tables.images.push(Image {
                id: Uuid::new_v4(),
                item_id: created.id,
                storage_path: image.storage_path.clone(),
                width: image.width,
                height: image.height,
                size_bytes: image.size_bytes,
                order_num: order as i32,
                created_at: now,
            });
        }
        for tag in &item.hashtags {
            if !tables.hashtags.iter().any(|h| &h.tag == tag) {
                tables.hashtags.push(Hashtag {
                    id: Uuid::new_v4(),
                    tag: tag.clone(),
                    created_at: now,
                });
            }
        }
        tables.items.push(created.clone());
        Ok(created)
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>> {
        Ok(self.tables.lock().unwrap().items.iter().find(|i| i.id == id).cloned())
    }

    async fn list_images(&self, item_id: Uuid) -> Result<Vec<Image>> {
        let tables = self.tables.lock().unwrap();
        let mut images: Vec<Image> = tables
            .images
            .iter()
            .filter(|i| i.item_id == item_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| i.order_num);
        Ok(images)
    }

    async fn referenced_paths(&self, paths: &[String]) -> Result<Vec<String>> {
        let tables = self.tables.lock().unwrap();
        Ok(paths
            .iter()
            .filter(|p| tables.images.iter().any(|i| &i.storage_path == *p))
            .cloned()
            .collect())
    }

    async fn list_feed(&self, offset: i64, limit: i64) -> Result<(Vec<ItemSummary>, i64)> {
        let tables = self.tables.lock().unwrap();
        let all = Self::newest_first(&tables, |_| true);
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_by_poster(&self, user_id: Uuid) -> Result<Vec<ItemSummary>> {
        let tables = self.tables.lock().unwrap();
        Ok(Self::newest_first(&tables, |i| i.posted_by == user_id))
    }

    async fn mark_claimed(&self, item_id: Uuid, claimer: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        match tables
            .items
            .iter_mut()
            .find(|i| i.id == item_id && i.status == ItemStatus::Available)
        {
            Some(item) => {
                item.status = ItemStatus::Claimed;
                item.claimed_by = Some(claimer);
                item.claimed_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_item(&self, item_id: Uuid) -> Result<Vec<Image>> {
        let mut tables = self.tables.lock().unwrap();
        let (removed, kept): (Vec<Image>, Vec<Image>) = tables
            .images
            .drain(..)
            .partition(|i| i.item_id == item_id);
        tables.images = kept;
        tables.comments.retain(|c| c.item_id != item_id);
        tables.items.retain(|i| i.id != item_id);
        Ok(removed)
    }

    async fn list_pending(&self) -> Result<Vec<ItemSummary>> {
        let tables = self.tables.lock().unwrap();
        Ok(Self::newest_first(&tables, |i| !i.is_approved))
    }

    async fn approve(&self, item_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        match tables.items.iter_mut().find(|i| i.id == item_id) {
            Some(item) => {
                item.is_approved = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_posts_by(&self, user_id: Uuid) -> Result<i64> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.items.iter().filter(|i| i.posted_by == user_id).count() as i64)
    }

    async fn count_claims_helped(&self, user_id: Uuid) -> Result<i64> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .items
            .iter()
            .filter(|i| i.posted_by == user_id && i.claimed_by.is_some())
            .count() as i64)
    }

    async fn list_hashtags(&self, limit: i64) -> Result<Vec<Hashtag>> {
        let tables = self.tables.lock().unwrap();
        let mut tags = tables.hashtags.clone();
        tags.sort_by(|a, b| a.tag.cmp(&b.tag));
        tags.truncate(limit as usize);
        Ok(tags)
    }
}

#[async_trait]
impl CommentRepositoryTrait for MemoryStore {
    async fn create_comment(&self, item_id: Uuid, user_id: Uuid, text: &str) -> Result<Comment> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now() + Duration::milliseconds(tables.comments.len() as i64);
        let comment = Comment {
            id: Uuid::new_v4(),
            item_id,
            user_id,
            text: text.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.tables.lock().unwrap().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_by_item(&self, item_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let tables = self.tables.lock().unwrap();
        let mut comments: Vec<CommentWithAuthor> = tables
            .comments
            .iter()
            .filter(|c| c.item_id == item_id)
            .map(|c| {
                let author = tables.users.iter().find(|u| u.id == c.user_id);
                CommentWithAuthor {
                    comment: c.clone(),
                    author_name: author.map(|u| u.display_name.clone()).unwrap_or_default(),
                    author_avatar_url: author.and_then(|u| u.avatar_url.clone()),
                }
            })
            .collect();
        comments.sort_by(|a, b| a.comment.created_at.cmp(&b.comment.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl RewardRepositoryTrait for MemoryStore {
    async fn record_points(
        &self,
        user_id: Uuid,
        action: ActionKind,
        amount: u32,
        reference_id: Option<Uuid>,
    ) -> Result<i64> {
        self.check_points_available()?;
        let mut tables = self.tables.lock().unwrap();
        tables.points.push(PointRecord {
            id: Uuid::new_v4(),
            user_id,
            amount: amount as i32,
            reason: action,
            reference_id,
            created_at: Utc::now(),
        });
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(lostfound::ServiceError::UserNotFound(user_id))?;
        user.points += i64::from(amount);
        Ok(user.points)
    }

    async fn record_points_once(
        &self,
        user_id: Uuid,
        action: ActionKind,
        amount: u32,
        reference_id: Uuid,
    ) -> Result<Option<i64>> {
        let exists = {
            let tables = self.tables.lock().unwrap();
            tables
                .points
                .iter()
                .any(|p| p.reason == action && p.reference_id == Some(reference_id))
        };
        if exists {
            return Ok(None);
        }
        self.record_points(user_id, action, amount, Some(reference_id))
            .await
            .map(Some)
    }

    async fn list_points(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointRecord>> {
        let tables = self.tables.lock().unwrap();
        let mut records: Vec<PointRecord> = tables
            .points
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        records.reverse();
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn list_badges(&self, user_id: Uuid) -> Result<Vec<BadgeAward>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .badges
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn award_badge(&self, user_id: Uuid, kind: BadgeKind) -> Result<Option<BadgeAward>> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .badges
            .iter()
            .any(|b| b.user_id == user_id && b.badge_type == kind)
        {
            return Ok(None);
        }
        let award = BadgeAward {
            id: Uuid::new_v4(),
            user_id,
            badge_type: kind,
            awarded_at: Utc::now(),
        };
        tables.badges.push(award.clone());
        Ok(Some(award))
    }

    async fn award_periodic_badge(
        &self,
        user_id: Uuid,
        kind: BadgeKind,
        since: DateTime<Utc>,
    ) -> Result<Option<BadgeAward>> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .badges
            .iter()
            .any(|b| b.badge_type == kind && b.awarded_at >= since)
        {
            return Ok(None);
        }
        let award = BadgeAward {
            id: Uuid::new_v4(),
            user_id,
            badge_type: kind,
            awarded_at: Utc::now(),
        };
        tables.badges.push(award.clone());
        Ok(Some(award))
    }

    async fn badge_awarded_since(&self, kind: BadgeKind, since: DateTime<Utc>) -> Result<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .badges
            .iter()
            .any(|b| b.badge_type == kind && b.awarded_at >= since))
    }

    async fn leaderboard(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let tables = self.tables.lock().unwrap();
        let mut entries: Vec<LeaderboardEntry> = tables
            .users
            .iter()
            .map(|user| {
                let points = match since {
                    None => user.points,
                    Some(since) => tables
                        .points
                        .iter()
                        .filter(|p| p.user_id == user.id && p.created_at >= since)
                        .filter(|p| until.is_none_or(|until| p.created_at < until))
                        .map(|p| i64::from(p.amount))
                        .sum(),
                };
                LeaderboardEntry {
                    rank: 0,
                    user_id: user.id,
                    display_name: user.display_name.clone(),
                    avatar_url: user.avatar_url.clone(),
                    points,
                }
            })
            .filter(|e| e.points > 0)
            .collect();
        entries.sort_by(|a, b| b.points.cmp(&a.points));
        entries.truncate(limit as usize);
        Ok(entries)
    }
}

/// 记录删除请求的内存对象存储
#[derive(Default)]
pub struct MemoryStorage {
    pub removed: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn public_url(&self, path: &str) -> String {
        format!("https://cdn.test/images/{}", path)
    }

    async fn remove(&self, paths: &[String]) -> lostfound_shared::error::Result<()> {
        self.removed.lock().unwrap().extend_from_slice(paths);
        Ok(())
    }
}

/// 组装好的测试应用
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryStorage>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let storage = Arc::new(MemoryStorage::default());

        let rewards = Arc::new(RewardService::new(store.clone(), store.clone()));
        let items = Arc::new(ItemService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            rewards.clone(),
            storage.clone(),
        ));
        let queries = Arc::new(QueryService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            storage.clone(),
            10,
        ));
        let jwt = Arc::new(JwtManager::new(&auth_config()));

        Self {
            state: AppState::new(items, queries, rewards, jwt),
            store,
            storage,
        }
    }

    pub fn router(&self) -> Router {
        routes::app(self.state.clone())
    }

    /// 发送请求，返回状态码和 JSON 响应体
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: JWT_SECRET.to_string(),
        audience: "authenticated".to_string(),
    }
}

pub fn token_for(user: Uuid) -> String {
    let claims = Claims {
        sub: user.to_string(),
        aud: "authenticated".to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
        email: None,
        role: Some("authenticated".to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// 发布者上传目录下的图片路径
pub fn image_path(owner: Uuid, title: &str, index: usize) -> String {
    format!("items/{owner}/{}-{index}.webp", title.replace(' ', "-"))
}

/// 合法的发布请求体，图片位于发布者自己的上传目录
pub fn item_body(owner: Uuid, title: &str, images: usize) -> Value {
    let images: Vec<Value> = (0..images)
        .map(|i| {
            serde_json::json!({
                "storagePath": image_path(owner, title, i),
                "width": 1024,
                "height": 768,
                "sizeBytes": 200_000
            })
        })
        .collect();
    serde_json::json!({
        "title": title,
        "description": "Found near the library entrance",
        "locationTag": "Library",
        "hashtags": "#Backpack blue",
        "images": images
    })
}
