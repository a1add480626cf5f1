//! 物品、图片、评论相关模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::ItemStatus;

/// 拾获物品
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: ItemStatus,
    pub location_tag: String,
    pub hashtags: Vec<String>,
    pub posted_by: Uuid,
    pub claimed_by: Option<Uuid>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn is_posted_by(&self, user_id: Uuid) -> bool {
        self.posted_by == user_id
    }
}

/// 待写入的物品（已完成校验和清洗）
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub title: String,
    pub description: Option<String>,
    pub location_tag: String,
    pub hashtags: Vec<String>,
    pub posted_by: Uuid,
}

/// 物品图片元数据
///
/// 图片本体由客户端压缩后直接上传到存储桶，这里只记录路径和尺寸
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: Uuid,
    pub item_id: Uuid,
    pub storage_path: String,
    pub width: i32,
    pub height: i32,
    pub size_bytes: i32,
    pub order_num: i32,
    pub created_at: DateTime<Utc>,
}

/// 单张图片最大边长（像素）
pub const MAX_IMAGE_DIMENSION: i32 = 1024;
/// 单张图片最大体积（1.5 MB）
pub const MAX_IMAGE_BYTES: i32 = 1_572_864;

/// 用户上传目录前缀，客户端按 `items/{user_id}/...` 上传
pub fn upload_prefix(user_id: Uuid) -> String {
    format!("items/{user_id}/")
}

/// 存储路径是否位于该用户的上传目录内
pub fn is_owned_path(path: &str, user_id: Uuid) -> bool {
    let Some(rest) = path.strip_prefix(&upload_prefix(user_id)) else {
        return false;
    };
    !rest.is_empty()
        && !rest.contains('\\')
        && rest.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// 发布物品时提交的图片元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewImage {
    #[validate(length(min = 1, max = 512, message = "图片路径不能为空"))]
    pub storage_path: String,
    #[validate(range(min = 1, max = 1024, message = "图片宽度不能超过 1024 像素"))]
    pub width: i32,
    #[validate(range(min = 1, max = 1024, message = "图片高度不能超过 1024 像素"))]
    pub height: i32,
    #[validate(range(min = 1, max = 1572864, message = "图片大小不能超过 1.5MB"))]
    pub size_bytes: i32,
}

/// 评论
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 带作者信息的评论
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub comment: Comment,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
}

/// 标签
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Hashtag {
    pub id: Uuid,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

/// 信息流中的物品摘要
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: Uuid,
    pub title: String,
    pub status: ItemStatus,
    pub location_tag: String,
    pub hashtags: Vec<String>,
    pub posted_by: Uuid,
    pub poster_name: String,
    /// 首张图片的存储路径，服务层转换为公开地址
    pub cover_image: Option<String>,
    pub comment_count: i64,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// 解析用户输入的标签
///
/// 以逗号或空白分隔，去掉前导 `#` 并转为小写，去重后保持原有顺序
pub fn parse_hashtags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for token in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let tag = token.trim_start_matches('#').to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}
