//! 物品仓储
//!
//! 负责物品、图片和标签的读写，发布和删除在事务中完成

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::ItemRepositoryTrait;
use crate::error::Result;
use crate::models::{Hashtag, Image, Item, ItemStatus, ItemSummary, NewImage, NewItem};

const ITEM_COLUMNS: &str = "id, title, description, status, location_tag, hashtags, posted_by, \
     claimed_by, is_approved, created_at, claimed_at, archived_at, updated_at";

const IMAGE_COLUMNS: &str =
    "id, item_id, storage_path, width, height, size_bytes, order_num, created_at";

/// 摘要查询，附带发布者名称、封面图和评论数
const SUMMARY_SELECT: &str = r#"
    SELECT i.id, i.title, i.status, i.location_tag, i.hashtags, i.posted_by,
           u.display_name AS poster_name,
           (SELECT im.storage_path FROM images im
             WHERE im.item_id = i.id ORDER BY im.order_num LIMIT 1) AS cover_image,
           (SELECT COUNT(*) FROM comments c WHERE c.item_id = i.id) AS comment_count,
           i.is_approved, i.created_at
    FROM items i
    JOIN users u ON u.id = i.posted_by
"#;

pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 写入操作 ====================

    /// 发布物品
    ///
    /// 物品、图片元数据和标签在同一事务中写入
    pub async fn create_item(&self, new_item: &NewItem, images: &[NewImage]) -> Result<Item> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO items (title, description, status, location_tag, hashtags, posted_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ITEM_COLUMNS}"
        );
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(&new_item.title)
            .bind(&new_item.description)
            .bind(ItemStatus::Available)
            .bind(&new_item.location_tag)
            .bind(&new_item.hashtags)
            .bind(new_item.posted_by)
            .fetch_one(&mut *tx)
            .await?;

        for (order_num, image) in images.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO images (item_id, storage_path, width, height, size_bytes, order_num)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.id)
            .bind(&image.storage_path)
            .bind(image.width)
            .bind(image.height)
            .bind(image.size_bytes)
            .bind(order_num as i32)
            .execute(&mut *tx)
            .await?;
        }

        for tag in &new_item.hashtags {
            sqlx::query("INSERT INTO hashtags (tag) VALUES ($1) ON CONFLICT (tag) DO NOTHING")
                .bind(tag)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(item)
    }

    /// 认领物品
    ///
    /// 条件更新，只有 available 状态且非本人发布的物品会被更新
    pub async fn mark_claimed(&self, item_id: Uuid, claimer: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET status = $3, claimed_by = $2, claimed_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = $4 AND posted_by <> $2
            "#,
        )
        .bind(item_id)
        .bind(claimer)
        .bind(ItemStatus::Claimed)
        .bind(ItemStatus::Available)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// 删除物品及其图片、评论记录
    pub async fn delete_item(&self, item_id: Uuid) -> Result<Vec<Image>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "DELETE FROM images WHERE item_id = $1 RETURNING {IMAGE_COLUMNS}"
        );
        let images = sqlx::query_as::<_, Image>(&sql)
            .bind(item_id)
            .fetch_all(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE item_id = $1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(images)
    }

    pub async fn approve(&self, item_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE items SET is_approved = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // ==================== 查询操作 ====================

    pub async fn get_item(&self, id: Uuid) -> Result<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    pub async fn list_images(&self, item_id: Uuid) -> Result<Vec<Image>> {
        let sql = format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE item_id = $1 ORDER BY order_num"
        );
        let images = sqlx::query_as::<_, Image>(&sql)
            .bind(item_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(images)
    }

    /// 返回仍被 images 表引用的存储路径
    pub async fn referenced_paths(&self, paths: &[String]) -> Result<Vec<String>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let referenced = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT storage_path FROM images WHERE storage_path = ANY($1)",
        )
        .bind(paths)
        .fetch_all(&self.pool)
        .await?;

        Ok(referenced)
    }

    /// 信息流，按发布时间倒序
    pub async fn list_feed(&self, offset: i64, limit: i64) -> Result<(Vec<ItemSummary>, i64)> {
        let sql = format!("{SUMMARY_SELECT} ORDER BY i.created_at DESC OFFSET $1 LIMIT $2");
        let items = sqlx::query_as::<_, ItemSummary>(&sql)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total))
    }

    pub async fn list_by_poster(&self, user_id: Uuid) -> Result<Vec<ItemSummary>> {
        let sql = format!("{SUMMARY_SELECT} WHERE i.posted_by = $1 ORDER BY i.created_at DESC");
        let items = sqlx::query_as::<_, ItemSummary>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// 待审核物品，按发布时间倒序
    pub async fn list_pending(&self) -> Result<Vec<ItemSummary>> {
        let sql = format!("{SUMMARY_SELECT} WHERE i.is_approved = FALSE ORDER BY i.created_at DESC");
        let items = sqlx::query_as::<_, ItemSummary>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    pub async fn count_posts_by(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE posted_by = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_claims_helped(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM items WHERE posted_by = $1 AND claimed_by IS NOT NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn list_hashtags(&self, limit: i64) -> Result<Vec<Hashtag>> {
        let tags = sqlx::query_as::<_, Hashtag>(
            "SELECT id, tag, created_at FROM hashtags ORDER BY tag LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }
}

#[async_trait]
impl ItemRepositoryTrait for ItemRepository {
    async fn create_item(&self, item: &NewItem, images: &[NewImage]) -> Result<Item> {
        self.create_item(item, images).await
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>> {
        self.get_item(id).await
    }

    async fn list_images(&self, item_id: Uuid) -> Result<Vec<Image>> {
        self.list_images(item_id).await
    }

    async fn referenced_paths(&self, paths: &[String]) -> Result<Vec<String>> {
        self.referenced_paths(paths).await
    }

    async fn list_feed(&self, offset: i64, limit: i64) -> Result<(Vec<ItemSummary>, i64)> {
        self.list_feed(offset, limit).await
    }

    async fn list_by_poster(&self, user_id: Uuid) -> Result<Vec<ItemSummary>> {
        self.list_by_poster(user_id).await
    }

    async fn mark_claimed(&self, item_id: Uuid, claimer: Uuid) -> Result<bool> {
        self.mark_claimed(item_id, claimer).await
    }

    async fn delete_item(&self, item_id: Uuid) -> Result<Vec<Image>> {
        self.delete_item(item_id).await
    }

    async fn list_pending(&self) -> Result<Vec<ItemSummary>> {
        self.list_pending().await
    }

    async fn approve(&self, item_id: Uuid) -> Result<bool> {
        self.approve(item_id).await
    }

    async fn count_posts_by(&self, user_id: Uuid) -> Result<i64> {
        self.count_posts_by(user_id).await
    }

    async fn count_claims_helped(&self, user_id: Uuid) -> Result<i64> {
        self.count_claims_helped(user_id).await
    }

    async fn list_hashtags(&self, limit: i64) -> Result<Vec<Hashtag>> {
        self.list_hashtags(limit).await
    }
}
