//! 评论仓储

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::CommentRepositoryTrait;
use crate::error::Result;
use crate::models::{Comment, CommentWithAuthor};

pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_comment(&self, item_id: Uuid, user_id: Uuid, text: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (item_id, user_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, item_id, user_id, text, created_at, updated_at
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, item_id, user_id, text, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// 物品下的评论，按时间正序
    pub async fn list_by_item(&self, item_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.item_id, c.user_id, c.text, c.created_at, c.updated_at,
                   u.display_name AS author_name, u.avatar_url AS author_avatar_url
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.item_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}

#[async_trait]
impl CommentRepositoryTrait for CommentRepository {
    async fn create_comment(&self, item_id: Uuid, user_id: Uuid, text: &str) -> Result<Comment> {
        self.create_comment(item_id, user_id, text).await
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        self.get_comment(id).await
    }

    async fn list_by_item(&self, item_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        self.list_by_item(item_id).await
    }
}
