//! 积分与徽章仓储
//!
//! 积分流水与用户总积分在同一事务中更新

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gamification::{ActionKind, BadgeKind};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::traits::RewardRepositoryTrait;
use crate::error::Result;
use crate::models::{BadgeAward, LeaderboardEntry, PointRecord};

pub struct RewardRepository {
    pool: PgPool,
}

impl RewardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 积分 ====================

    /// 记录积分
    ///
    /// 写入 points 流水并累加 users.points，返回累加后的总积分
    pub async fn record_points(
        &self,
        user_id: Uuid,
        action: ActionKind,
        amount: u32,
        reference_id: Option<Uuid>,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let total = apply_points(&mut tx, user_id, action, amount, reference_id).await?;
        tx.commit().await?;

        Ok(total)
    }

    /// 按 (action, reference_id) 至多记录一次积分
    ///
    /// 事务级 advisory lock 串行化同一引用的并发请求，已存在流水时返回 None
    pub async fn record_points_once(
        &self,
        user_id: Uuid,
        action: ActionKind,
        amount: u32,
        reference_id: Uuid,
    ) -> Result<Option<i64>> {
        let mut tx = self.pool.begin().await?;
        lock_key(&mut tx, &format!("points:{action}:{reference_id}")).await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM points WHERE reason = $1 AND reference_id = $2)",
        )
        .bind(action)
        .bind(reference_id)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            tx.rollback().await?;
            return Ok(None);
        }

        let total = apply_points(&mut tx, user_id, action, amount, Some(reference_id)).await?;
        tx.commit().await?;

        Ok(Some(total))
    }

    pub async fn list_points(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointRecord>> {
        let records = sqlx::query_as::<_, PointRecord>(
            r#"
            SELECT id, user_id, amount, reason, reference_id, created_at
            FROM points
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    // ==================== 徽章 ====================

    pub async fn list_badges(&self, user_id: Uuid) -> Result<Vec<BadgeAward>> {
        let badges = sqlx::query_as::<_, BadgeAward>(
            r#"
            SELECT id, user_id, badge_type, awarded_at
            FROM badges
            WHERE user_id = $1
            ORDER BY awarded_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    /// 授予徽章，用户已持有时返回 None
    pub async fn award_badge(&self, user_id: Uuid, kind: BadgeKind) -> Result<Option<BadgeAward>> {
        let mut tx = self.pool.begin().await?;
        lock_key(&mut tx, &format!("badge:{kind}:{user_id}")).await?;

        let award = sqlx::query_as::<_, BadgeAward>(
            r#"
            INSERT INTO badges (user_id, badge_type)
            SELECT $1, $2
            WHERE NOT EXISTS (
                SELECT 1 FROM badges WHERE user_id = $1 AND badge_type = $2
            )
            RETURNING id, user_id, badge_type, awarded_at
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(award)
    }

    /// 周期性徽章：`since` 之后已有任何用户获得该徽章时返回 None
    ///
    /// 锁粒度为徽章类型，多实例同时结算时只有一个写入成功
    pub async fn award_periodic_badge(
        &self,
        user_id: Uuid,
        kind: BadgeKind,
        since: DateTime<Utc>,
    ) -> Result<Option<BadgeAward>> {
        let mut tx = self.pool.begin().await?;
        lock_key(&mut tx, &format!("badge:{kind}")).await?;

        let award = sqlx::query_as::<_, BadgeAward>(
            r#"
            INSERT INTO badges (user_id, badge_type)
            SELECT $1, $2
            WHERE NOT EXISTS (
                SELECT 1 FROM badges WHERE badge_type = $2 AND awarded_at >= $3
            )
            RETURNING id, user_id, badge_type, awarded_at
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(since)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(award)
    }

    pub async fn badge_awarded_since(&self, kind: BadgeKind, since: DateTime<Utc>) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM badges WHERE badge_type = $1 AND awarded_at >= $2)",
        )
        .bind(kind)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // ==================== 排行榜 ====================

    /// 排行榜
    ///
    /// 有时间窗口时汇总窗口内的积分流水，否则直接使用用户累计积分
    pub async fn leaderboard(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let entries = match since {
            Some(since) => {
                sqlx::query_as::<_, LeaderboardEntry>(
                    r#"
                    SELECT u.id AS user_id, u.display_name, u.avatar_url,
                           SUM(p.amount)::bigint AS points
                    FROM points p
                    JOIN users u ON u.id = p.user_id
                    WHERE p.created_at >= $1
                      AND ($2::timestamptz IS NULL OR p.created_at < $2)
                    GROUP BY u.id, u.display_name, u.avatar_url
                    ORDER BY points DESC, u.display_name ASC
                    LIMIT $3
                    "#,
                )
                .bind(since)
                .bind(until)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, LeaderboardEntry>(
                    r#"
                    SELECT id AS user_id, display_name, avatar_url, points::bigint AS points
                    FROM users
                    ORDER BY points DESC, display_name ASC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(entries)
    }
}

#[async_trait]
impl RewardRepositoryTrait for RewardRepository {
    async fn record_points(
        &self,
        user_id: Uuid,
        action: ActionKind,
        amount: u32,
        reference_id: Option<Uuid>,
    ) -> Result<i64> {
        self.record_points(user_id, action, amount, reference_id)
            .await
    }

    async fn record_points_once(
        &self,
        user_id: Uuid,
        action: ActionKind,
        amount: u32,
        reference_id: Uuid,
    ) -> Result<Option<i64>> {
        self.record_points_once(user_id, action, amount, reference_id)
            .await
    }

    async fn list_points(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointRecord>> {
        self.list_points(user_id, limit).await
    }

    async fn list_badges(&self, user_id: Uuid) -> Result<Vec<BadgeAward>> {
        self.list_badges(user_id).await
    }

    async fn award_badge(&self, user_id: Uuid, kind: BadgeKind) -> Result<Option<BadgeAward>> {
        self.award_badge(user_id, kind).await
    }

    async fn award_periodic_badge(
        &self,
        user_id: Uuid,
        kind: BadgeKind,
        since: DateTime<Utc>,
    ) -> Result<Option<BadgeAward>> {
        self.award_periodic_badge(user_id, kind, since).await
    }

    async fn badge_awarded_since(&self, kind: BadgeKind, since: DateTime<Utc>) -> Result<bool> {
        self.badge_awarded_since(kind, since).await
    }

    async fn leaderboard(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        self.leaderboard(since, until, limit).await
    }
}

/// 事务级 advisory lock，事务结束时自动释放
async fn lock_key(conn: &mut PgConnection, key: &str) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(conn)
        .await?;
    Ok(())
}

async fn apply_points(
    conn: &mut PgConnection,
    user_id: Uuid,
    action: ActionKind,
    amount: u32,
    reference_id: Option<Uuid>,
) -> Result<i64> {
    let amount = i32::try_from(amount).unwrap_or(i32::MAX);

    sqlx::query(
        r#"
        INSERT INTO points (user_id, amount, reason, reference_id)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .bind(action)
    .bind(reference_id)
    .execute(&mut *conn)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        UPDATE users
        SET points = points + $2, updated_at = NOW()
        WHERE id = $1
        RETURNING points::bigint
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_one(&mut *conn)
    .await?;

    Ok(total)
}
