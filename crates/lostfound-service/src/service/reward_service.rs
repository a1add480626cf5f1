//! 积分发放服务
//!
//! 按积分表发放积分，并根据发帖数和帮助认领数自动授予徽章。
//! 每周评选一次 Campus Hero。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use gamification::{ActionKind, BadgeKind, ContributorStats, newly_earned, points_for};
use lostfound_shared::observability::metrics;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{LeaderboardEntry, LeaderboardPeriod};
use crate::repository::{ItemRepositoryTrait, RewardRepositoryTrait};
use crate::service::dto::RewardOutcome;

pub struct RewardService {
    rewards: Arc<dyn RewardRepositoryTrait>,
    items: Arc<dyn ItemRepositoryTrait>,
}

impl RewardService {
    pub fn new(rewards: Arc<dyn RewardRepositoryTrait>, items: Arc<dyn ItemRepositoryTrait>) -> Self {
        Self { rewards, items }
    }

    /// 为用户行为发放积分
    ///
    /// 发帖和认领会改变徽章统计，发放后重新评估计数类徽章
    #[instrument(skip(self))]
    pub async fn reward(
        &self,
        user_id: Uuid,
        action: ActionKind,
        reference_id: Option<Uuid>,
    ) -> Result<RewardOutcome> {
        let amount = points_for(action);
        let total_points = self
            .rewards
            .record_points(user_id, action, amount, reference_id)
            .await?;

        self.settle(user_id, action, amount, total_points).await
    }

    /// 同一对象只为该行为发放一次积分
    ///
    /// 已发放过时返回 None，并发请求由仓储层串行化
    #[instrument(skip(self))]
    pub async fn reward_once(
        &self,
        user_id: Uuid,
        action: ActionKind,
        reference_id: Uuid,
    ) -> Result<Option<RewardOutcome>> {
        let amount = points_for(action);
        let Some(total_points) = self
            .rewards
            .record_points_once(user_id, action, amount, reference_id)
            .await?
        else {
            info!(user_id = %user_id, action = %action, reference_id = %reference_id, "积分已发放过，跳过");
            return Ok(None);
        };

        self.settle(user_id, action, amount, total_points)
            .await
            .map(Some)
    }

    async fn settle(
        &self,
        user_id: Uuid,
        action: ActionKind,
        amount: u32,
        total_points: i64,
    ) -> Result<RewardOutcome> {
        metrics::record_points_awarded(action.as_str(), amount);

        let new_badges = match action {
            ActionKind::NewPost | ActionKind::ClaimVerified => self.evaluate_badges(user_id).await?,
            ActionKind::Comment | ActionKind::HelpfulComment => Vec::new(),
        };

        info!(
            user_id = %user_id,
            action = %action,
            points = amount,
            total_points,
            "积分发放成功"
        );

        Ok(RewardOutcome {
            action,
            points_awarded: amount,
            total_points,
            new_badges,
        })
    }

    /// 授予新达成的计数类徽章
    ///
    /// 只返回本次实际写入的徽章，并发评估时仓储层保证不重复授予
    async fn evaluate_badges(&self, user_id: Uuid) -> Result<Vec<BadgeKind>> {
        let stats = ContributorStats {
            posts: to_count(self.items.count_posts_by(user_id).await?),
            claims_helped: to_count(self.items.count_claims_helped(user_id).await?),
        };
        let held: Vec<BadgeKind> = self
            .rewards
            .list_badges(user_id)
            .await?
            .into_iter()
            .map(|award| award.badge_type)
            .collect();

        let mut awarded = Vec::new();
        for kind in newly_earned(&stats, &held) {
            if self.rewards.award_badge(user_id, kind).await?.is_none() {
                continue;
            }
            metrics::record_badge_awarded(kind.as_str());
            info!(user_id = %user_id, badge = %kind, "徽章授予成功");
            awarded.push(kind);
        }

        Ok(awarded)
    }

    /// 评选上一个完整自然周的 Campus Hero
    ///
    /// 统计窗口为 [上周一 00:00, 本周一 00:00)。本周一之后已授予过则跳过，
    /// 写入时再由仓储层按徽章类型加锁复核，保证每周最多一位。返回当选者。
    #[instrument(skip(self))]
    pub async fn crown_weekly_hero(&self, now: DateTime<Utc>) -> Result<Option<LeaderboardEntry>> {
        let Some(week_end) = LeaderboardPeriod::Weekly.window_start(now) else {
            return Ok(None);
        };
        let week_start = week_end - Duration::days(7);

        if self
            .rewards
            .badge_awarded_since(BadgeKind::CampusHero, week_end)
            .await?
        {
            info!(week_start = %week_start, "本周期 Campus Hero 已评选，跳过");
            return Ok(None);
        }

        let top = self
            .rewards
            .leaderboard(Some(week_start), Some(week_end), 1)
            .await?
            .into_iter()
            .next()
            .filter(|entry| entry.points > 0);

        let Some(mut hero) = top else {
            info!(week_start = %week_start, "上周无积分记录，不评选 Campus Hero");
            return Ok(None);
        };

        if self
            .rewards
            .award_periodic_badge(hero.user_id, BadgeKind::CampusHero, week_end)
            .await?
            .is_none()
        {
            info!(week_start = %week_start, "其他实例已完成本周期评选，跳过");
            return Ok(None);
        }
        metrics::record_badge_awarded(BadgeKind::CampusHero.as_str());
        hero.rank = 1;

        info!(
            user_id = %hero.user_id,
            points = hero.points,
            week_start = %week_start,
            "Campus Hero 评选完成"
        );

        Ok(Some(hero))
    }
}

fn to_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BadgeAward;
    use crate::repository::{MockItemRepositoryTrait, MockRewardRepositoryTrait};
    use chrono::TimeZone;
    use mockall::predicate::*;

    fn award(user_id: Uuid, kind: BadgeKind) -> BadgeAward {
        BadgeAward {
            id: Uuid::new_v4(),
            user_id,
            badge_type: kind,
            awarded_at: Utc::now(),
        }
    }

    fn service(rewards: MockRewardRepositoryTrait, items: MockItemRepositoryTrait) -> RewardService {
        RewardService::new(Arc::new(rewards), Arc::new(items))
    }

    #[tokio::test]
    async fn test_first_post_awards_points_and_badge() {
        let user = Uuid::new_v4();
        let item = Uuid::new_v4();
        let mut rewards = MockRewardRepositoryTrait::new();
        let mut items = MockItemRepositoryTrait::new();

        rewards
            .expect_record_points()
            .with(eq(user), eq(ActionKind::NewPost), eq(10), eq(Some(item)))
            .times(1)
            .returning(|_, _, _, _| Ok(10));
        items.expect_count_posts_by().returning(|_| Ok(1));
        items.expect_count_claims_helped().returning(|_| Ok(0));
        rewards.expect_list_badges().returning(|_| Ok(vec![]));
        rewards
            .expect_award_badge()
            .with(eq(user), eq(BadgeKind::FirstPost))
            .times(1)
            .returning(|u, k| Ok(Some(award(u, k))));

        let outcome = service(rewards, items)
            .reward(user, ActionKind::NewPost, Some(item))
            .await
            .unwrap();

        assert_eq!(outcome.points_awarded, 10);
        assert_eq!(outcome.total_points, 10);
        assert_eq!(outcome.new_badges, vec![BadgeKind::FirstPost]);
    }

    #[tokio::test]
    async fn test_held_badges_are_not_awarded_again() {
        let user = Uuid::new_v4();
        let mut rewards = MockRewardRepositoryTrait::new();
        let mut items = MockItemRepositoryTrait::new();

        rewards
            .expect_record_points()
            .returning(|_, _, _, _| Ok(120));
        items.expect_count_posts_by().returning(|_| Ok(10));
        items.expect_count_claims_helped().returning(|_| Ok(0));
        rewards
            .expect_list_badges()
            .returning(move |u| Ok(vec![award(u, BadgeKind::FirstPost)]));
        rewards
            .expect_award_badge()
            .with(eq(user), eq(BadgeKind::FinderLevel1))
            .times(1)
            .returning(|u, k| Ok(Some(award(u, k))));

        let outcome = service(rewards, items)
            .reward(user, ActionKind::NewPost, None)
            .await
            .unwrap();

        assert_eq!(outcome.new_badges, vec![BadgeKind::FinderLevel1]);
    }

    #[tokio::test]
    async fn test_claim_helped_unlocks_helpful_neighbor() {
        let poster = Uuid::new_v4();
        let mut rewards = MockRewardRepositoryTrait::new();
        let mut items = MockItemRepositoryTrait::new();

        rewards
            .expect_record_points()
            .with(eq(poster), eq(ActionKind::ClaimVerified), eq(20), always())
            .returning(|_, _, _, _| Ok(400));
        items.expect_count_posts_by().returning(|_| Ok(12));
        items.expect_count_claims_helped().returning(|_| Ok(10));
        rewards.expect_list_badges().returning(move |u| {
            Ok(vec![
                award(u, BadgeKind::FirstPost),
                award(u, BadgeKind::FinderLevel1),
            ])
        });
        rewards
            .expect_award_badge()
            .with(eq(poster), eq(BadgeKind::HelpfulNeighbor))
            .times(1)
            .returning(|u, k| Ok(Some(award(u, k))));

        let outcome = service(rewards, items)
            .reward(poster, ActionKind::ClaimVerified, Some(Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(outcome.points_awarded, 20);
        assert_eq!(outcome.new_badges, vec![BadgeKind::HelpfulNeighbor]);
    }

    #[tokio::test]
    async fn test_comment_skips_badge_evaluation() {
        let mut rewards = MockRewardRepositoryTrait::new();
        let items = MockItemRepositoryTrait::new();

        rewards
            .expect_record_points()
            .with(always(), eq(ActionKind::Comment), eq(2), always())
            .returning(|_, _, _, _| Ok(2));
        rewards.expect_list_badges().never();

        let outcome = service(rewards, items)
            .reward(Uuid::new_v4(), ActionKind::Comment, None)
            .await
            .unwrap();

        assert_eq!(outcome.points_awarded, 2);
        assert!(outcome.new_badges.is_empty());
    }

    #[tokio::test]
    async fn test_crown_weekly_hero_uses_previous_week() {
        let hero = Uuid::new_v4();
        // 周一 00:00 触发
        let now = Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap();
        let week_start = Utc.with_ymd_and_hms(2026, 10, 5, 0, 0, 0).unwrap();
        let mut rewards = MockRewardRepositoryTrait::new();

        rewards
            .expect_badge_awarded_since()
            .with(eq(BadgeKind::CampusHero), eq(now))
            .returning(|_, _| Ok(false));
        rewards
            .expect_leaderboard()
            .with(eq(Some(week_start)), eq(Some(now)), eq(1))
            .returning(move |_, _, _| {
                Ok(vec![LeaderboardEntry {
                    rank: 0,
                    user_id: hero,
                    display_name: "Diana".to_string(),
                    avatar_url: None,
                    points: 85,
                }])
            });
        rewards
            .expect_award_periodic_badge()
            .with(eq(hero), eq(BadgeKind::CampusHero), eq(now))
            .times(1)
            .returning(|u, k, _| Ok(Some(award(u, k))));

        let crowned = service(rewards, MockItemRepositoryTrait::new())
            .crown_weekly_hero(now)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(crowned.user_id, hero);
        assert_eq!(crowned.rank, 1);
    }

    #[tokio::test]
    async fn test_crown_weekly_hero_once_per_week() {
        let mut rewards = MockRewardRepositoryTrait::new();
        rewards
            .expect_badge_awarded_since()
            .returning(|_, _| Ok(true));
        rewards.expect_leaderboard().never();
        rewards.expect_award_periodic_badge().never();

        let crowned = service(rewards, MockItemRepositoryTrait::new())
            .crown_weekly_hero(Utc::now())
            .await
            .unwrap();

        assert!(crowned.is_none());
    }

    #[tokio::test]
    async fn test_crown_weekly_hero_requires_points() {
        let mut rewards = MockRewardRepositoryTrait::new();
        rewards
            .expect_badge_awarded_since()
            .returning(|_, _| Ok(false));
        rewards.expect_leaderboard().returning(|_, _, _| Ok(vec![]));
        rewards.expect_award_periodic_badge().never();

        let crowned = service(rewards, MockItemRepositoryTrait::new())
            .crown_weekly_hero(Utc::now())
            .await
            .unwrap();

        assert!(crowned.is_none());
    }

    #[tokio::test]
    async fn test_crown_weekly_hero_loses_race_to_other_instance() {
        let mut rewards = MockRewardRepositoryTrait::new();
        rewards
            .expect_badge_awarded_since()
            .returning(|_, _| Ok(false));
        rewards.expect_leaderboard().returning(|_, _, _| {
            Ok(vec![LeaderboardEntry {
                rank: 0,
                user_id: Uuid::new_v4(),
                display_name: "Evan".to_string(),
                avatar_url: None,
                points: 40,
            }])
        });
        rewards
            .expect_award_periodic_badge()
            .times(1)
            .returning(|_, _, _| Ok(None));

        let crowned = service(rewards, MockItemRepositoryTrait::new())
            .crown_weekly_hero(Utc::now())
            .await
            .unwrap();

        assert!(crowned.is_none());
    }

    #[tokio::test]
    async fn test_concurrently_awarded_badge_is_not_reported() {
        let user = Uuid::new_v4();
        let mut rewards = MockRewardRepositoryTrait::new();
        let mut items = MockItemRepositoryTrait::new();

        rewards.expect_record_points().returning(|_, _, _, _| Ok(10));
        items.expect_count_posts_by().returning(|_| Ok(1));
        items.expect_count_claims_helped().returning(|_| Ok(0));
        rewards.expect_list_badges().returning(|_| Ok(vec![]));
        // 另一个请求已先写入 FirstPost
        rewards
            .expect_award_badge()
            .with(eq(user), eq(BadgeKind::FirstPost))
            .times(1)
            .returning(|_, _| Ok(None));

        let outcome = service(rewards, items)
            .reward(user, ActionKind::NewPost, None)
            .await
            .unwrap();

        assert!(outcome.new_badges.is_empty());
    }

    #[tokio::test]
    async fn test_reward_once_skips_existing_record() {
        let comment = Uuid::new_v4();
        let mut rewards = MockRewardRepositoryTrait::new();
        rewards
            .expect_record_points_once()
            .with(always(), eq(ActionKind::HelpfulComment), eq(5), eq(comment))
            .times(1)
            .returning(|_, _, _, _| Ok(None));
        rewards.expect_list_badges().never();

        let outcome = service(rewards, MockItemRepositoryTrait::new())
            .reward_once(Uuid::new_v4(), ActionKind::HelpfulComment, comment)
            .await
            .unwrap();

        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_reward_once_records_first_mark() {
        let comment = Uuid::new_v4();
        let mut rewards = MockRewardRepositoryTrait::new();
        rewards
            .expect_record_points_once()
            .with(always(), eq(ActionKind::HelpfulComment), eq(5), eq(comment))
            .times(1)
            .returning(|_, _, _, _| Ok(Some(7)));

        let outcome = service(rewards, MockItemRepositoryTrait::new())
            .reward_once(Uuid::new_v4(), ActionKind::HelpfulComment, comment)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.points_awarded, 5);
        assert_eq!(outcome.total_points, 7);
    }
}
