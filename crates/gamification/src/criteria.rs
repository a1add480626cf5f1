//! 徽章获取条件
//!
//! 计数类徽章的门槛直接取自徽章描述（"Posted 10 items" 即发布 10 件）。
//! Campus Hero 按周排行榜评选，不由计数触发。

use serde::{Deserialize, Serialize};

use crate::badge::BadgeKind;

/// 用户贡献统计，由调用方从存储中汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorStats {
    /// 发布的失物数
    pub posts: u32,
    /// 自己发布且已被认领的失物数
    pub claims_helped: u32,
}

/// 徽章获取条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeCriterion {
    /// 发布数达到阈值
    PostCount(u32),
    /// 帮助认领数达到阈值
    ClaimsHelped(u32),
    /// 周排行榜第一，由定时任务评选
    WeeklyTopContributor,
}

impl BadgeCriterion {
    pub fn is_met(&self, stats: &ContributorStats) -> bool {
        match *self {
            Self::PostCount(threshold) => stats.posts >= threshold,
            Self::ClaimsHelped(threshold) => stats.claims_helped >= threshold,
            Self::WeeklyTopContributor => false,
        }
    }
}

impl BadgeKind {
    pub const fn criterion(self) -> BadgeCriterion {
        match self {
            Self::FirstPost => BadgeCriterion::PostCount(1),
            Self::FinderLevel1 => BadgeCriterion::PostCount(10),
            Self::FinderLevel2 => BadgeCriterion::PostCount(25),
            Self::FinderLevel3 => BadgeCriterion::PostCount(50),
            Self::CampusHero => BadgeCriterion::WeeklyTopContributor,
            Self::HelpfulNeighbor => BadgeCriterion::ClaimsHelped(10),
        }
    }
}

/// 按统计数据满足条件的全部计数类徽章（按枚举顺序）
pub fn earned_badges(stats: &ContributorStats) -> Vec<BadgeKind> {
    BadgeKind::ALL
        .into_iter()
        .filter(|kind| kind.criterion().is_met(stats))
        .collect()
}

/// 已满足条件但尚未持有的徽章
pub fn newly_earned(stats: &ContributorStats, held: &[BadgeKind]) -> Vec<BadgeKind> {
    earned_badges(stats)
        .into_iter()
        .filter(|kind| !held.contains(kind))
        .collect()
}
