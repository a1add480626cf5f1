//! 枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// 物品状态
///
/// 状态只能单向流转：available -> claimed -> archived，或 available -> archived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum ItemStatus {
    /// 待认领
    #[default]
    Available,
    /// 已被认领
    Claimed,
    /// 已归档
    Archived,
}

impl ItemStatus {
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (Self::Available, Self::Claimed)
                | (Self::Available, Self::Archived)
                | (Self::Claimed, Self::Archived)
        )
    }
}

/// 排行榜统计周期
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardPeriod {
    #[default]
    Weekly,
    Monthly,
    AllTime,
}

impl LeaderboardPeriod {
    /// 统计窗口的起点（UTC）
    ///
    /// 周榜从本周一 00:00 开始，月榜从本月 1 日 00:00 开始，总榜无起点
    pub fn window_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        match self {
            Self::Weekly => {
                let offset = u64::from(today.weekday().num_days_from_monday());
                Some(start_of_day(today - Days::new(offset)))
            }
            Self::Monthly => Some(start_of_day(today - Days::new(u64::from(today.day0())))),
            Self::AllTime => None,
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
