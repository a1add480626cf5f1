//! 徽章类型与展示元数据
//!
//! 徽章种类是封闭集合，每种徽章对应一条固定的名称、描述和 emoji。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseKindError;

/// 徽章展示信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
}

/// 徽章类型
///
/// 数据库 `badges.badge_type` 列和 JSON 中均以 `first_post` 形式存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum BadgeKind {
    FirstPost,
    #[serde(rename = "finder_level_1")]
    #[sqlx(rename = "finder_level_1")]
    FinderLevel1,
    #[serde(rename = "finder_level_2")]
    #[sqlx(rename = "finder_level_2")]
    FinderLevel2,
    #[serde(rename = "finder_level_3")]
    #[sqlx(rename = "finder_level_3")]
    FinderLevel3,
    CampusHero,
    HelpfulNeighbor,
}

static FIRST_POST: BadgeInfo = BadgeInfo {
    name: "First Post",
    description: "Created your first post",
    emoji: "🎉",
};

static FINDER_LEVEL_1: BadgeInfo = BadgeInfo {
    name: "Finder Level 1",
    description: "Posted 10 items",
    emoji: "🔍",
};

static FINDER_LEVEL_2: BadgeInfo = BadgeInfo {
    name: "Finder Level 2",
    description: "Posted 25 items",
    emoji: "🔎",
};

static FINDER_LEVEL_3: BadgeInfo = BadgeInfo {
    name: "Finder Level 3",
    description: "Posted 50 items",
    emoji: "🏆",
};

static CAMPUS_HERO: BadgeInfo = BadgeInfo {
    name: "Campus Hero",
    description: "Weekly top contributor",
    emoji: "⭐",
};

static HELPFUL_NEIGHBOR: BadgeInfo = BadgeInfo {
    name: "Helpful Neighbor",
    description: "Helped 10 people claim items",
    emoji: "🤝",
};

impl BadgeKind {
    pub const ALL: [BadgeKind; 6] = [
        Self::FirstPost,
        Self::FinderLevel1,
        Self::FinderLevel2,
        Self::FinderLevel3,
        Self::CampusHero,
        Self::HelpfulNeighbor,
    ];

    pub fn metadata(self) -> &'static BadgeInfo {
        match self {
            Self::FirstPost => &FIRST_POST,
            Self::FinderLevel1 => &FINDER_LEVEL_1,
            Self::FinderLevel2 => &FINDER_LEVEL_2,
            Self::FinderLevel3 => &FINDER_LEVEL_3,
            Self::CampusHero => &CAMPUS_HERO,
            Self::HelpfulNeighbor => &HELPFUL_NEIGHBOR,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstPost => "first_post",
            Self::FinderLevel1 => "finder_level_1",
            Self::FinderLevel2 => "finder_level_2",
            Self::FinderLevel3 => "finder_level_3",
            Self::CampusHero => "campus_hero",
            Self::HelpfulNeighbor => "helpful_neighbor",
        }
    }
}

/// 查询徽章的展示信息
pub fn badge_metadata(kind: BadgeKind) -> &'static BadgeInfo {
    kind.metadata()
}

impl fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError::UnknownBadge(s.to_string()))
    }
}
