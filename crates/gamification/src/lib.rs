//! 积分与徽章账本
//!
//! 失物招领系统中唯一的纯业务逻辑：把用户行为映射为积分增量，把徽章类型映射为展示信息。
//!
//! ## 模块结构
//!
//! - `action`: 行为类型及其积分表
//! - `badge`: 徽章类型及其展示元数据表
//! - `criteria`: 计数类徽章的获取条件
//!
//! 所有查表函数都是对封闭枚举的穷尽 `match`，表数据为 `'static`。

pub mod action;
pub mod badge;
pub mod criteria;
mod error;

pub use action::{ActionKind, points_for};
pub use badge::{BadgeInfo, BadgeKind, badge_metadata};
pub use criteria::{BadgeCriterion, ContributorStats, earned_badges, newly_earned};
pub use error::ParseKindError;
