//! 数据访问层
//!
//! 基于 sqlx 的 PostgreSQL 仓储实现，表结构由托管后端维护

mod comment_repo;
mod item_repo;
mod reward_repo;
mod traits;
mod user_repo;

pub use comment_repo::CommentRepository;
pub use item_repo::ItemRepository;
pub use reward_repo::RewardRepository;
pub use traits::{
    CommentRepositoryTrait, ItemRepositoryTrait, RewardRepositoryTrait, UserRepositoryTrait,
};
pub use user_repo::UserRepository;

#[cfg(test)]
pub use traits::{
    MockCommentRepositoryTrait, MockItemRepositoryTrait, MockRewardRepositoryTrait,
    MockUserRepositoryTrait,
};
