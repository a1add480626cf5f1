//! 领域模型定义
//!
//! 对应托管后端中的 users、items、images、comments、hashtags、points、badges 表

mod enums;
mod item;
mod reward;
mod user;

pub use enums::{ItemStatus, LeaderboardPeriod};
pub use item::{
    Comment, CommentWithAuthor, Hashtag, Image, Item, ItemSummary, MAX_IMAGE_BYTES,
    MAX_IMAGE_DIMENSION, NewImage, NewItem, is_owned_path, parse_hashtags, upload_prefix,
};
pub use reward::{BadgeAward, LeaderboardEntry, PointRecord};
pub use user::User;
