//! HTTP 请求处理器

pub mod admin;
pub mod comment;
pub mod gamification;
pub mod item;
pub mod leaderboard;
pub mod profile;
