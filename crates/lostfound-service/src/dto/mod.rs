//! HTTP 层数据传输对象

pub mod request;
pub mod response;

pub use request::{CreateCommentRequest, FeedQuery, LeaderboardQuery};
pub use response::ApiResponse;
