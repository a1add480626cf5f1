//! 请求参数定义

use serde::Deserialize;
use validator::Validate;

use crate::models::LeaderboardPeriod;

/// 信息流分页参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// 排行榜查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub period: Option<LeaderboardPeriod>,
    pub limit: Option<i64>,
}

/// 发表评论请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "评论内容不能为空"))]
    pub text: String,
}
