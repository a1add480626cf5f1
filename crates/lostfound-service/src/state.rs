//! 应用状态定义

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::service::{ItemService, QueryService, RewardService};

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<ItemService>,
    pub queries: Arc<QueryService>,
    pub rewards: Arc<RewardService>,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(
        items: Arc<ItemService>,
        queries: Arc<QueryService>,
        rewards: Arc<RewardService>,
        jwt: Arc<JwtManager>,
    ) -> Self {
        Self {
            items,
            queries,
            rewards,
            jwt,
        }
    }
}
