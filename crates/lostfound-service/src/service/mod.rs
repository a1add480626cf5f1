//! 业务服务层

pub mod dto;
mod item_service;
mod query_service;
mod reward_service;

pub use item_service::ItemService;
pub use query_service::QueryService;
pub use reward_service::RewardService;
