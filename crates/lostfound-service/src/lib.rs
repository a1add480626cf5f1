//! 校园失物招领服务
//!
//! 提供物品发布、认领、评论以及积分与徽章激励的 REST API。
//!
//! ## 核心功能
//!
//! - **物品流转**：发布拾获物品（附 1~3 张图片）、认领、删除、管理员审核
//! - **评论互动**：评论物品，发布者可将评论标记为有帮助
//! - **积分激励**：按行为发放积分，达到门槛自动授予徽章
//! - **排行榜**：周榜、月榜、总榜，每周一评选 Campus Hero
//!
//! ## 模块结构
//!
//! - `models`: 领域模型
//! - `repository`: 数据访问（PostgreSQL）
//! - `service`: 业务逻辑
//! - `handlers` / `routes`: HTTP 接口
//! - `worker`: 后台定时任务

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod worker;

pub use error::{Result, ServiceError};
pub use state::AppState;
