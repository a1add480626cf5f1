//! HTTP 中间件与提取器

mod auth;

pub use auth::{CurrentUser, auth_middleware};
