//! 认证模块
//!
//! 校验托管认证服务签发的 JWT，服务端不签发 Token

mod jwt;

pub use jwt::{Claims, JwtManager};
