//! JWT 认证中间件
//!
//! 携带 Bearer Token 的请求会被校验，通过后将 Claims 注入请求扩展；
//! 未携带 Token 的请求按匿名处理，由 [`CurrentUser`] 决定接口是否需要登录。

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::ServiceError;
use crate::state::AppState;

/// 认证中间件
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match request.headers().get(AUTHORIZATION) {
        None => return next.run(request).await,
        Some(value) => match value.to_str().ok().and_then(|v| v.strip_prefix("Bearer ")) {
            Some(token) => token.trim().to_string(),
            None => {
                return ServiceError::Unauthorized("认证头格式错误".to_string()).into_response();
            }
        },
    };

    match state.jwt.verify_token(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// 当前登录用户
///
/// 需要登录的处理器以此为参数，未登录时返回 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or_else(|| ServiceError::Unauthorized("请先登录".to_string()))?;

        Ok(Self(claims.user_id()?))
    }
}
