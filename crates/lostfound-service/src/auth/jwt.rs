//! JWT Token 校验

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use lostfound_shared::config::AuthConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;

/// JWT Claims
///
/// `sub` 为用户 ID，与 users 表主键一致
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, ServiceError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| ServiceError::Unauthorized("Token 中的用户 ID 无效".to_string()))
    }
}

/// JWT 管理器
#[derive(Clone)]
pub struct JwtManager {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.as_str()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// 验证并解析 JWT Token
    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => ServiceError::Unauthorized("Token 已过期".to_string()),
                ErrorKind::InvalidAudience => {
                    ServiceError::Unauthorized("Token 受众不匹配".to_string())
                }
                ErrorKind::InvalidToken | ErrorKind::InvalidSignature => {
                    ServiceError::Unauthorized("无效的 Token".to_string())
                }
                _ => ServiceError::Unauthorized(format!("Token 验证失败: {}", e)),
            },
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            audience: "authenticated".to_string(),
        }
    }

    fn token(secret: &str, aud: &str, exp_offset: i64, sub: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            aud: aud.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            email: None,
            role: Some("authenticated".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let user_id = Uuid::new_v4();
        let manager = JwtManager::new(&config());

        let claims = manager
            .verify_token(&token("test-secret", "authenticated", 3600, &user_id.to_string()))
            .unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_expired_token() {
        let manager = JwtManager::new(&config());
        let result = manager.verify_token(&token(
            "test-secret",
            "authenticated",
            -3600,
            &Uuid::new_v4().to_string(),
        ));
        assert!(matches!(result, Err(ServiceError::Unauthorized(msg)) if msg.contains("过期")));
    }

    #[test]
    fn test_wrong_secret_and_audience() {
        let manager = JwtManager::new(&config());
        let sub = Uuid::new_v4().to_string();

        assert!(manager.verify_token(&token("other", "authenticated", 3600, &sub)).is_err());
        assert!(manager.verify_token(&token("test-secret", "anon", 3600, &sub)).is_err());
        assert!(manager.verify_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_non_uuid_subject() {
        let manager = JwtManager::new(&config());
        let claims = manager
            .verify_token(&token("test-secret", "authenticated", 3600, "alice"))
            .unwrap();
        assert!(claims.user_id().is_err());
    }
}
