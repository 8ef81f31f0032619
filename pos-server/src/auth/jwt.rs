//! JWT 令牌服务
//!
//! 处理 JWT 令牌的生成、验证和解析。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::models::Role;
use std::str::FromStr;
use thiserror::Error;

use super::permissions::permissions_for;

/// 密钥最小长度
pub const MIN_SECRET_LEN: usize = 32;

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT 密钥 (至少 32 字节)
    pub secret: String,
    /// 令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl JwtConfig {
    /// 从环境变量加载
    ///
    /// | 环境变量 | 默认值 |
    /// |----------|--------|
    /// | JWT_SECRET | 开发环境随机生成，生产环境必填 |
    /// | JWT_EXPIRATION_MINUTES | 720 |
    /// | JWT_ISSUER | pos-server |
    /// | JWT_AUDIENCE | pos-clients |
    pub fn from_env(is_production: bool) -> Result<Self, JwtError> {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => {
                if secret.len() < MIN_SECRET_LEN {
                    return Err(JwtError::ConfigError(format!(
                        "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
                    )));
                }
                secret
            }
            Err(_) if is_production => {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production".to_string(),
                ));
            }
            Err(_) => {
                tracing::warn!(
                    "JWT_SECRET not set, generating a temporary key. Tokens will not survive a restart."
                );
                generate_printable_secret()?
            }
        };

        Ok(Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(720), // 默认 12 小时 (一个营业日)
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "pos-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "pos-clients".to_string()),
        })
    }

    /// 固定密钥 + 默认其余项 (测试用)
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes: 720,
            issuer: "pos-server".to_string(),
            audience: "pos-clients".to_string(),
        }
    }
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户名
    pub username: String,
    /// 角色
    pub role: String,
    /// 权限列表 (逗号分隔)
    pub permissions: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("密钥生成失败: {0}")]
    KeyGenerationFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// 生成可打印的安全 JWT 密钥 (开发环境)
fn generate_printable_secret() -> Result<String, JwtError> {
    const ALLOWED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    rng.fill(&mut bytes).map_err(|_| {
        JwtError::KeyGenerationFailed("Failed to generate secure random key".to_string())
    })?;

    // 64 个字符，ALLOWED 长度为 64，取模无偏
    Ok(bytes
        .iter()
        .map(|b| ALLOWED[(*b as usize) % ALLOWED.len()] as char)
        .collect())
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("expiration_minutes", &self.config.expiration_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为用户生成新令牌，权限由角色决定
    pub fn generate_token(&self, user_id: i64, username: &str, role: Role) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.as_str().to_string(),
            permissions: permissions_for(role).join(","),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }

    /// 令牌有效期 (秒)
    pub fn expires_in_seconds(&self) -> i64 {
        self.config.expiration_minutes * 60
    }
}

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建，注入到请求扩展
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: i64,
    /// 用户名
    pub username: String,
    /// 角色
    pub role: Role,
    /// 权限列表
    pub permissions: Vec<String>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("invalid subject: {}", claims.sub)))?;
        let role = Role::from_str(&claims.role)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;
        let permissions = if claims.permissions.is_empty() {
            vec![]
        } else {
            claims
                .permissions
                .split(',')
                .map(|s| s.to_string())
                .collect()
        };

        Ok(Self {
            id,
            username: claims.username,
            role,
            permissions,
        })
    }
}

impl CurrentUser {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    /// 检查是否拥有指定权限
    ///
    /// 支持通配符：`"orders:*"` 匹配 `"orders:write"` 等
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| {
            if p == permission {
                return true;
            }
            match p.strip_suffix(":*") {
                Some(prefix) => permission
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with(':')),
                None => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig::with_secret(
            "test-secret-that-is-long-enough-for-hs256",
        ))
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = service();
        let token = service.generate_token(42, "owner1", Role::Owner).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "owner1");
        assert_eq!(claims.role, "owner");
        assert_eq!(claims.iss, "pos-server");

        let user = CurrentUser::try_from(claims).unwrap();
        assert_eq!(user.id, 42);
        assert!(user.is_owner());
        assert!(user.has_permission("statistics:view"));
    }

    #[test]
    fn test_receptionist_lacks_statistics() {
        let service = service();
        let token = service.generate_token(7, "front", Role::Receptionist).unwrap();
        let user = CurrentUser::try_from(service.validate_token(&token).unwrap()).unwrap();

        assert!(!user.is_owner());
        assert!(user.has_permission("orders:write"));
        assert!(!user.has_permission("statistics:view"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().generate_token(1, "a", Role::Owner).unwrap();
        let other = JwtService::with_config(JwtConfig::with_secret(
            "another-secret-that-is-long-enough-as-well",
        ));
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut config = JwtConfig::with_secret("test-secret-that-is-long-enough-for-hs256");
        config.expiration_minutes = -10;
        let service = JwtService::with_config(config);

        let token = service.generate_token(1, "a", Role::Owner).unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let token = service().generate_token(1, "a", Role::Owner).unwrap();
        let mut config = JwtConfig::with_secret("test-secret-that-is-long-enough-for-hs256");
        config.audience = "someone-else".to_string();
        assert!(JwtService::with_config(config).validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }

    #[test]
    fn test_wildcard_permission() {
        let user = CurrentUser {
            id: 1,
            username: "a".into(),
            role: Role::Receptionist,
            permissions: vec!["orders:*".into()],
        };
        assert!(user.has_permission("orders:delete"));
        assert!(!user.has_permission("ordersx:delete"));
        assert!(!user.has_permission("statistics:view"));
    }

    #[test]
    fn test_printable_secret() {
        let secret = generate_printable_secret().unwrap();
        assert_eq!(secret.len(), 64);
        assert!(secret.len() >= MIN_SECRET_LEN);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
