//! 连接认证
//!
//! 凭证的签发归外部认证服务，网关只在握手时验证 bearer token。
//! 任何失败（缺失、格式错误、过期、签名无效）都以同样的方式拒绝
//! 连接，不向对端透露具体原因。

use axum::http::HeaderMap;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use config::JwtConfig;
use domain::UserId;

/// 握手成功后附着在连接上的身份。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub username: String,
}

/// 认证失败。刻意不区分失败原因。
#[derive(Debug, Error)]
#[error("invalid credential")]
pub struct AuthError;

/// 凭证验证接口，外部认证服务的本地代理。
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// JWT Claims 结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: i64,
}

/// 基于 HS256 JWT 的凭证验证器
pub struct JwtCredentialVerifier {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtCredentialVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 签发 token。核心不签发凭证，这个入口给集成测试和运维工具用。
    pub fn issue_token(&self, user_id: UserId, username: &str) -> Result<String, AuthError> {
        let exp = chrono::Utc::now() + chrono::Duration::hours(self.config.expiration_hours);
        let claims = Claims {
            sub: Uuid::from(user_id),
            username: username.to_owned(),
            exp: exp.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|err| {
            tracing::debug!(error = %err, "token generation failed");
            AuthError
        })
    }
}

impl CredentialVerifier for JwtCredentialVerifier {
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|err| {
                // 具体原因只进日志，不回传给对端
                tracing::debug!(error = %err, "credential rejected");
                AuthError
            })?;
        Ok(AuthenticatedUser {
            user_id: UserId::from(data.claims.sub),
            username: data.claims.username,
        })
    }
}

/// 从握手元数据里提取 bearer token：优先 Authorization 头，
/// 其次 `?token=` 查询参数。
pub(crate) fn extract_token<'a>(headers: &'a HeaderMap, query_token: Option<&'a str>) -> Option<&'a str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .or(query_token)
}
