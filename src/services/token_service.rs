use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    constants::TOKEN_ISSUER,
    error::{AppError, Result},
};

/// Access level granted on a cache or one of its topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    ReadOnly,
    ReadWrite,
    WriteOnly,
    SubscribeOnly,
    PublishOnly,
    PublishSubscribe,
}

impl Role {
    fn is_topic_role(self) -> bool {
        matches!(
            self,
            Role::SubscribeOnly | Role::PublishOnly | Role::PublishSubscribe
        )
    }

    fn can_read(self) -> bool {
        matches!(self, Role::ReadOnly | Role::ReadWrite)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub role: Role,
    pub cache: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Permission {
    pub fn read_only(cache: &str) -> Self {
        Self {
            role: Role::ReadOnly,
            cache: cache.to_string(),
            topic: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String, // player identifier the token was minted for
    pub exp: usize,
    pub iat: usize,
    pub permissions: Vec<Permission>,
}

impl Claims {
    /// True when some cache-level permission lets the bearer read `cache`.
    pub fn can_read_cache(&self, cache: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.topic.is_none() && p.cache == cache && p.role.can_read())
    }
}

#[derive(Debug, Clone)]
pub struct DisposableToken {
    pub auth_token: String,
    pub expires_at: chrono::DateTime<Utc>,
}

/// Mints and checks short-lived, scope-restricted cache credentials.
#[async_trait]
pub trait TokenService: Send + Sync {
    async fn generate_disposable_token(
        &self,
        subject: &str,
        permissions: Vec<Permission>,
        expires_in: Duration,
    ) -> Result<DisposableToken>;

    fn verify(&self, token: &str) -> Result<Claims>;
}

pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

fn validate_permissions(permissions: &[Permission]) -> Result<()> {
    if permissions.is_empty() {
        return Err(AppError::Token("At least one permission is required".to_string()));
    }
    for permission in permissions {
        if permission.cache.trim().is_empty() {
            return Err(AppError::Token("Permission cache name is empty".to_string()));
        }
        if permission.role.is_topic_role() != permission.topic.is_some() {
            return Err(AppError::Token(format!(
                "Role {:?} does not match topic scope {:?}",
                permission.role, permission.topic
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl TokenService for JwtTokenService {
    async fn generate_disposable_token(
        &self,
        subject: &str,
        permissions: Vec<Permission>,
        expires_in: Duration,
    ) -> Result<DisposableToken> {
        validate_permissions(&permissions)?;

        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_signed(expires_in)
            .ok_or_else(|| AppError::Token("Token expiry out of range".to_string()))?;

        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: subject.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: issued_at.timestamp() as usize,
            permissions,
        };

        let auth_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Token(format!("Failed to generate token: {}", e)))?;

        tracing::debug!(
            "Minted disposable token for {} expiring at {}",
            subject,
            expires_at
        );

        Ok(DisposableToken {
            auth_token,
            expires_at,
        })
    }

    fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[TOKEN_ISSUER]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::AuthError("Invalid or expired token".to_string()))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtTokenService {
        JwtTokenService::new("test_signing_secret_0123456789")
    }

    #[tokio::test]
    async fn minted_token_round_trips_permissions() {
        let svc = service();
        let token = svc
            .generate_disposable_token(
                "203.0.113.7",
                vec![Permission::read_only("squirrel-game")],
                Duration::minutes(30),
            )
            .await
            .unwrap();

        let claims = svc.verify(&token.auth_token).unwrap();
        assert_eq!(claims.sub, "203.0.113.7");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert!(claims.can_read_cache("squirrel-game"));
        assert!(!claims.can_read_cache("other-cache"));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let token = JwtTokenService::new("another_secret_abcdefghijk")
            .generate_disposable_token(
                "x",
                vec![Permission::read_only("squirrel-game")],
                Duration::minutes(5),
            )
            .await
            .unwrap();

        let err = service().verify(&token.auth_token).unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let svc = service();
        let token = svc
            .generate_disposable_token(
                "x",
                vec![Permission::read_only("squirrel-game")],
                Duration::minutes(-10),
            )
            .await
            .unwrap();

        assert!(svc.verify(&token.auth_token).is_err());
    }

    #[tokio::test]
    async fn empty_permission_list_is_refused() {
        let result = service()
            .generate_disposable_token("x", Vec::new(), Duration::minutes(30))
            .await;
        assert!(matches!(result, Err(AppError::Token(_))));
    }

    #[tokio::test]
    async fn topic_role_requires_topic() {
        let permission = Permission {
            role: Role::SubscribeOnly,
            cache: "squirrel-game".to_string(),
            topic: None,
        };
        let result = service()
            .generate_disposable_token("x", vec![permission], Duration::minutes(30))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn topic_permissions_do_not_grant_cache_reads() {
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: "x".to_string(),
            exp: 0,
            iat: 0,
            permissions: vec![Permission {
                role: Role::PublishSubscribe,
                cache: "squirrel-game".to_string(),
                topic: Some("player-updates".to_string()),
            }],
        };
        assert!(!claims.can_read_cache("squirrel-game"));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&Permission::read_only("c")).unwrap();
        assert_eq!(json, r#"{"role":"readonly","cache":"c"}"#);
    }
}
