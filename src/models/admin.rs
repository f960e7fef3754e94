//! Admin account model and JWT claims

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Administrator account from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub create_time: DateTime<Utc>,
}

/// JWT claims for an authenticated admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminClaims {
    /// Admin id
    pub sub: i32,
    pub username: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
}

impl AdminClaims {
    pub fn to_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn from_token(
        token: &str,
        secret: &str,
        issuer: &str,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.set_issuer(&[issuer]);
        let data = decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_claims() {
        let now = Utc::now();
        let claims = AdminClaims {
            sub: 1,
            username: "admin".to_string(),
            iss: "libris".to_string(),
            exp: (now.timestamp()) + 3600,
            iat: now.timestamp(),
        };
        let token = claims.to_token("secret").unwrap();
        let decoded = AdminClaims::from_token(&token, "secret", "libris").unwrap();
        assert_eq!(decoded.sub, 1);
        assert_eq!(decoded.username, "admin");
    }

    #[test]
    fn token_rejects_wrong_issuer() {
        let now = Utc::now();
        let claims = AdminClaims {
            sub: 1,
            username: "admin".to_string(),
            iss: "someone-else".to_string(),
            exp: now.timestamp() + 3600,
            iat: now.timestamp(),
        };
        let token = claims.to_token("secret").unwrap();
        assert!(AdminClaims::from_token(&token, "secret", "libris").is_err());
    }
}
