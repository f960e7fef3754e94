//! Admin authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{admin::AdminClaims, Admin},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Verify credentials and issue a JWT. The same error is returned for an
    /// unknown username and a wrong password.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, Admin)> {
        let admin = self
            .repository
            .admins
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("invalid username or password".to_string())
            })?;

        let parsed = PasswordHash::new(&admin.password_hash)
            .map_err(|e| AppError::Internal(format!("corrupt password hash: {}", e)))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AppError::Authentication("invalid username or password".to_string()))?;

        let now = Utc::now();
        let claims = AdminClaims {
            sub: admin.id,
            username: admin.username.clone(),
            iss: self.config.jwt_issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.jwt_expiration_hours as i64)).timestamp(),
        };
        let token = claims
            .to_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))?;

        tracing::info!(admin_id = admin.id, "admin logged in");

        Ok((token, admin))
    }

    /// Hash a password with argon2id and a fresh random salt
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Create the default administrator account on an empty admins table so a
    /// fresh deployment can be logged into. Logs a warning telling the
    /// operator to change the password.
    pub async fn ensure_default_admin(&self) -> AppResult<()> {
        if self.repository.admins.count().await? > 0 {
            return Ok(());
        }
        let hash = self.hash_password("admin123")?;
        self.repository
            .admins
            .create("admin", &hash, "Administrator")
            .await?;
        tracing::warn!("created default admin account 'admin'; change its password");
        Ok(())
    }

    /// Resolve the admin behind a set of verified claims
    pub async fn current_admin(&self, claims: &AdminClaims) -> AppResult<Admin> {
        self.repository
            .admins
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Authentication("admin account no longer exists".to_string()))
    }
}
