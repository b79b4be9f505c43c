use std::sync::Arc;

use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::UserId;
use crate::voucher::{VoucherService, VoucherView};

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

impl Claims {
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

/// User Registration Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Ada")]
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[schema(example = "ada@example.com")]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[schema(example = "9876543210")]
    #[validate(custom(function = validate_phone))]
    pub phone: String,
    #[schema(example = "password123")]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

fn validate_phone(phone: &str) -> Result<(), validator::ValidationError> {
    if phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("phone")
            .with_message("Phone must be exactly 10 digits".into()))
    }
}

/// User Login Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[schema(example = "password123")]
    #[validate(length(min = 1, message = "Please provide a password"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = validate_phone))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "zipCode")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    pub new_password: String,
}

/// Public profile row; the password hash never leaves the service.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Auth Response (JWT)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
    /// Welcome voucher, present when one was issued by this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher: Option<VoucherView>,
}

const PROFILE_COLUMNS: &str =
    "user_id, name, email, phone, address, city, zip_code, created_at";

pub struct UserAuthService {
    db: Pool<Postgres>,
    jwt_secret: String,
    token_ttl: Duration,
    vouchers: Arc<VoucherService>,
}

impl UserAuthService {
    pub fn new(
        db: Pool<Postgres>,
        jwt_secret: String,
        token_ttl_hours: i64,
        vouchers: Arc<VoucherService>,
    ) -> Self {
        Self {
            db,
            jwt_secret,
            token_ttl: Duration::hours(token_ttl_hours),
            vouchers,
        }
    }

    /// Register a new user; issues a JWT and (usually) a welcome voucher.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        if req.password != req.confirm_password {
            anyhow::bail!("Passwords do not match");
        }

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Hashing failed: {}", e))?
            .to_string();

        let user: UserProfile = sqlx::query_as(&format!(
            "INSERT INTO users_tb (name, email, phone, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await
        .context("Failed to insert user")?;

        let token = self.issue_token(user.user_id)?;
        let voucher = self.welcome_voucher(user.user_id).await;

        Ok(AuthResponse {
            token,
            user,
            voucher,
        })
    }

    /// Login user and issue JWT
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let row: Option<UserWithHash> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS}, password_hash FROM users_tb WHERE email = $1"
        ))
        .bind(&req.email)
        .fetch_optional(&self.db)
        .await
        .context("DB query failed")?;

        let UserWithHash {
            profile: user,
            password_hash,
        } = row.ok_or_else(|| anyhow::anyhow!("Invalid email or password"))?;

        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| anyhow::anyhow!("Invalid email or password"))?;

        let token = self.issue_token(user.user_id)?;
        let voucher = self.welcome_voucher(user.user_id).await;

        Ok(AuthResponse {
            token,
            user,
            voucher,
        })
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    pub async fn get_profile(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users_tb WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("DB query failed")
    }

    pub async fn update_profile(
        &self,
        user_id: UserId,
        req: UpdateProfileRequest,
    ) -> Result<Option<UserProfile>> {
        sqlx::query_as(&format!(
            "UPDATE users_tb SET \
             name = COALESCE($2, name), \
             phone = COALESCE($3, phone), \
             address = COALESCE($4, address), \
             city = COALESCE($5, city), \
             zip_code = COALESCE($6, zip_code) \
             WHERE user_id = $1 \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&req.name)
        .bind(&req.phone)
        .bind(&req.address)
        .bind(&req.city)
        .bind(&req.zip_code)
        .fetch_optional(&self.db)
        .await
        .context("Failed to update profile")
    }

    pub async fn change_password(&self, user_id: UserId, req: ChangePasswordRequest) -> Result<()> {
        let stored: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users_tb WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await
                .context("DB query failed")?;
        let (password_hash,) = stored.ok_or_else(|| anyhow::anyhow!("User not found"))?;

        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        Argon2::default()
            .verify_password(req.current_password.as_bytes(), &parsed_hash)
            .map_err(|_| anyhow::anyhow!("Current password is incorrect"))?;

        let salt = SaltString::generate(&mut OsRng);
        let new_hash = Argon2::default()
            .hash_password(req.new_password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Hashing failed: {}", e))?
            .to_string();

        sqlx::query("UPDATE users_tb SET password_hash = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(&new_hash)
            .execute(&self.db)
            .await
            .context("Failed to update password")?;
        Ok(())
    }

    fn issue_token(&self, user_id: UserId) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.token_ttl)
            .unwrap_or(now)
            .timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .context("Failed to generate token")
    }

    /// Welcome-voucher issuance must never fail the auth flow.
    async fn welcome_voucher(&self, user_id: UserId) -> Option<VoucherView> {
        match self.vouchers.issue_welcome(user_id).await {
            Ok(voucher) => voucher.as_ref().map(VoucherView::from),
            Err(e) => {
                tracing::warn!(user_id, "welcome voucher issuance failed: {e}");
                None
            }
        }
    }
}

/// Login row: profile plus the hash, fetched in one query.
#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    profile: UserProfile,
    password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("987654321").is_err());
        assert!(validate_phone("98765432100").is_err());
        assert!(validate_phone("98765abcde").is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
            phone: "123".to_string(),
            password: "short".to_string(),
            confirm_password: "short".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("phone"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_claims_user_id_parse() {
        let claims = Claims {
            sub: "42".to_string(),
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), Some(42));

        let bad = Claims {
            sub: "not-a-number".to_string(),
            exp: 0,
            iat: 0,
        };
        assert_eq!(bad.user_id(), None);
    }
}
