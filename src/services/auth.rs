use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        auth::Claims,
        user::{LoginRequest, LoginResponse, NewUser, RegisterRequest, User},
    },
    repositories::UserRepository,
};

/// Message shared by every login failure so callers cannot tell which check failed.
const INVALID_CREDENTIALS: &str = "invalid credentials";
const MIN_PASSWORD_LEN: usize = 6;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, config: Arc<Config>) -> Self {
        Self { users, config }
    }

    pub async fn register(&self, req: &RegisterRequest) -> AppResult<User> {
        let email = normalize_email(&req.email);
        let username = req.username.trim();

        if email.is_empty() || !email.contains('@') {
            return Err(AppError::invalid_input("a valid email is required"));
        }
        if username.is_empty() {
            return Err(AppError::invalid_input("username is required"));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid_input(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("user already exists"));
        }

        let password_hash = hash_password(&req.password, self.config.bcrypt_cost)?;
        let user = self
            .users
            .create(&NewUser {
                email,
                username: username.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    pub async fn login(&self, req: &LoginRequest) -> AppResult<LoginResponse> {
        let email = normalize_email(&req.email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::debug!("Login rejected: unknown email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        let valid = bcrypt::verify(&req.password, &user.password_hash).unwrap_or(false);
        if !valid {
            tracing::debug!(user_id = user.id, "Login rejected: password mismatch");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let token = generate_access_token(
            &user,
            &self.config.jwt_secret,
            self.config.jwt_ttl_seconds(),
        )?;

        Ok(LoginResponse { token, user })
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(password: &str, cost: u32) -> anyhow::Result<String> {
    Ok(bcrypt::hash(password, cost)?)
}

pub fn generate_access_token(user: &User, secret: &str, ttl_seconds: u64) -> anyhow::Result<String> {
    generate_access_token_at(user, secret, ttl_seconds, Utc::now().timestamp())
}

/// Issue a token as if the current time were `now` (unix seconds).
pub fn generate_access_token_at(
    user: &User,
    secret: &str,
    ttl_seconds: u64,
    now: i64,
) -> anyhow::Result<String> {
    let iat = usize::try_from(now)?;
    let exp = usize::try_from(ttl_seconds)
        .ok()
        .and_then(|ttl| iat.checked_add(ttl))
        .ok_or_else(|| anyhow::anyhow!("token lifetime of {ttl_seconds}s is out of range"))?;
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        iat,
        exp,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}
