use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    error::AppError,
    models::auth::{AuthenticatedUser, Claims},
};

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Authorization header required"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        let secret = parts
            .extensions
            .get::<JwtSecret>()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("JWT secret not configured")))?;

        decode_access_token(token, &secret.0).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::unauthorized("Invalid token")
        })
    }
}

/// Extension type to carry the JWT secret through request extensions.
#[derive(Clone)]
pub struct JwtSecret(pub String);

pub fn decode_access_token(token: &str, secret: &str) -> anyhow::Result<AuthenticatedUser> {
    decode_access_token_at(token, secret, Utc::now().timestamp())
}

/// Verify `token` against `secret` as if the current time were `now`
/// (unix seconds). A token stops being valid at its `exp` second.
pub fn decode_access_token_at(
    token: &str,
    secret: &str,
    now: i64,
) -> anyhow::Result<AuthenticatedUser> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    // exp is compared against `now` below, with no leeway.
    validation.validate_exp = false;

    let data = decode::<Claims>(token, &key, &validation)?;
    let claims = data.claims;

    if i64::try_from(claims.exp)? <= now {
        anyhow::bail!("token expired");
    }

    Ok(AuthenticatedUser {
        user_id: claims.sub.parse()?,
        email: claims.email,
    })
}
