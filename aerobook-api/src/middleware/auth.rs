use aerobook_core::{Actor, CoreError, Role};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

pub fn issue_token(auth: &AuthConfig, user_id: &str, role: Role) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!("Token encoding failed: {}", e)))
}

fn authenticate(parts: &Parts, auth: &AuthConfig) -> Result<Actor, AppError> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Not authorized, token failed".to_string()))?;

    Ok(Actor {
        user_id: data.claims.sub,
        role: data.claims.role,
    })
}

// ============================================================================
// Extractors
// ============================================================================

/// Any authenticated caller.
pub struct CurrentUser(pub Actor);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, &state.auth).map(CurrentUser)
    }
}

/// An authenticated caller with the admin role.
pub struct AdminUser(pub Actor);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let actor = authenticate(parts, &state.auth)?;
        if !actor.is_admin() {
            return Err(CoreError::Forbidden("Admin access required".to_string()).into());
        }
        Ok(AdminUser(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn auth() -> AuthConfig {
        AuthConfig { secret: "test-secret".to_string(), expiration: 3600 }
    }

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header(AUTHORIZATION, h);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_issued_token_round_trips_identity() {
        let token = issue_token(&auth(), "user-7", Role::Admin).unwrap();
        let actor = authenticate(&parts(Some(&format!("Bearer {}", token))), &auth()).unwrap();
        assert_eq!(actor, Actor::admin("user-7"));
    }

    #[test]
    fn test_missing_or_foreign_token_rejected() {
        assert!(matches!(authenticate(&parts(None), &auth()), Err(AppError::Unauthorized(_))));

        let other = AuthConfig { secret: "other".to_string(), expiration: 3600 };
        let token = issue_token(&other, "user-7", Role::User).unwrap();
        let err = authenticate(&parts(Some(&format!("Bearer {}", token))), &auth()).unwrap_err();
        assert_eq!(err.to_string(), "Not authorized, token failed");
    }
}
