use aerobook_core::Role;
use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::issue_token, state::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    user_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/guest", post(login_guest))
}

/// Issues a user-role token for a fresh guest identity.
async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, AppError> {
    let user_id = format!("guest-{}", Uuid::new_v4());
    let token = issue_token(&state.auth, &user_id, Role::User)?;
    info!(user_id = %user_id, "Guest session issued");

    Ok(Json(AuthResponse { token, user_id }))
}
