use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

/// Fixed window per client IP. Redis errors let the request through.
pub async fn rate_limit_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(limiter) = &state.rate_limiter else {
        return next.run(req).await;
    };

    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.ip().to_string());
    let key = format!("ratelimit:{}", ip);

    match limiter
        .redis
        .check_rate_limit(&key, limiter.limits.max_requests, limiter.limits.window_seconds)
        .await
    {
        Ok(true) => next.run(req).await,
        Ok(false) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "success": false,
                "error": "Too many requests from this IP, please try again later.",
            })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Rate limiter unavailable, failing open");
            next.run(req).await
        }
    }
}
