use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod error;
pub mod flights;
pub mod metrics;
pub mod middleware;
pub mod offers;
pub mod state;

pub use error::AppError;
pub use state::{AppState, AuthConfig, Repositories};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::USER_AGENT]);

    let api = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::routes())
        .nest("/flights", flights::routes())
        .nest("/bookings", bookings::routes())
        .nest("/offers", offers::routes());

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(metrics::export))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), metrics::track_requests))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Flight booking API is running",
        "timestamp": chrono::Utc::now(),
    }))
}
