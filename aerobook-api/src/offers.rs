use aerobook_core::promotion::PromotionDraft;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::{error::AppError, middleware::AdminUser, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(active_offers).post(create_offer))
        .route("/all", get(all_offers))
        .route("/{id}", get(get_offer).put(update_offer).delete(delete_offer))
}

async fn active_offers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let offers = state.promotions.list_active().await?;
    Ok(Json(json!({
        "success": true,
        "count": offers.len(),
        "data": offers,
    })))
}

async fn all_offers(State(state): State<AppState>, AdminUser(_admin): AdminUser) -> Result<impl IntoResponse, AppError> {
    let offers = state.promotions.list_all().await?;
    Ok(Json(json!({
        "success": true,
        "count": offers.len(),
        "data": offers,
    })))
}

async fn get_offer(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let offer = state.promotions.get(&id).await?;
    Ok(Json(json!({ "success": true, "data": offer })))
}

async fn create_offer(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(draft): Json<PromotionDraft>,
) -> Result<impl IntoResponse, AppError> {
    let offer = state.promotions.create(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Offer created successfully",
            "data": offer,
        })),
    ))
}

async fn update_offer(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(draft): Json<PromotionDraft>,
) -> Result<impl IntoResponse, AppError> {
    let offer = state.promotions.update(&id, draft).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Offer updated successfully",
        "data": offer,
    })))
}

async fn delete_offer(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.promotions.delete(&id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Offer deleted successfully",
    })))
}
