use aerobook_order::CreateBookingRequest;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use tracing::info;

use crate::{
    error::AppError,
    middleware::{AdminUser, CurrentUser},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(all_bookings).post(create_booking))
        .route("/my-bookings", get(my_bookings))
        .route("/{id}", get(get_booking))
        .route("/{id}/cancel", put(cancel_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = match state.bookings.create(&actor, req).await {
        Ok(booking) => booking,
        Err(e) => {
            state.metrics.record_booking("rejected");
            return Err(e.into());
        }
    };
    state.metrics.record_booking("created");
    info!(booking_reference = %booking.booking_reference, user = %actor.user_id, "Booking created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Booking created successfully",
            "data": booking,
        })),
    ))
}

async fn my_bookings(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.bookings.my_bookings(&actor).await?;
    Ok(Json(json!({
        "success": true,
        "count": bookings.len(),
        "data": bookings,
    })))
}

async fn get_booking(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.bookings.get_booking(&actor, &id).await?;
    Ok(Json(json!({ "success": true, "data": booking })))
}

async fn cancel_booking(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.bookings.cancel(&actor, &id).await?;
    state.metrics.record_booking("cancelled");

    Ok(Json(json!({
        "success": true,
        "message": "Booking cancelled successfully",
        "data": booking,
    })))
}

async fn all_bookings(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.bookings.all_bookings(&admin).await?;
    Ok(Json(json!({
        "success": true,
        "count": bookings.len(),
        "data": bookings,
    })))
}
