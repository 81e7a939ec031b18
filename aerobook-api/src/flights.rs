use aerobook_catalog::FlightDraft;
use aerobook_core::flight::parse_departure_date;
use aerobook_core::FareClass;
use aerobook_offer::{SearchParams, SearchSource};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, middleware::AdminUser, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_flights).post(create_flight))
        .route("/popular", get(popular_flights))
        .route("/{id}", get(get_flight).put(update_flight).delete(delete_flight))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightQuery {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub class: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub use_amadeus: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl FlightQuery {
    fn into_params(self) -> Result<SearchParams, AppError> {
        let date = match non_empty(self.date) {
            Some(raw) => Some(
                parse_departure_date(&raw)
                    .ok_or_else(|| AppError::BadRequest("Invalid date. Use YYYY-MM-DD".to_string()))?
                    .date_naive(),
            ),
            None => None,
        };
        let class = match non_empty(self.class) {
            Some(raw) => Some(raw.parse::<FareClass>().map_err(|_| {
                AppError::BadRequest("Invalid class. Must be economy, business, or first".to_string())
            })?),
            None => None,
        };

        Ok(SearchParams {
            source: non_empty(self.source),
            destination: non_empty(self.destination),
            date,
            class,
            sort_by: non_empty(self.sort_by),
            sort_order: non_empty(self.sort_order),
            use_external: self.use_amadeus.as_deref() != Some("false"),
        })
    }
}

async fn list_flights(
    State(state): State<AppState>,
    Query(query): Query<FlightQuery>,
) -> Result<impl IntoResponse, AppError> {
    let params = query.into_params()?;
    let result = state.search.search(&params).await?;

    let source = match result.source {
        SearchSource::External => "amadeus",
        SearchSource::Local => "local",
    };
    state.metrics.record_search(source);

    Ok(Json(json!({
        "success": true,
        "count": result.flights.len(),
        "source": result.source,
        "data": result.flights,
    })))
}

async fn popular_flights(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let flights = state.search.popular().await?;
    Ok(Json(json!({
        "success": true,
        "count": flights.len(),
        "data": flights,
    })))
}

async fn get_flight(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let flight = state.catalog.get(&id).await?;
    Ok(Json(json!({ "success": true, "data": flight })))
}

async fn create_flight(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(draft): Json<FlightDraft>,
) -> Result<impl IntoResponse, AppError> {
    let flight = state.catalog.create(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Flight created successfully",
            "data": flight,
        })),
    ))
}

async fn update_flight(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(draft): Json<FlightDraft>,
) -> Result<impl IntoResponse, AppError> {
    let flight = state.catalog.update(&id, draft).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Flight updated successfully",
        "data": flight,
    })))
}

async fn delete_flight(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog.delete(&id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Flight deleted successfully",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_to_external_lookup() {
        let params = FlightQuery {
            source: Some(" Delhi ".to_string()),
            date: Some("2026-03-10".to_string()),
            class: Some("Business".to_string()),
            sort_by: Some(String::new()),
            ..Default::default()
        }
        .into_params()
        .unwrap();

        assert_eq!(params.source.as_deref(), Some("Delhi"));
        assert_eq!(params.date, chrono::NaiveDate::from_ymd_opt(2026, 3, 10));
        assert_eq!(params.class, Some(FareClass::Business));
        assert_eq!(params.sort_by, None);
        assert!(params.use_external);

        let params = FlightQuery { use_amadeus: Some("false".to_string()), ..Default::default() }
            .into_params()
            .unwrap();
        assert!(!params.use_external);
    }

    #[test]
    fn test_bad_date_rejected() {
        let err = FlightQuery { date: Some("tomorrow".to_string()), ..Default::default() }
            .into_params()
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid date. Use YYYY-MM-DD");
    }
}
