//! Prometheus counters and the `/metrics` endpoint.

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{opts, Encoder, IntCounterVec, Registry, TextEncoder};

use crate::state::AppState;

pub struct Metrics {
    registry: Registry,
    /// Labels: `method`, `path` (route template), `status`
    http_requests: IntCounterVec,
    /// Labels: `outcome` (created, cancelled, rejected)
    bookings: IntCounterVec,
    /// Labels: `source` (amadeus, local)
    searches: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests = IntCounterVec::new(
            opts!("aerobook_http_requests_total", "HTTP requests by route and status"),
            &["method", "path", "status"],
        )?;
        let bookings = IntCounterVec::new(
            opts!("aerobook_bookings_total", "Booking operations by outcome"),
            &["outcome"],
        )?;
        let searches = IntCounterVec::new(
            opts!("aerobook_flight_searches_total", "Flight searches by result source"),
            &["source"],
        )?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(bookings.clone()))?;
        registry.register(Box::new(searches.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            bookings,
            searches,
        })
    }

    pub fn record_booking(&self, outcome: &str) {
        self.bookings.with_label_values(&[outcome]).inc();
    }

    pub fn record_search(&self, source: &str) {
        self.searches.with_label_values(&[source]).inc();
    }

    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let response = next.run(req).await;
    state
        .metrics
        .http_requests
        .with_label_values(&[method.as_str(), path.as_str(), response.status().as_str()])
        .inc();
    response
}

/// GET /metrics
pub async fn export(State(state): State<AppState>) -> Response {
    match state.metrics.export() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
