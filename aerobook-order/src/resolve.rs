use std::sync::Arc;

use aerobook_core::flight::parse_departure_date;
use aerobook_core::repository::FlightRepository;
use aerobook_core::{CoreError, CoreResult, FareClass, Flight, FlightDetails, PriceMap, SeatCount, SeatMap};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::models::CreateBookingRequest;

/// The flight a booking request refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedFlight {
    Inventory(Flight),
    External(FlightDetails),
}

impl ResolvedFlight {
    pub fn unit_price(&self, class: FareClass) -> Option<i64> {
        match self {
            ResolvedFlight::Inventory(f) => Some(*f.price.get(class)),
            ResolvedFlight::External(d) => d.price.get(class),
        }
    }

    /// Seat counts are only tracked for inventory flights.
    pub fn seats(&self, class: FareClass) -> Option<&SeatCount> {
        match self {
            ResolvedFlight::Inventory(f) => Some(f.seats.get(class)),
            ResolvedFlight::External(_) => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, ResolvedFlight::External(_))
    }
}

/// Price map used when an external booking arrives without one.
pub const DEFAULT_EXTERNAL_PRICES: PriceMap = PriceMap {
    economy: Some(4999),
    business: Some(12999),
    first: Some(19999),
};

/// Display-only seat counts for external offers. Never checked or decremented.
pub const DEFAULT_EXTERNAL_SEATS: SeatMap = SeatMap {
    economy: SeatCount { total: 150, available: 120 },
    business: SeatCount { total: 30, available: 25 },
    first: SeatCount { total: 10, available: 8 },
};

pub struct FlightResolver {
    flights: Arc<dyn FlightRepository>,
    external_marker: String,
}

impl FlightResolver {
    pub fn new(flights: Arc<dyn FlightRepository>, external_marker: impl Into<String>) -> Self {
        Self {
            flights,
            external_marker: external_marker.into(),
        }
    }

    pub fn is_external_id(&self, flight_id: &str) -> bool {
        flight_id.starts_with(&self.external_marker)
    }

    pub async fn resolve(&self, req: &CreateBookingRequest) -> CoreResult<ResolvedFlight> {
        let flight_id = req.flight_id.trim();
        if flight_id.is_empty() {
            return Err(CoreError::InvalidArgument("Flight ID is required".to_string()));
        }

        if self.is_external_id(flight_id) {
            debug!(flight_id, "Resolving external offer from request metadata");
            return Ok(ResolvedFlight::External(external_snapshot(flight_id, req)));
        }

        let id = Uuid::parse_str(flight_id).map_err(|_| CoreError::NotFound("Flight not found".to_string()))?;
        self.flights
            .get_flight(id)
            .await?
            .map(ResolvedFlight::Inventory)
            .ok_or_else(|| CoreError::NotFound("Flight not found".to_string()))
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Trust the caller's display metadata for an external offer, filling gaps
/// with fixed defaults. The price map is replaced only when absent as a whole.
fn external_snapshot(flight_id: &str, req: &CreateBookingRequest) -> FlightDetails {
    FlightDetails {
        offer_id: flight_id.to_string(),
        flight_number: or_default(&req.flight_number, "AI101"),
        airline: or_default(&req.airline, "Air India"),
        source: or_default(&req.source, "Delhi"),
        destination: or_default(&req.destination, "Mumbai"),
        departure_date: req
            .departure_date
            .as_deref()
            .and_then(parse_departure_date)
            .unwrap_or_else(Utc::now),
        departure_time: or_default(&req.departure_time, "08:00"),
        arrival_time: or_default(&req.arrival_time, "10:15"),
        duration: None,
        price: req.price.unwrap_or(DEFAULT_EXTERNAL_PRICES),
        seats: Some(DEFAULT_EXTERNAL_SEATS),
        external: true,
    }
}
