use std::sync::Arc;

use aerobook_core::flight::{parse_departure_date, FarePrices};
use aerobook_core::repository::{FlightRepository, RepositoryError};
use aerobook_core::search::{FlightFilter, FlightSort};
use aerobook_core::{parse_id, CoreError, CoreResult, FareClass, Flight, FlightStatus, PriceMap, SeatMap};
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::inventory::validate_counts;

/// Administrator payload for creating or editing a flight.
///
/// Every field is optional so the same shape serves partial updates;
/// `into_flight` enforces the fields a new flight needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDraft {
    pub flight_number: Option<String>,
    pub airline: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub departure_date: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub duration: Option<String>,
    pub price: Option<PriceMap>,
    pub seats: Option<SeatMap>,
    pub status: Option<FlightStatus>,
}

fn required(value: Option<String>, message: &str) -> CoreResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CoreError::InvalidArgument(message.to_string())),
    }
}

fn clock_time(value: String, field: &str) -> CoreResult<String> {
    NaiveTime::parse_from_str(&value, "%H:%M")
        .map(|_| value)
        .map_err(|_| CoreError::InvalidArgument(format!("{} must be in HH:MM format", field)))
}

fn fare_prices(price: PriceMap) -> CoreResult<FarePrices> {
    let mut resolved = FarePrices::default();
    for class in FareClass::ALL {
        match price.get(class) {
            Some(p) if p > 0 => *resolved.get_mut(class) = p,
            _ => {
                return Err(CoreError::InvalidArgument(format!(
                    "Price for {} class must be a positive number",
                    class
                )))
            }
        }
    }
    Ok(resolved)
}

fn seat_map(seats: SeatMap) -> CoreResult<SeatMap> {
    for class in FareClass::ALL {
        validate_counts(seats.get(class)).map_err(|e| CoreError::InvalidArgument(format!("{} class: {}", class, e)))?;
    }
    Ok(seats)
}

impl FlightDraft {
    /// Validate and normalize into a new inventory flight.
    pub fn into_flight(self) -> CoreResult<Flight> {
        let flight_number = required(self.flight_number, "Flight number is required")?.to_uppercase();
        let airline = required(self.airline, "Airline is required")?;
        let source = required(self.source, "Source city is required")?;
        let destination = required(self.destination, "Destination city is required")?;
        let departure_date = self
            .departure_date
            .as_deref()
            .and_then(parse_departure_date)
            .ok_or_else(|| CoreError::InvalidArgument("Please provide a valid departure date".to_string()))?;
        let departure_time = clock_time(required(self.departure_time, "Departure time is required")?, "Departure time")?;
        let arrival_time = clock_time(required(self.arrival_time, "Arrival time is required")?, "Arrival time")?;
        let duration = required(self.duration, "Duration is required")?;
        let price = fare_prices(self.price.unwrap_or_default())?;
        let seats = seat_map(
            self.seats
                .ok_or_else(|| CoreError::InvalidArgument("Seat counts are required".to_string()))?,
        )?;

        Ok(Flight {
            id: Uuid::new_v4(),
            flight_number,
            airline,
            source,
            destination,
            departure_date,
            departure_time,
            arrival_time,
            duration,
            price,
            seats,
            status: self.status.unwrap_or_default(),
            created_at: Utc::now(),
        })
    }

    /// Overlay the present fields onto an existing flight, revalidating each.
    pub fn apply_to(self, flight: &mut Flight) -> CoreResult<()> {
        if self.flight_number.is_some() {
            flight.flight_number = required(self.flight_number, "Flight number is required")?.to_uppercase();
        }
        if self.airline.is_some() {
            flight.airline = required(self.airline, "Airline is required")?;
        }
        if self.source.is_some() {
            flight.source = required(self.source, "Source city is required")?;
        }
        if self.destination.is_some() {
            flight.destination = required(self.destination, "Destination city is required")?;
        }
        if let Some(raw) = self.departure_date {
            flight.departure_date = parse_departure_date(&raw)
                .ok_or_else(|| CoreError::InvalidArgument("Please provide a valid departure date".to_string()))?;
        }
        if self.departure_time.is_some() {
            flight.departure_time =
                clock_time(required(self.departure_time, "Departure time is required")?, "Departure time")?;
        }
        if self.arrival_time.is_some() {
            flight.arrival_time = clock_time(required(self.arrival_time, "Arrival time is required")?, "Arrival time")?;
        }
        if self.duration.is_some() {
            flight.duration = required(self.duration, "Duration is required")?;
        }
        if let Some(price) = self.price {
            // Classes left out of the update keep their current price.
            let merged = PriceMap {
                economy: price.economy.or(Some(flight.price.economy)),
                business: price.business.or(Some(flight.price.business)),
                first: price.first.or(Some(flight.price.first)),
            };
            flight.price = fare_prices(merged)?;
        }
        if let Some(seats) = self.seats {
            flight.seats = seat_map(seats)?;
        }
        if let Some(status) = self.status {
            flight.status = status;
        }
        Ok(())
    }
}

/// Administrative access to the flight inventory.
pub struct FlightCatalog {
    repo: Arc<dyn FlightRepository>,
}

impl FlightCatalog {
    pub fn new(repo: Arc<dyn FlightRepository>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, id: &str) -> CoreResult<Flight> {
        let id = parse_id(id, "Flight")?;
        self.repo
            .get_flight(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Flight not found".to_string()))
    }

    pub async fn search(&self, filter: &FlightFilter, sort: FlightSort) -> CoreResult<Vec<Flight>> {
        Ok(self.repo.find_flights(filter, sort).await?)
    }

    pub async fn create(&self, draft: FlightDraft) -> CoreResult<Flight> {
        let flight = draft.into_flight()?;
        self.repo.create_flight(&flight).await.map_err(duplicate_number)?;
        info!(flight_id = %flight.id, flight_number = %flight.flight_number, "Flight created");
        Ok(flight)
    }

    /// Seat counts are written only when the draft carries them; otherwise
    /// availability stays with the booking pipeline.
    pub async fn update(&self, id: &str, draft: FlightDraft) -> CoreResult<Flight> {
        let mut flight = self.get(id).await?;
        let seats_changed = draft.seats.is_some();
        draft.apply_to(&mut flight)?;

        self.repo.update_flight(&flight).await.map_err(duplicate_number)?;
        if seats_changed {
            self.repo.set_seats(flight.id, &flight.seats).await?;
        }
        info!(flight_id = %flight.id, seats_changed, "Flight updated");

        self.repo
            .get_flight(flight.id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Flight not found".to_string()))
    }

    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        let id = parse_id(id, "Flight")?;
        if !self.repo.delete_flight(id).await? {
            warn!(flight_id = %id, "Delete requested for unknown flight");
            return Err(CoreError::NotFound("Flight not found".to_string()));
        }
        info!(flight_id = %id, "Flight deleted");
        Ok(())
    }
}

fn duplicate_number(err: RepositoryError) -> CoreError {
    match err {
        RepositoryError::DuplicateKey(_) => CoreError::Conflict("Flight number already exists".to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerobook_core::SeatCount;

    fn draft() -> FlightDraft {
        FlightDraft {
            flight_number: Some(" 6e2031 ".to_string()),
            airline: Some("IndiGo".to_string()),
            source: Some("Bangalore".to_string()),
            destination: Some("Hyderabad".to_string()),
            departure_date: Some("2026-04-02".to_string()),
            departure_time: Some("09:40".to_string()),
            arrival_time: Some("10:55".to_string()),
            duration: Some("1h 15m".to_string()),
            price: Some(PriceMap { economy: Some(3899), business: Some(9499), first: Some(15999) }),
            seats: Some(SeatMap::new(SeatCount::new(180, 180), SeatCount::new(12, 12), SeatCount::new(0, 0))),
            status: None,
        }
    }

    #[test]
    fn test_draft_normalizes_flight_number() {
        let flight = draft().into_flight().unwrap();
        assert_eq!(flight.flight_number, "6E2031");
        assert_eq!(flight.status, FlightStatus::Scheduled);
        assert_eq!(flight.price.business, 9499);
    }

    #[test]
    fn test_draft_rejects_missing_price_class() {
        let mut d = draft();
        d.price = Some(PriceMap { economy: Some(3899), business: None, first: Some(15999) });
        let err = d.into_flight().unwrap_err();
        assert_eq!(err, CoreError::InvalidArgument("Price for business class must be a positive number".to_string()));
    }

    #[test]
    fn test_draft_rejects_available_above_total() {
        let mut d = draft();
        d.seats = Some(SeatMap::new(SeatCount::new(10, 11), SeatCount::default(), SeatCount::default()));
        assert!(matches!(d.into_flight(), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_draft_rejects_bad_time() {
        let mut d = draft();
        d.arrival_time = Some("25:99".to_string());
        assert!(d.into_flight().is_err());
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let mut flight = draft().into_flight().unwrap();
        let update = FlightDraft {
            price: Some(PriceMap { economy: Some(4199), business: None, first: None }),
            status: Some(FlightStatus::Delayed),
            ..Default::default()
        };
        update.apply_to(&mut flight).unwrap();

        assert_eq!(flight.price.economy, 4199);
        assert_eq!(flight.price.business, 9499);
        assert_eq!(flight.status, FlightStatus::Delayed);
        assert_eq!(flight.source, "Bangalore");
    }
}
