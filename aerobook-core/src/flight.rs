use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

/// Cabin fare class. Every price and seat table is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FareClass {
    Economy,
    Business,
    First,
}

impl FareClass {
    pub const ALL: [FareClass; 3] = [FareClass::Economy, FareClass::Business, FareClass::First];

    pub fn as_str(&self) -> &'static str {
        match self {
            FareClass::Economy => "economy",
            FareClass::Business => "business",
            FareClass::First => "first",
        }
    }
}

impl fmt::Display for FareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FareClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "economy" => Ok(FareClass::Economy),
            "business" => Ok(FareClass::Business),
            "first" => Ok(FareClass::First),
            other => Err(CoreError::InvalidArgument(format!("Unknown fare class: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightStatus {
    #[default]
    Scheduled,
    Delayed,
    Cancelled,
    Completed,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Delayed => "delayed",
            FlightStatus::Cancelled => "cancelled",
            FlightStatus::Completed => "completed",
        }
    }
}

impl FromStr for FlightStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(FlightStatus::Scheduled),
            "delayed" => Ok(FlightStatus::Delayed),
            "cancelled" => Ok(FlightStatus::Cancelled),
            "completed" => Ok(FlightStatus::Completed),
            other => Err(CoreError::InvalidArgument(format!("Unknown flight status: {}", other))),
        }
    }
}

/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_departure_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// One value per fare class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FareTable<T> {
    pub economy: T,
    pub business: T,
    pub first: T,
}

impl<T> FareTable<T> {
    pub fn new(economy: T, business: T, first: T) -> Self {
        Self { economy, business, first }
    }

    pub fn get(&self, class: FareClass) -> &T {
        match class {
            FareClass::Economy => &self.economy,
            FareClass::Business => &self.business,
            FareClass::First => &self.first,
        }
    }

    pub fn get_mut(&mut self, class: FareClass) -> &mut T {
        match class {
            FareClass::Economy => &mut self.economy,
            FareClass::Business => &mut self.business,
            FareClass::First => &mut self.first,
        }
    }
}

/// Inventory prices in whole currency units.
pub type FarePrices = FareTable<i64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeatCount {
    pub total: u32,
    pub available: u32,
}

impl SeatCount {
    pub fn new(total: u32, available: u32) -> Self {
        Self { total, available }
    }
}

pub type SeatMap = FareTable<SeatCount>;

/// Price map that may be missing classes. Used for external offers and
/// caller-supplied snapshots where not every cabin is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economy: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<i64>,
}

impl PriceMap {
    pub fn get(&self, class: FareClass) -> Option<i64> {
        match class {
            FareClass::Economy => self.economy,
            FareClass::Business => self.business,
            FareClass::First => self.first,
        }
    }
}

impl From<FarePrices> for PriceMap {
    fn from(prices: FarePrices) -> Self {
        Self {
            economy: Some(prices.economy),
            business: Some(prices.business),
            first: Some(prices.first),
        }
    }
}

/// A scheduled flight held in local inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub departure_date: DateTime<Utc>,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub price: FarePrices,
    pub seats: SeatMap,
    pub status: FlightStatus,
    pub created_at: DateTime<Utc>,
}

/// A flight offer returned by an external provider. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSnapshot {
    pub id: String,
    pub flight_number: String,
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub departure_date: DateTime<Utc>,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub price: PriceMap,
    pub seats: SeatMap,
    pub status: FlightStatus,
    pub external: bool,
}

/// Search result entry: either an inventory flight or an external offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlightListing {
    Inventory(Flight),
    External(OfferSnapshot),
}

impl FlightListing {
    pub fn departure_date(&self) -> DateTime<Utc> {
        match self {
            FlightListing::Inventory(f) => f.departure_date,
            FlightListing::External(o) => o.departure_date,
        }
    }
}

/// Snapshot of an external offer embedded in a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDetails {
    pub offer_id: String,
    pub flight_number: String,
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub departure_date: DateTime<Utc>,
    pub departure_time: String,
    pub arrival_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub price: PriceMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<SeatMap>,
    pub external: bool,
}

impl From<&OfferSnapshot> for FlightDetails {
    fn from(offer: &OfferSnapshot) -> Self {
        Self {
            offer_id: offer.id.clone(),
            flight_number: offer.flight_number.clone(),
            airline: offer.airline.clone(),
            source: offer.source.clone(),
            destination: offer.destination.clone(),
            departure_date: offer.departure_date,
            departure_time: offer.departure_time.clone(),
            arrival_time: offer.arrival_time.clone(),
            duration: Some(offer.duration.clone()).filter(|d| !d.is_empty()),
            price: offer.price,
            seats: Some(offer.seats),
            external: offer.external,
        }
    }
}
