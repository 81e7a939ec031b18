use aerobook_core::PriceMap;
use serde::{Deserialize, Serialize};

/// Booking request as sent by a client.
///
/// Fields stay loosely typed here so that the pipeline can report each
/// problem with its own message instead of a generic decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub flight_id: String,
    #[serde(default)]
    pub passengers: Vec<PassengerInput>,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub payment_method: String,

    // Display metadata for external offers. Ignored for inventory flights.
    pub flight_number: Option<String>,
    pub airline: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub departure_date: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub price: Option<PriceMap>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerInput {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub seat_number: Option<String>,
}
