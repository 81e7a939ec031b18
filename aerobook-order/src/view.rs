use aerobook_core::booking::{BookedFlight, Booking, BookingStatus, Passenger};
use aerobook_core::{FareClass, Flight, FlightDetails, FlightStatus, PaymentMethod, PaymentStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flight display fields shown alongside a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightView {
    pub id: String,
    pub flight_number: String,
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub departure_date: DateTime<Utc>,
    pub departure_time: String,
    pub arrival_time: String,
    pub status: FlightStatus,
}

impl From<&Flight> for FlightView {
    fn from(f: &Flight) -> Self {
        Self {
            id: f.id.to_string(),
            flight_number: f.flight_number.clone(),
            airline: f.airline.clone(),
            source: f.source.clone(),
            destination: f.destination.clone(),
            departure_date: f.departure_date,
            departure_time: f.departure_time.clone(),
            arrival_time: f.arrival_time.clone(),
            status: f.status,
        }
    }
}

impl From<&FlightDetails> for FlightView {
    fn from(d: &FlightDetails) -> Self {
        Self {
            id: d.offer_id.clone(),
            flight_number: d.flight_number.clone(),
            airline: d.airline.clone(),
            source: d.source.clone(),
            destination: d.destination.clone(),
            departure_date: d.departure_date,
            departure_time: d.departure_time.clone(),
            arrival_time: d.arrival_time.clone(),
            // External offers carry no live status.
            status: FlightStatus::Scheduled,
        }
    }
}

/// Client-facing booking. Inventory and external bookings share one shape:
/// `flight` always holds the display fields when they can be resolved,
/// `flightId` is set only for inventory bookings and `flightDetails` only
/// for external ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Uuid,
    pub booking_reference: String,
    pub user: String,
    pub flight_id: Option<Uuid>,
    pub flight: Option<FlightView>,
    pub flight_details: Option<FlightDetails>,
    pub passengers: Vec<Passenger>,
    pub class: FareClass,
    pub total_price: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub booking_status: BookingStatus,
    pub booking_date: DateTime<Utc>,
}

impl BookingView {
    /// `inventory_flight` is the looked-up flight for inventory bookings; it
    /// may be `None` when the flight has since been deleted.
    pub fn project(booking: &Booking, inventory_flight: Option<&Flight>) -> Self {
        let (flight_id, flight, flight_details) = match &booking.flight {
            BookedFlight::Inventory { flight_id } => (Some(*flight_id), inventory_flight.map(FlightView::from), None),
            BookedFlight::External(details) => (None, Some(FlightView::from(details)), Some(details.clone())),
        };

        Self {
            id: booking.id,
            booking_reference: booking.booking_reference.clone(),
            user: booking.user_id.clone(),
            flight_id,
            flight,
            flight_details,
            passengers: booking.passengers.clone(),
            class: booking.class,
            total_price: booking.total_price,
            payment_method: booking.payment_method,
            payment_status: booking.payment_status,
            booking_status: booking.booking_status,
            booking_date: booking.booked_at,
        }
    }
}
