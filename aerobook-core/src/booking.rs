use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::flight::{FareClass, FlightDetails};
use crate::payment::{PaymentMethod, PaymentStatus};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(CoreError::InvalidArgument(format!("Unknown gender: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub seat_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(CoreError::Internal(format!("Unknown booking status: {}", other))),
        }
    }
}

/// What a booking points at. Exactly one of the two is ever set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BookedFlight {
    Inventory { flight_id: Uuid },
    External(FlightDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub booking_reference: String,
    pub user_id: String,
    pub flight: BookedFlight,
    pub passengers: Vec<Passenger>,
    pub class: FareClass,
    pub total_price: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub booking_status: BookingStatus,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn passenger_count(&self) -> u32 {
        self.passengers.len() as u32
    }

    pub fn inventory_flight_id(&self) -> Option<Uuid> {
        match &self.flight {
            BookedFlight::Inventory { flight_id } => Some(*flight_id),
            BookedFlight::External(_) => None,
        }
    }

    pub fn flight_details(&self) -> Option<&FlightDetails> {
        match &self.flight {
            BookedFlight::External(details) => Some(details),
            BookedFlight::Inventory { .. } => None,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Transition confirmed -> cancelled. Cancelled and completed are terminal.
    pub fn cancel(&mut self) -> CoreResult<()> {
        match self.booking_status {
            BookingStatus::Confirmed => {
                self.booking_status = BookingStatus::Cancelled;
                self.payment_status = PaymentStatus::Refunded;
                Ok(())
            }
            BookingStatus::Cancelled => Err(CoreError::InvalidState("Booking is already cancelled".to_string())),
            BookingStatus::Completed => Err(CoreError::InvalidState(
                "Completed bookings cannot be cancelled".to_string(),
            )),
        }
    }
}
