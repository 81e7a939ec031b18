pub mod flight;
pub mod booking;
pub mod promotion;
pub mod payment;
pub mod identity;
pub mod repository;
pub mod search;
pub mod supplier;

pub use flight::{FareClass, FareTable, Flight, FlightDetails, FlightListing, FlightStatus, OfferSnapshot, PriceMap, SeatCount, SeatMap};
pub use booking::{BookedFlight, Booking, BookingStatus, Gender, Passenger};
pub use identity::{Actor, Role};
pub use payment::{PaymentMethod, PaymentStatus};
pub use repository::RepositoryError;

/// Error taxonomy surfaced by every operation of the booking system.
///
/// Each variant carries the human-readable message returned to the caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PaymentFailed(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Parse a path identifier. Malformed ids are reported as missing records.
pub fn parse_id(raw: &str, what: &str) -> CoreResult<uuid::Uuid> {
    uuid::Uuid::parse_str(raw.trim()).map_err(|_| CoreError::NotFound(format!("{} not found", what)))
}

impl From<RepositoryError> for CoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => CoreError::NotFound(format!("{} not found", what)),
            RepositoryError::InsufficientSeats { available, .. } => {
                CoreError::Conflict(format!("Insufficient seats: only {} seats available", available))
            }
            RepositoryError::DuplicateKey(key) => CoreError::Conflict(format!("Duplicate value for {}", key)),
            RepositoryError::Backend(msg) => CoreError::Internal(msg),
        }
    }
}
