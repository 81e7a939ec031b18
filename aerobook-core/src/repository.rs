use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus};
use crate::flight::{FareClass, Flight, SeatCount, SeatMap};
use crate::payment::PaymentStatus;
use crate::promotion::Promotion;
use crate::search::{FlightFilter, FlightSort};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Insufficient seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: u32, available: u32 },
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository trait for flight inventory
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn get_flight(&self, id: Uuid) -> RepositoryResult<Option<Flight>>;

    async fn find_flights(&self, filter: &FlightFilter, sort: FlightSort) -> RepositoryResult<Vec<Flight>>;

    /// Fails with `DuplicateKey` when the flight number is taken.
    async fn create_flight(&self, flight: &Flight) -> RepositoryResult<()>;

    /// Writes schedule, price and status. Seat counts are left as stored.
    async fn update_flight(&self, flight: &Flight) -> RepositoryResult<()>;

    /// Overwrite the seat counts of every class.
    async fn set_seats(&self, id: Uuid, seats: &SeatMap) -> RepositoryResult<()>;

    async fn delete_flight(&self, id: Uuid) -> RepositoryResult<bool>;

    /// Atomically decrement `available` for the class, only if at least
    /// `count` seats remain. Returns the updated counts.
    async fn reserve_seats(&self, id: Uuid, class: FareClass, count: u32) -> RepositoryResult<SeatCount>;

    /// Atomically increment `available` for the class, never above `total`.
    async fn release_seats(&self, id: Uuid, class: FareClass, count: u32) -> RepositoryResult<SeatCount>;
}

/// Repository trait for the booking ledger
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Fails with `DuplicateKey` when the booking reference already exists.
    async fn insert_booking(&self, booking: &Booking) -> RepositoryResult<()>;

    async fn get_booking(&self, id: Uuid) -> RepositoryResult<Option<Booking>>;

    /// Move a booking from `from` to `to` in one conditional write.
    /// Returns `false` when the stored status is no longer `from`.
    async fn transition_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        payment_status: PaymentStatus,
    ) -> RepositoryResult<bool>;

    /// Newest first.
    async fn list_bookings_for_user(&self, user_id: &str) -> RepositoryResult<Vec<Booking>>;

    /// Newest first.
    async fn list_bookings(&self) -> RepositoryResult<Vec<Booking>>;
}

/// Repository trait for promotional offers
#[async_trait]
pub trait PromotionRepository: Send + Sync {
    /// Newest first.
    async fn list_promotions(&self, active_only: bool) -> RepositoryResult<Vec<Promotion>>;

    async fn get_promotion(&self, id: Uuid) -> RepositoryResult<Option<Promotion>>;

    async fn create_promotion(&self, promotion: &Promotion) -> RepositoryResult<()>;

    async fn update_promotion(&self, promotion: &Promotion) -> RepositoryResult<()>;

    async fn delete_promotion(&self, id: Uuid) -> RepositoryResult<bool>;
}
