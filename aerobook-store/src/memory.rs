//! In-memory repositories.
//!
//! Same contracts as the Postgres implementations, including the atomic
//! seat reservation and duplicate-key checks. Used when no database is
//! configured and throughout the test suites.

use std::collections::HashMap;
use std::sync::Arc;

use aerobook_catalog::SeatPool;
use aerobook_core::booking::{Booking, BookingStatus};
use aerobook_core::promotion::Promotion;
use aerobook_core::repository::{
    BookingRepository, FlightRepository, PromotionRepository, RepositoryError, RepositoryResult,
};
use aerobook_core::search::{FlightFilter, FlightSort};
use aerobook_core::{FareClass, Flight, PaymentStatus, SeatCount, SeatMap};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryFlightRepository {
    flights: Arc<RwLock<HashMap<Uuid, Flight>>>,
}

impl InMemoryFlightRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flights(flights: Vec<Flight>) -> Self {
        let map = flights.into_iter().map(|f| (f.id, f)).collect();
        Self {
            flights: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn flight_count(&self) -> usize {
        self.flights.read().await.len()
    }
}

fn number_taken(flights: &HashMap<Uuid, Flight>, candidate: &Flight) -> bool {
    flights
        .values()
        .any(|f| f.id != candidate.id && f.flight_number == candidate.flight_number)
}

#[async_trait]
impl FlightRepository for InMemoryFlightRepository {
    async fn get_flight(&self, id: Uuid) -> RepositoryResult<Option<Flight>> {
        Ok(self.flights.read().await.get(&id).cloned())
    }

    async fn find_flights(&self, filter: &FlightFilter, sort: FlightSort) -> RepositoryResult<Vec<Flight>> {
        let mut found: Vec<Flight> = self
            .flights
            .read()
            .await
            .values()
            .filter(|f| filter.matches(*f))
            .cloned()
            .collect();
        sort.apply(&mut found);
        Ok(found)
    }

    async fn create_flight(&self, flight: &Flight) -> RepositoryResult<()> {
        let mut flights = self.flights.write().await;
        if flights.contains_key(&flight.id) || number_taken(&flights, flight) {
            return Err(RepositoryError::DuplicateKey("flight_number".to_string()));
        }
        flights.insert(flight.id, flight.clone());
        Ok(())
    }

    async fn update_flight(&self, flight: &Flight) -> RepositoryResult<()> {
        let mut flights = self.flights.write().await;
        if number_taken(&flights, flight) {
            return Err(RepositoryError::DuplicateKey("flight_number".to_string()));
        }
        let stored = flights
            .get_mut(&flight.id)
            .ok_or_else(|| RepositoryError::NotFound("Flight".to_string()))?;

        let seats = stored.seats;
        *stored = Flight {
            seats,
            ..flight.clone()
        };
        Ok(())
    }

    async fn set_seats(&self, id: Uuid, seats: &SeatMap) -> RepositoryResult<()> {
        let mut flights = self.flights.write().await;
        let flight = flights
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound("Flight".to_string()))?;
        flight.seats = *seats;
        Ok(())
    }

    async fn delete_flight(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.flights.write().await.remove(&id).is_some())
    }

    async fn reserve_seats(&self, id: Uuid, class: FareClass, count: u32) -> RepositoryResult<SeatCount> {
        let mut flights = self.flights.write().await;
        let flight = flights
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound("Flight".to_string()))?;

        let seats = flight.seats.get_mut(class);
        seats.reserve(count)?;
        Ok(*seats)
    }

    async fn release_seats(&self, id: Uuid, class: FareClass, count: u32) -> RepositoryResult<SeatCount> {
        let mut flights = self.flights.write().await;
        let flight = flights
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound("Flight".to_string()))?;

        let seats = flight.seats.get_mut(class);
        seats.release(count);
        Ok(*seats)
    }
}

/// Bookings kept in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryBookingRepository {
    bookings: Arc<RwLock<Vec<Booking>>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; later insertions win ties on the timestamp.
fn newest_first<'a>(bookings: impl DoubleEndedIterator<Item = &'a Booking>) -> Vec<Booking> {
    let mut out: Vec<Booking> = bookings.rev().cloned().collect();
    out.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
    out
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert_booking(&self, booking: &Booking) -> RepositoryResult<()> {
        let mut bookings = self.bookings.write().await;
        if bookings.iter().any(|b| b.booking_reference == booking.booking_reference) {
            return Err(RepositoryError::DuplicateKey("booking_reference".to_string()));
        }
        if bookings.iter().any(|b| b.id == booking.id) {
            return Err(RepositoryError::DuplicateKey("id".to_string()));
        }
        bookings.push(booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> RepositoryResult<Option<Booking>> {
        Ok(self.bookings.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn transition_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        payment_status: PaymentStatus,
    ) -> RepositoryResult<bool> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| RepositoryError::NotFound("Booking".to_string()))?;
        if booking.booking_status != from {
            return Ok(false);
        }
        booking.booking_status = to;
        booking.payment_status = payment_status;
        Ok(true)
    }

    async fn list_bookings_for_user(&self, user_id: &str) -> RepositoryResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mine: Vec<&Booking> = bookings.iter().filter(|b| b.user_id == user_id).collect();
        Ok(newest_first(mine.into_iter()))
    }

    async fn list_bookings(&self) -> RepositoryResult<Vec<Booking>> {
        Ok(newest_first(self.bookings.read().await.iter()))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPromotionRepository {
    promotions: Arc<RwLock<Vec<Promotion>>>,
}

impl InMemoryPromotionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_promotions(promotions: Vec<Promotion>) -> Self {
        Self {
            promotions: Arc::new(RwLock::new(promotions)),
        }
    }
}

#[async_trait]
impl PromotionRepository for InMemoryPromotionRepository {
    async fn list_promotions(&self, active_only: bool) -> RepositoryResult<Vec<Promotion>> {
        let promotions = self.promotions.read().await;
        let mut out: Vec<Promotion> = promotions
            .iter()
            .rev()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn get_promotion(&self, id: Uuid) -> RepositoryResult<Option<Promotion>> {
        Ok(self.promotions.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn create_promotion(&self, promotion: &Promotion) -> RepositoryResult<()> {
        let mut promotions = self.promotions.write().await;
        if promotions.iter().any(|p| p.id == promotion.id) {
            return Err(RepositoryError::DuplicateKey("id".to_string()));
        }
        promotions.push(promotion.clone());
        Ok(())
    }

    async fn update_promotion(&self, promotion: &Promotion) -> RepositoryResult<()> {
        let mut promotions = self.promotions.write().await;
        let existing = promotions
            .iter_mut()
            .find(|p| p.id == promotion.id)
            .ok_or_else(|| RepositoryError::NotFound("Offer".to_string()))?;
        *existing = promotion.clone();
        Ok(())
    }

    async fn delete_promotion(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut promotions = self.promotions.write().await;
        let before = promotions.len();
        promotions.retain(|p| p.id != id);
        Ok(promotions.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::demo_flights;
    use aerobook_catalog::{FlightCatalog, FlightDraft};
    use aerobook_core::booking::BookedFlight;
    use aerobook_core::{PaymentMethod, PriceMap};
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_reserve_is_conditional() {
        let flights = demo_flights(Utc::now());
        let id = flights[0].id;
        let repo = InMemoryFlightRepository::with_flights(flights);

        let seats = repo.reserve_seats(id, FareClass::First, 8).await.unwrap();
        assert_eq!(seats.available, 0);

        let err = repo.reserve_seats(id, FareClass::First, 1).await.unwrap_err();
        assert_eq!(err, RepositoryError::InsufficientSeats { requested: 1, available: 0 });

        let seats = repo.release_seats(id, FareClass::First, 20).await.unwrap();
        assert_eq!(seats.available, seats.total);

        assert!(matches!(
            repo.reserve_seats(Uuid::new_v4(), FareClass::Economy, 1).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_reservations_never_oversell() {
        let flights = demo_flights(Utc::now());
        let id = flights[0].id;
        let repo = Arc::new(InMemoryFlightRepository::with_flights(flights));

        // First class starts with 8 seats; 20 tasks each want one.
        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move { repo.reserve_seats(id, FareClass::First, 1).await.is_ok() }));
        }
        let mut successes = 0;
        for h in handles {
            if h.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 8);
        let flight = repo.get_flight(id).await.unwrap().unwrap();
        assert_eq!(flight.seats.first.available, 0);
    }

    /// Inventory where a booking commits right after the first read.
    struct BookedDuringEdit {
        inner: InMemoryFlightRepository,
        booked: AtomicBool,
    }

    #[async_trait]
    impl FlightRepository for BookedDuringEdit {
        async fn get_flight(&self, id: Uuid) -> RepositoryResult<Option<Flight>> {
            let found = self.inner.get_flight(id).await?;
            if !self.booked.swap(true, Ordering::SeqCst) {
                self.inner.reserve_seats(id, FareClass::Economy, 2).await?;
            }
            Ok(found)
        }
        async fn find_flights(&self, filter: &FlightFilter, sort: FlightSort) -> RepositoryResult<Vec<Flight>> {
            self.inner.find_flights(filter, sort).await
        }
        async fn create_flight(&self, flight: &Flight) -> RepositoryResult<()> {
            self.inner.create_flight(flight).await
        }
        async fn update_flight(&self, flight: &Flight) -> RepositoryResult<()> {
            self.inner.update_flight(flight).await
        }
        async fn set_seats(&self, id: Uuid, seats: &SeatMap) -> RepositoryResult<()> {
            self.inner.set_seats(id, seats).await
        }
        async fn delete_flight(&self, id: Uuid) -> RepositoryResult<bool> {
            self.inner.delete_flight(id).await
        }
        async fn reserve_seats(&self, id: Uuid, class: FareClass, count: u32) -> RepositoryResult<SeatCount> {
            self.inner.reserve_seats(id, class, count).await
        }
        async fn release_seats(&self, id: Uuid, class: FareClass, count: u32) -> RepositoryResult<SeatCount> {
            self.inner.release_seats(id, class, count).await
        }
    }

    #[tokio::test]
    async fn test_flight_edit_keeps_concurrent_reservation() {
        let flights = demo_flights(Utc::now());
        let id = flights[0].id;
        let inner = InMemoryFlightRepository::with_flights(flights);
        let catalog = FlightCatalog::new(Arc::new(BookedDuringEdit {
            inner: inner.clone(),
            booked: AtomicBool::new(false),
        }));

        let draft = FlightDraft {
            price: Some(PriceMap { economy: Some(5299), business: None, first: None }),
            ..Default::default()
        };
        let updated = catalog.update(&id.to_string(), draft).await.unwrap();

        assert_eq!(updated.price.economy, 5299);
        assert_eq!(updated.seats.economy.available, 118);
        let stored = inner.get_flight(id).await.unwrap().unwrap();
        assert_eq!(stored.price.economy, 5299);
        assert_eq!(stored.seats.economy, SeatCount::new(150, 118));
    }

    #[tokio::test]
    async fn test_flight_edit_with_seats_overwrites_counts() {
        let flights = demo_flights(Utc::now());
        let id = flights[0].id;
        let repo = InMemoryFlightRepository::with_flights(flights);
        let catalog = FlightCatalog::new(Arc::new(repo.clone()));

        let seats = SeatMap::new(SeatCount::new(160, 160), SeatCount::new(30, 30), SeatCount::new(10, 10));
        let draft = FlightDraft {
            seats: Some(seats),
            ..Default::default()
        };
        catalog.update(&id.to_string(), draft).await.unwrap();

        assert_eq!(repo.get_flight(id).await.unwrap().unwrap().seats, seats);
    }

    #[tokio::test]
    async fn test_booking_transition_is_conditional() {
        let repo = InMemoryBookingRepository::new();
        let booking = Booking {
            id: Uuid::new_v4(),
            booking_reference: "BK1700000000000ABCDE".to_string(),
            user_id: "user-1".to_string(),
            flight: BookedFlight::Inventory { flight_id: Uuid::new_v4() },
            passengers: Vec::new(),
            class: FareClass::Economy,
            total_price: 4999,
            payment_method: PaymentMethod::Upi,
            payment_status: PaymentStatus::Completed,
            booking_status: BookingStatus::Confirmed,
            booked_at: Utc::now(),
        };
        repo.insert_booking(&booking).await.unwrap();

        let first = repo
            .transition_booking_status(booking.id, BookingStatus::Confirmed, BookingStatus::Cancelled, PaymentStatus::Refunded)
            .await;
        assert_eq!(first, Ok(true));
        let second = repo
            .transition_booking_status(booking.id, BookingStatus::Confirmed, BookingStatus::Cancelled, PaymentStatus::Refunded)
            .await;
        assert_eq!(second, Ok(false));

        let stored = repo.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.booking_status, BookingStatus::Cancelled);
        assert_eq!(stored.payment_status, PaymentStatus::Refunded);

        let missing = repo
            .transition_booking_status(Uuid::new_v4(), BookingStatus::Confirmed, BookingStatus::Cancelled, PaymentStatus::Refunded)
            .await;
        assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_flight_number_rejected() {
        let flights = demo_flights(Utc::now());
        let mut copy = flights[0].clone();
        let repo = InMemoryFlightRepository::with_flights(flights);

        copy.id = Uuid::new_v4();
        assert_eq!(
            repo.create_flight(&copy).await.unwrap_err(),
            RepositoryError::DuplicateKey("flight_number".to_string())
        );
    }
}
