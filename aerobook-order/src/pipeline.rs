use std::collections::HashMap;
use std::sync::Arc;

use aerobook_catalog::PricingEngine;
use aerobook_core::booking::{BookedFlight, Booking, BookingStatus};
use aerobook_core::payment::{PaymentAdapter, PaymentRequest};
use aerobook_core::repository::{BookingRepository, FlightRepository, RepositoryError};
use aerobook_core::{parse_id, Actor, CoreError, CoreResult, FareClass, Flight, PaymentStatus};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::CreateBookingRequest;
use crate::orchestrator::PaymentOrchestrator;
use crate::reference::generate_reference;
use crate::resolve::{FlightResolver, ResolvedFlight};
use crate::validation::validate;
use crate::view::BookingView;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How many fresh references to try when the ledger reports a duplicate.
    pub reference_attempts: u32,
    /// Flight id prefix that marks an external provider offer.
    pub external_marker: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_attempts: 3,
            external_marker: "amadeus_".to_string(),
        }
    }
}

type ReferenceGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// The booking transaction: resolve, validate, price, pay, record, reserve.
///
/// Ledger and inventory are separate stores with no shared transaction. A
/// booking is written before seats are reserved; if the reservation loses
/// a race the booking is moved to cancelled/refunded and the caller gets
/// `Conflict`.
pub struct BookingPipeline {
    flights: Arc<dyn FlightRepository>,
    bookings: Arc<dyn BookingRepository>,
    resolver: FlightResolver,
    pricing: PricingEngine,
    payments: PaymentOrchestrator,
    references: ReferenceGenerator,
    config: PipelineConfig,
}

impl BookingPipeline {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentAdapter>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            resolver: FlightResolver::new(flights.clone(), config.external_marker.clone()),
            flights,
            bookings,
            pricing: PricingEngine::default(),
            payments: PaymentOrchestrator::new(payments),
            references: Box::new(generate_reference),
            config,
        }
    }

    pub fn with_reference_generator(mut self, generator: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.references = Box::new(generator);
        self
    }

    pub async fn create(&self, actor: &Actor, req: CreateBookingRequest) -> CoreResult<BookingView> {
        let flight = self.resolver.resolve(&req).await?;
        let validated = validate(&req, &flight)?;
        let count = validated.passengers.len() as u32;
        let quote = self.pricing.quote(validated.class, validated.unit_price, count)?;

        self.payments
            .charge(&PaymentRequest {
                user_id: actor.user_id.clone(),
                amount: quote.total,
                method: validated.payment_method,
            })
            .await?;

        let booked_flight = match &flight {
            ResolvedFlight::Inventory(f) => BookedFlight::Inventory { flight_id: f.id },
            ResolvedFlight::External(details) => BookedFlight::External(details.clone()),
        };

        let mut booking = Booking {
            id: Uuid::new_v4(),
            booking_reference: String::new(),
            user_id: actor.user_id.clone(),
            flight: booked_flight,
            passengers: validated.passengers,
            class: validated.class,
            total_price: quote.total,
            payment_method: validated.payment_method,
            payment_status: PaymentStatus::Completed,
            booking_status: BookingStatus::Confirmed,
            booked_at: Utc::now(),
        };
        self.insert_with_fresh_reference(&mut booking).await?;

        let reserved = match flight {
            ResolvedFlight::Inventory(mut f) => {
                let seats = self.reserve_or_compensate(&mut booking, f.id, validated.class, count).await?;
                *f.seats.get_mut(validated.class) = seats;
                Some(f)
            }
            ResolvedFlight::External(_) => None,
        };

        info!(
            booking_reference = %booking.booking_reference,
            flight_id = ?booking.inventory_flight_id(),
            class = %booking.class,
            passengers = count,
            total = booking.total_price,
            "Booking confirmed"
        );

        Ok(BookingView::project(&booking, reserved.as_ref()))
    }

    async fn insert_with_fresh_reference(&self, booking: &mut Booking) -> CoreResult<()> {
        for attempt in 1..=self.config.reference_attempts {
            booking.booking_reference = (self.references)();
            match self.bookings.insert_booking(booking).await {
                Ok(()) => return Ok(()),
                Err(RepositoryError::DuplicateKey(_)) => {
                    warn!(attempt, booking_reference = %booking.booking_reference, "Booking reference collision");
                }
                Err(e) => return Err(e.into()),
            }
        }
        error!(attempts = self.config.reference_attempts, "Exhausted booking reference attempts");
        Err(CoreError::Internal("Could not allocate a unique booking reference".to_string()))
    }

    async fn reserve_or_compensate(
        &self,
        booking: &mut Booking,
        flight_id: Uuid,
        class: FareClass,
        count: u32,
    ) -> CoreResult<aerobook_core::SeatCount> {
        match self.flights.reserve_seats(flight_id, class, count).await {
            Ok(seats) => Ok(seats),
            Err(e) => {
                warn!(
                    booking_reference = %booking.booking_reference,
                    flight_id = %flight_id,
                    error = %e,
                    "Seat reservation failed after booking was recorded; compensating"
                );
                booking.booking_status = BookingStatus::Cancelled;
                booking.payment_status = PaymentStatus::Refunded;
                if let Err(comp) = self
                    .bookings
                    .transition_booking_status(
                        booking.id,
                        BookingStatus::Confirmed,
                        BookingStatus::Cancelled,
                        PaymentStatus::Refunded,
                    )
                    .await
                {
                    error!(booking_reference = %booking.booking_reference, error = %comp, "Compensation failed");
                }

                Err(match e {
                    RepositoryError::InsufficientSeats { available, .. } => {
                        CoreError::Conflict(format!("Only {} seats available in {} class", available, class))
                    }
                    RepositoryError::NotFound(_) => CoreError::NotFound("Flight not found".to_string()),
                    other => other.into(),
                })
            }
        }
    }

    /// Owner-only cancellation. Seats go back to inventory for local flights.
    pub async fn cancel(&self, actor: &Actor, booking_id: &str) -> CoreResult<BookingView> {
        let id = parse_id(booking_id, "Booking")?;
        let mut booking = self
            .bookings
            .get_booking(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Booking not found".to_string()))?;

        if !booking.is_owned_by(&actor.user_id) {
            return Err(CoreError::Forbidden("Not authorized to cancel this booking".to_string()));
        }

        let previous = booking.booking_status;
        booking.cancel()?;
        // Seats are released only by the caller whose write moved the booking out of `previous`.
        let applied = self
            .bookings
            .transition_booking_status(booking.id, previous, booking.booking_status, booking.payment_status)
            .await?;
        if !applied {
            warn!(booking_reference = %booking.booking_reference, "Booking changed during cancellation");
            return Err(CoreError::InvalidState("Booking is already cancelled".to_string()));
        }

        let flight = match booking.inventory_flight_id() {
            Some(flight_id) => {
                match self
                    .flights
                    .release_seats(flight_id, booking.class, booking.passenger_count())
                    .await
                {
                    Ok(_) => {}
                    Err(RepositoryError::NotFound(_)) => {
                        warn!(booking_reference = %booking.booking_reference, flight_id = %flight_id, "Flight missing while releasing seats");
                    }
                    Err(e) => {
                        error!(booking_reference = %booking.booking_reference, error = %e, "Failed to release seats");
                    }
                }
                self.flights.get_flight(flight_id).await?
            }
            None => None,
        };

        info!(booking_reference = %booking.booking_reference, passengers = booking.passenger_count(), "Booking cancelled");
        Ok(BookingView::project(&booking, flight.as_ref()))
    }

    /// The caller's bookings, newest first.
    pub async fn my_bookings(&self, actor: &Actor) -> CoreResult<Vec<BookingView>> {
        let bookings = self.bookings.list_bookings_for_user(&actor.user_id).await?;
        self.project_all(bookings).await
    }

    /// Owner or admin.
    pub async fn get_booking(&self, actor: &Actor, booking_id: &str) -> CoreResult<BookingView> {
        let id = parse_id(booking_id, "Booking")?;
        let booking = self
            .bookings
            .get_booking(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Booking not found".to_string()))?;

        if !booking.is_owned_by(&actor.user_id) && !actor.is_admin() {
            return Err(CoreError::Forbidden("Not authorized to access this booking".to_string()));
        }

        let flight = match booking.inventory_flight_id() {
            Some(flight_id) => self.flights.get_flight(flight_id).await?,
            None => None,
        };
        Ok(BookingView::project(&booking, flight.as_ref()))
    }

    /// Every booking, newest first. Admin only.
    pub async fn all_bookings(&self, actor: &Actor) -> CoreResult<Vec<BookingView>> {
        if !actor.is_admin() {
            return Err(CoreError::Forbidden("Admin access required".to_string()));
        }
        let bookings = self.bookings.list_bookings().await?;
        self.project_all(bookings).await
    }

    async fn project_all(&self, bookings: Vec<Booking>) -> CoreResult<Vec<BookingView>> {
        let mut flights: HashMap<Uuid, Option<Flight>> = HashMap::new();
        let mut views = Vec::with_capacity(bookings.len());
        for booking in &bookings {
            let flight = match booking.inventory_flight_id() {
                Some(flight_id) => {
                    if !flights.contains_key(&flight_id) {
                        let found = self.flights.get_flight(flight_id).await?;
                        flights.insert(flight_id, found);
                    }
                    flights.get(&flight_id).and_then(|f| f.as_ref())
                }
                None => None,
            };
            views.push(BookingView::project(booking, flight));
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PassengerInput;
    use crate::orchestrator::SimulatedPaymentAdapter;
    use aerobook_core::search::{FlightFilter, FlightSort};
    use aerobook_core::{PriceMap, SeatCount, SeatMap};
    use aerobook_store::memory::{InMemoryBookingRepository, InMemoryFlightRepository};
    use aerobook_store::seed::demo_flights;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Fixture {
        flights: Arc<InMemoryFlightRepository>,
        bookings: Arc<InMemoryBookingRepository>,
        flight_id: Uuid,
    }

    fn fixture() -> Fixture {
        let seeded = demo_flights(Utc::now());
        let flight_id = seeded[0].id;
        Fixture {
            flights: Arc::new(InMemoryFlightRepository::with_flights(seeded)),
            bookings: Arc::new(InMemoryBookingRepository::new()),
            flight_id,
        }
    }

    fn pipeline(fx: &Fixture, payments: SimulatedPaymentAdapter) -> BookingPipeline {
        BookingPipeline::new(fx.flights.clone(), fx.bookings.clone(), Arc::new(payments), PipelineConfig::default())
    }

    fn passengers(n: usize) -> Vec<PassengerInput> {
        (0..n)
            .map(|i| PassengerInput {
                name: Some(format!("Passenger {}", i + 1)),
                age: Some(30),
                gender: Some("other".to_string()),
                seat_number: Some(format!("{}C", i + 1)),
            })
            .collect()
    }

    fn request(flight_id: &str, n: usize) -> CreateBookingRequest {
        CreateBookingRequest {
            flight_id: flight_id.to_string(),
            passengers: passengers(n),
            class: "economy".to_string(),
            payment_method: "upi".to_string(),
            ..Default::default()
        }
    }

    async fn economy_available(fx: &Fixture) -> u32 {
        fx.flights.get_flight(fx.flight_id).await.unwrap().unwrap().seats.economy.available
    }

    #[tokio::test]
    async fn test_create_inventory_booking() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve());
        let actor = Actor::user("user-1");

        let view = p.create(&actor, request(&fx.flight_id.to_string(), 2)).await.unwrap();

        assert_eq!(view.total_price, 9998);
        assert_eq!(view.booking_status, BookingStatus::Confirmed);
        assert_eq!(view.payment_status, PaymentStatus::Completed);
        assert_eq!(view.flight_id, Some(fx.flight_id));
        assert_eq!(view.flight.as_ref().map(|f| f.flight_number.as_str()), Some("AI101"));
        assert!(view.flight_details.is_none());
        assert!(view.booking_reference.starts_with("BK"));
        assert_eq!(economy_available(&fx).await, 118);
    }

    #[tokio::test]
    async fn test_too_many_passengers_leaves_inventory_untouched() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve());

        let err = p.create(&Actor::user("user-1"), request(&fx.flight_id.to_string(), 200)).await.unwrap_err();

        assert_eq!(err, CoreError::Conflict("Only 120 seats available in economy class".to_string()));
        assert_eq!(economy_available(&fx).await, 120);
        assert!(fx.bookings.list_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_external_booking_embeds_snapshot() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve());

        let view = p.create(&Actor::user("user-1"), request("amadeus_1X2Y", 3)).await.unwrap();

        assert!(view.flight_id.is_none());
        let details = view.flight_details.as_ref().unwrap();
        assert_eq!(details.flight_number, "AI101");
        assert!(details.external);
        assert_eq!(view.total_price, 3 * 4999);
        assert_eq!(view.flight.as_ref().unwrap().status, aerobook_core::FlightStatus::Scheduled);
        assert_eq!(economy_available(&fx).await, 120);
    }

    #[tokio::test]
    async fn test_missing_class_price_writes_nothing() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve());
        let mut req = request("amadeus_1X2Y", 1);
        req.class = "first".to_string();
        req.price = Some(PriceMap { economy: Some(3999), business: None, first: None });

        let err = p.create(&Actor::user("user-1"), req).await.unwrap_err();

        assert!(matches!(err, CoreError::InvalidArgument(_)));
        assert!(fx.bookings.list_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_declined_payment_writes_nothing() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_decline());

        let err = p.create(&Actor::user("user-1"), request(&fx.flight_id.to_string(), 1)).await.unwrap_err();

        assert!(matches!(err, CoreError::PaymentFailed(_)));
        assert_eq!(economy_available(&fx).await, 120);
        assert!(fx.bookings.list_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_restores_seats_once() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve());
        let actor = Actor::user("user-1");
        let view = p.create(&actor, request(&fx.flight_id.to_string(), 2)).await.unwrap();

        let cancelled = p.cancel(&actor, &view.id.to_string()).await.unwrap();
        assert_eq!(cancelled.booking_status, BookingStatus::Cancelled);
        assert_eq!(cancelled.payment_status, PaymentStatus::Refunded);
        assert_eq!(economy_available(&fx).await, 120);

        let err = p.cancel(&actor, &view.id.to_string()).await.unwrap_err();
        assert_eq!(err, CoreError::InvalidState("Booking is already cancelled".to_string()));
        assert_eq!(economy_available(&fx).await, 120);
    }

    /// Ledger whose reads yield, so two cancellations both load a confirmed booking.
    struct YieldingReads(Arc<InMemoryBookingRepository>);

    #[async_trait]
    impl BookingRepository for YieldingReads {
        async fn insert_booking(&self, booking: &Booking) -> Result<(), RepositoryError> {
            self.0.insert_booking(booking).await
        }
        async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, RepositoryError> {
            let found = self.0.get_booking(id).await;
            tokio::task::yield_now().await;
            found
        }
        async fn transition_booking_status(
            &self,
            id: Uuid,
            from: BookingStatus,
            to: BookingStatus,
            payment_status: PaymentStatus,
        ) -> Result<bool, RepositoryError> {
            self.0.transition_booking_status(id, from, to, payment_status).await
        }
        async fn list_bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>, RepositoryError> {
            self.0.list_bookings_for_user(user_id).await
        }
        async fn list_bookings(&self) -> Result<Vec<Booking>, RepositoryError> {
            self.0.list_bookings().await
        }
    }

    #[tokio::test]
    async fn test_concurrent_cancels_release_seats_once() {
        let fx = fixture();
        let p = BookingPipeline::new(
            fx.flights.clone(),
            Arc::new(YieldingReads(fx.bookings.clone())),
            Arc::new(SimulatedPaymentAdapter::always_approve()),
            PipelineConfig::default(),
        );
        let actor = Actor::user("user-1");
        let view = p.create(&actor, request(&fx.flight_id.to_string(), 5)).await.unwrap();
        assert_eq!(economy_available(&fx).await, 115);

        let id = view.id.to_string();
        let (first, second) = tokio::join!(p.cancel(&actor, &id), p.cancel(&actor, &id));

        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
        let err = first.err().or(second.err()).unwrap();
        assert_eq!(err, CoreError::InvalidState("Booking is already cancelled".to_string()));
        assert_eq!(economy_available(&fx).await, 120);
    }

    #[tokio::test]
    async fn test_cancel_requires_owner_even_for_admin() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve());
        let view = p.create(&Actor::user("user-1"), request(&fx.flight_id.to_string(), 1)).await.unwrap();

        let err = p.cancel(&Actor::admin("admin-1"), &view.id.to_string()).await.unwrap_err();
        assert_eq!(err, CoreError::Forbidden("Not authorized to cancel this booking".to_string()));

        let err = p.cancel(&Actor::user("user-1"), &Uuid::new_v4().to_string()).await.unwrap_err();
        assert_eq!(err, CoreError::NotFound("Booking not found".to_string()));
    }

    #[tokio::test]
    async fn test_cancel_external_booking() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve());
        let actor = Actor::user("user-1");
        let view = p.create(&actor, request("amadeus_77", 2)).await.unwrap();

        let cancelled = p.cancel(&actor, &view.id.to_string()).await.unwrap();
        assert_eq!(cancelled.booking_status, BookingStatus::Cancelled);
        assert!(cancelled.flight.is_some());
    }

    #[tokio::test]
    async fn test_cancel_with_deleted_flight_still_succeeds() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve());
        let actor = Actor::user("user-1");
        let view = p.create(&actor, request(&fx.flight_id.to_string(), 1)).await.unwrap();
        fx.flights.delete_flight(fx.flight_id).await.unwrap();

        let cancelled = p.cancel(&actor, &view.id.to_string()).await.unwrap();
        assert_eq!(cancelled.booking_status, BookingStatus::Cancelled);
        assert!(cancelled.flight.is_none());
    }

    #[tokio::test]
    async fn test_queries_respect_ownership() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve());
        let alice = Actor::user("alice");
        let bob = Actor::user("bob");

        let first = p.create(&alice, request(&fx.flight_id.to_string(), 1)).await.unwrap();
        let second = p.create(&alice, request("amadeus_5", 1)).await.unwrap();
        p.create(&bob, request(&fx.flight_id.to_string(), 1)).await.unwrap();

        let mine = p.my_bookings(&alice).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, second.id);
        assert_eq!(mine[1].id, first.id);
        assert!(mine.iter().all(|b| b.flight.is_some()));

        let err = p.get_booking(&bob, &first.id.to_string()).await.unwrap_err();
        assert_eq!(err, CoreError::Forbidden("Not authorized to access this booking".to_string()));
        assert!(p.get_booking(&Actor::admin("root"), &first.id.to_string()).await.is_ok());
        assert!(matches!(p.get_booking(&alice, "nope").await, Err(CoreError::NotFound(_))));

        assert!(matches!(p.all_bookings(&alice).await, Err(CoreError::Forbidden(_))));
        assert_eq!(p.all_bookings(&Actor::admin("root")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_reference_collision_is_retried() {
        let fx = fixture();
        let sequence = Mutex::new(VecDeque::from(vec!["BKSAME", "BKSAME", "BKOTHER"]));
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve()).with_reference_generator(move || {
            sequence.lock().unwrap().pop_front().unwrap_or("BKSPARE").to_string()
        });
        let actor = Actor::user("user-1");

        let first = p.create(&actor, request("amadeus_1", 1)).await.unwrap();
        let second = p.create(&actor, request("amadeus_2", 1)).await.unwrap();

        assert_eq!(first.booking_reference, "BKSAME");
        assert_eq!(second.booking_reference, "BKOTHER");
    }

    #[tokio::test]
    async fn test_reference_attempts_are_bounded() {
        let fx = fixture();
        let p = pipeline(&fx, SimulatedPaymentAdapter::always_approve())
            .with_reference_generator(|| "BKFIXED".to_string());
        let actor = Actor::user("user-1");

        p.create(&actor, request("amadeus_1", 1)).await.unwrap();
        let err = p.create(&actor, request("amadeus_2", 1)).await.unwrap_err();

        assert!(matches!(err, CoreError::Internal(_)));
        assert_eq!(fx.bookings.list_bookings().await.unwrap().len(), 1);
    }

    /// Inventory whose reservations always lose to a concurrent booking.
    struct LosingRace(Arc<InMemoryFlightRepository>);

    #[async_trait]
    impl FlightRepository for LosingRace {
        async fn get_flight(&self, id: Uuid) -> Result<Option<Flight>, RepositoryError> {
            self.0.get_flight(id).await
        }
        async fn find_flights(&self, filter: &FlightFilter, sort: FlightSort) -> Result<Vec<Flight>, RepositoryError> {
            self.0.find_flights(filter, sort).await
        }
        async fn create_flight(&self, flight: &Flight) -> Result<(), RepositoryError> {
            self.0.create_flight(flight).await
        }
        async fn update_flight(&self, flight: &Flight) -> Result<(), RepositoryError> {
            self.0.update_flight(flight).await
        }
        async fn set_seats(&self, id: Uuid, seats: &SeatMap) -> Result<(), RepositoryError> {
            self.0.set_seats(id, seats).await
        }
        async fn delete_flight(&self, id: Uuid) -> Result<bool, RepositoryError> {
            self.0.delete_flight(id).await
        }
        async fn reserve_seats(&self, _id: Uuid, _class: FareClass, count: u32) -> Result<SeatCount, RepositoryError> {
            Err(RepositoryError::InsufficientSeats { requested: count, available: 0 })
        }
        async fn release_seats(&self, id: Uuid, class: FareClass, count: u32) -> Result<SeatCount, RepositoryError> {
            self.0.release_seats(id, class, count).await
        }
    }

    #[tokio::test]
    async fn test_lost_reservation_race_is_compensated() {
        let fx = fixture();
        let p = BookingPipeline::new(
            Arc::new(LosingRace(fx.flights.clone())),
            fx.bookings.clone(),
            Arc::new(SimulatedPaymentAdapter::always_approve()),
            PipelineConfig::default(),
        );

        let err = p.create(&Actor::user("user-1"), request(&fx.flight_id.to_string(), 2)).await.unwrap_err();
        assert_eq!(err, CoreError::Conflict("Only 0 seats available in economy class".to_string()));

        let recorded = fx.bookings.list_bookings().await.unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].booking_status, BookingStatus::Cancelled);
        assert_eq!(recorded[0].payment_status, PaymentStatus::Refunded);
        assert_eq!(economy_available(&fx).await, 120);
    }
}
