use std::sync::Arc;
use std::time::Duration;

use aerobook_catalog::FlightCatalog;
use aerobook_core::payment::PaymentAdapter;
use aerobook_core::repository::{BookingRepository, FlightRepository, PromotionRepository};
use aerobook_core::supplier::ExternalOfferProvider;
use aerobook_offer::{FlightSearchService, PromotionRegistry};
use aerobook_order::{BookingPipeline, PipelineConfig};
use aerobook_store::app_config::{BusinessRules, RateLimitConfig};
use aerobook_store::booking_repo::PostgresBookingRepository;
use aerobook_store::flight_repo::PostgresFlightRepository;
use aerobook_store::memory::{InMemoryBookingRepository, InMemoryFlightRepository, InMemoryPromotionRepository};
use aerobook_store::promotion_repo::PostgresPromotionRepository;
use aerobook_store::RedisClient;
use sqlx::PgPool;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// The three stores the service runs on.
#[derive(Clone)]
pub struct Repositories {
    pub flights: Arc<dyn FlightRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub promotions: Arc<dyn PromotionRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            flights: Arc::new(PostgresFlightRepository::new(pool.clone())),
            bookings: Arc::new(PostgresBookingRepository::new(pool.clone())),
            promotions: Arc::new(PostgresPromotionRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            flights: Arc::new(InMemoryFlightRepository::new()),
            bookings: Arc::new(InMemoryBookingRepository::new()),
            promotions: Arc::new(InMemoryPromotionRepository::new()),
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    pub redis: Arc<RedisClient>,
    pub limits: RateLimitConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<FlightCatalog>,
    pub search: Arc<FlightSearchService>,
    pub bookings: Arc<BookingPipeline>,
    pub promotions: Arc<PromotionRegistry>,
    pub rate_limiter: Option<RateLimiter>,
    pub auth: AuthConfig,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        repos: &Repositories,
        provider: Option<Arc<dyn ExternalOfferProvider>>,
        provider_timeout: Duration,
        payments: Arc<dyn PaymentAdapter>,
        rules: &BusinessRules,
        auth: AuthConfig,
    ) -> Result<Self, prometheus::Error> {
        let pipeline = BookingPipeline::new(
            repos.flights.clone(),
            repos.bookings.clone(),
            payments,
            PipelineConfig {
                reference_attempts: rules.reference_attempts,
                external_marker: rules.external_marker.clone(),
            },
        );

        Ok(Self {
            catalog: Arc::new(FlightCatalog::new(repos.flights.clone())),
            search: Arc::new(FlightSearchService::new(repos.flights.clone(), provider).with_timeout(provider_timeout)),
            bookings: Arc::new(pipeline),
            promotions: Arc::new(PromotionRegistry::new(repos.promotions.clone())),
            rate_limiter: None,
            auth,
            metrics: Arc::new(Metrics::new()?),
        })
    }

    pub fn with_rate_limit(mut self, redis: Arc<RedisClient>, limits: RateLimitConfig) -> Self {
        self.rate_limiter = Some(RateLimiter { redis, limits });
        self
    }
}
