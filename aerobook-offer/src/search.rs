//! Flight search across the external provider and local inventory.

use std::sync::Arc;
use std::time::Duration;

use aerobook_core::repository::FlightRepository;
use aerobook_core::search::{FlightFilter, FlightSort, OfferSearch};
use aerobook_core::supplier::ExternalOfferProvider;
use aerobook_core::{CoreResult, FareClass, FlightListing, OfferSnapshot};
use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::breaker::CircuitBreaker;

pub const POPULAR_ROUTES: [(&str, &str); 6] = [
    ("Delhi", "Mumbai"),
    ("Mumbai", "Bangalore"),
    ("Delhi", "Bangalore"),
    ("Chennai", "Delhi"),
    ("Kolkata", "Mumbai"),
    ("Hyderabad", "Bangalore"),
];

pub const POPULAR_LIMIT: usize = 6;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const BREAKER_THRESHOLD: usize = 5;
const BREAKER_RESET: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
    pub class: Option<FareClass>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub use_external: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchSource {
    #[serde(rename = "amadeus")]
    External,
    #[serde(rename = "local")]
    Local,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub source: SearchSource,
    pub flights: Vec<FlightListing>,
}

pub struct FlightSearchService {
    flights: Arc<dyn FlightRepository>,
    provider: Option<Arc<dyn ExternalOfferProvider>>,
    breaker: CircuitBreaker,
    timeout: Duration,
}

impl FlightSearchService {
    pub fn new(flights: Arc<dyn FlightRepository>, provider: Option<Arc<dyn ExternalOfferProvider>>) -> Self {
        let name = provider.as_ref().map_or("external", |p| p.name());
        Self {
            flights,
            breaker: CircuitBreaker::new(name, BREAKER_THRESHOLD, BREAKER_RESET),
            provider,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = breaker;
        self
    }

    /// External offers when route and date are all given and the provider has
    /// results; local inventory otherwise. Provider failures never surface.
    pub async fn search(&self, params: &SearchParams) -> CoreResult<SearchResult> {
        let sort = FlightSort::from_params(params.sort_by.as_deref(), params.sort_order.as_deref(), params.class);

        if params.use_external {
            if let (Some(source), Some(destination), Some(date)) = (&params.source, &params.destination, params.date) {
                let query = OfferSearch {
                    source: source.clone(),
                    destination: destination.clone(),
                    date,
                    class: params.class.unwrap_or(FareClass::Economy),
                };
                match self.search_external(&query).await {
                    Some(mut offers) if !offers.is_empty() => {
                        // Provider order is kept unless the caller asked for a sort.
                        if params.sort_by.is_some() {
                            sort.apply(&mut offers);
                        }
                        info!(count = offers.len(), "Serving external offers");
                        return Ok(SearchResult {
                            source: SearchSource::External,
                            flights: offers.into_iter().map(FlightListing::External).collect(),
                        });
                    }
                    Some(_) => info!("No external offers, falling back to local inventory"),
                    None => {}
                }
            }
        }

        let filter = FlightFilter {
            source: params.source.clone(),
            destination: params.destination.clone(),
            date: params.date,
        };
        let flights = self.flights.find_flights(&filter, sort).await?;
        debug!(count = flights.len(), "Serving local flights");

        Ok(SearchResult {
            source: SearchSource::Local,
            flights: flights.into_iter().map(FlightListing::Inventory).collect(),
        })
    }

    /// Up to six flights: the first external offer per popular route for
    /// tomorrow, topped up with the soonest local departures, in random order.
    pub async fn popular(&self) -> CoreResult<Vec<FlightListing>> {
        let mut picks = Vec::with_capacity(POPULAR_LIMIT);

        if self.provider.is_some() {
            let date = (Utc::now() + chrono::Duration::days(1)).date_naive();
            for (source, destination) in POPULAR_ROUTES {
                let query = OfferSearch {
                    source: source.to_string(),
                    destination: destination.to_string(),
                    date,
                    class: FareClass::Economy,
                };
                if let Some(first) = self.search_external(&query).await.and_then(|o| o.into_iter().next()) {
                    picks.push(FlightListing::External(first));
                }
            }
        }

        if picks.len() < POPULAR_LIMIT {
            let mut local = self
                .flights
                .find_flights(&FlightFilter::default(), FlightSort::default())
                .await?;
            local.truncate(POPULAR_LIMIT - picks.len());
            picks.extend(local.into_iter().map(FlightListing::Inventory));
        }

        picks.shuffle(&mut rand::thread_rng());
        picks.truncate(POPULAR_LIMIT);
        Ok(picks)
    }

    /// `None` when there is no provider, the breaker is open, or the call failed.
    async fn search_external(&self, query: &OfferSearch) -> Option<Vec<OfferSnapshot>> {
        let provider = self.provider.as_ref()?;
        if !self.breaker.check().await {
            debug!(provider = provider.name(), "Circuit open, skipping provider");
            return None;
        }

        match tokio::time::timeout(self.timeout, provider.search(query)).await {
            Ok(Ok(offers)) => {
                self.breaker.record_success().await;
                Some(offers)
            }
            Ok(Err(e)) => {
                warn!(provider = provider.name(), error = %e, "Provider search failed, falling back to local inventory");
                self.breaker.record_failure().await;
                None
            }
            Err(_) => {
                warn!(provider = provider.name(), timeout_ms = self.timeout.as_millis() as u64, "Provider search timed out");
                self.breaker.record_failure().await;
                None
            }
        }
    }
}
