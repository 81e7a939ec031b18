//! Amadeus self-service flight offers client.

use std::time::Duration;

use aerobook_catalog::PricingEngine;
use aerobook_core::search::OfferSearch;
use aerobook_core::supplier::{ExternalOfferProvider, ProviderError};
use aerobook_core::{FareClass, FlightStatus, OfferSnapshot, SeatCount, SeatMap};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::token::{AccessToken, TokenCache, TokenSource};

pub const DEFAULT_BASE_URL: &str = "https://test.api.amadeus.com";

/// Prefix of every offer id this provider hands out.
pub const OFFER_ID_PREFIX: &str = "amadeus_";

const MAX_RESULTS: &str = "20";
const CURRENCY: &str = "INR";

#[derive(Debug, Clone)]
pub struct AmadeusSettings {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

pub struct AmadeusClient {
    settings: AmadeusSettings,
    http: Client,
    tokens: TokenCache,
    pricing: PricingEngine,
}

impl AmadeusClient {
    pub fn new(settings: AmadeusSettings) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        Ok(Self {
            settings,
            http,
            tokens: TokenCache::new(),
            pricing: PricingEngine::default(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

fn transport(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl TokenSource for AmadeusClient {
    async fn fetch_token(&self) -> Result<AccessToken, ProviderError> {
        let response = self
            .http
            .post(self.url("/v1/security/oauth2/token"))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(ProviderError::Authentication(format!(
                "token request returned {}",
                response.status()
            )));
        }

        response
            .json::<AccessToken>()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ExternalOfferProvider for AmadeusClient {
    fn name(&self) -> &'static str {
        "amadeus"
    }

    async fn search(&self, query: &OfferSearch) -> Result<Vec<OfferSnapshot>, ProviderError> {
        let token = self.tokens.get_or_refresh(self).await?;

        let response = self
            .http
            .get(self.url("/v2/shopping/flight-offers"))
            .bearer_auth(token)
            .query(&search_params(query))
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => {
                self.tokens.invalidate().await;
                return Err(ProviderError::Authentication("flight search rejected the access token".to_string()));
            }
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::InvalidRequest(body));
            }
            status => return Err(ProviderError::Unavailable(format!("flight search returned {}", status))),
        }

        let body: OffersResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let mut rng = rand::thread_rng();
        let offers: Vec<OfferSnapshot> = body
            .data
            .iter()
            .filter_map(|offer| normalize(offer, query, &self.pricing, &mut rng))
            .collect();
        debug!(count = offers.len(), source = %query.source, destination = %query.destination, "Provider offers received");
        Ok(offers)
    }
}

/// Query string for a one-adult search. Economy is the provider default and is not sent.
pub fn search_params(query: &OfferSearch) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("originLocationCode", city_code(&query.source).to_string()),
        ("destinationLocationCode", city_code(&query.destination).to_string()),
        ("departureDate", query.date.format("%Y-%m-%d").to_string()),
        ("adults", "1".to_string()),
        ("max", MAX_RESULTS.to_string()),
        ("currencyCode", CURRENCY.to_string()),
    ];
    if query.class != FareClass::Economy {
        params.push(("travelClass", query.class.as_str().to_uppercase()));
    }
    params
}

/// IATA code for a known city name; anything else is passed through as given.
pub fn city_code(city: &str) -> &str {
    match city {
        "Delhi" => "DEL",
        "Mumbai" => "BOM",
        "Bangalore" => "BLR",
        "Chennai" => "MAA",
        "Kolkata" => "CCU",
        "Hyderabad" => "HYD",
        "Pune" => "PNQ",
        "Jaipur" => "JAI",
        "Ahmedabad" => "AMD",
        "Goa" => "GOI",
        "Kochi" => "COK",
        "Lucknow" => "LKO",
        "Chandigarh" => "IXC",
        "Bhubaneswar" => "BBI",
        "Guwahati" => "GAU",
        "Indore" => "IDR",
        "Nagpur" => "NAG",
        "Coimbatore" => "CJB",
        "Vadodara" => "BDQ",
        "Visakhapatnam" => "VTZ",
        other => other,
    }
}

pub fn airline_name(carrier: &str) -> String {
    let name = match carrier {
        "AI" => "Air India",
        "6E" => "IndiGo",
        "SG" => "SpiceJet",
        "UK" => "Vistara",
        "G8" => "GoAir",
        "I5" => "AirAsia India",
        "9W" => "Jet Airways",
        "S2" => "JetLite",
        "DN" => "Alliance Air",
        "LB" => "Air Costa",
        _ => return format!("{} Airlines", carrier),
    };
    name.to_string()
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<RawOffer>,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    id: String,
    itineraries: Vec<RawItinerary>,
    price: RawPrice,
}

#[derive(Debug, Deserialize)]
struct RawItinerary {
    segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSegment {
    departure: RawEndpoint,
    arrival: RawEndpoint,
    carrier_code: String,
    number: String,
}

#[derive(Debug, Deserialize)]
struct RawEndpoint {
    at: String,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    total: String,
}

/// Provider timestamps are local wall-clock times without an offset.
fn parse_at(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|t| t.and_utc())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|t| t.with_timezone(&Utc)))
}

fn format_duration(departure: DateTime<Utc>, arrival: DateTime<Utc>) -> String {
    let minutes = (arrival - departure).num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Seat counts are not part of the search response; these are display-only figures.
fn mock_seats<R: Rng>(rng: &mut R) -> SeatMap {
    SeatMap::new(
        SeatCount::new(150, rng.gen_range(100..150)),
        SeatCount::new(30, rng.gen_range(10..30)),
        SeatCount::new(10, rng.gen_range(2..10)),
    )
}

/// First segment of the first itinerary becomes the listing. Offers missing
/// either, or with unreadable times or price, are dropped.
fn normalize<R: Rng>(offer: &RawOffer, query: &OfferSearch, pricing: &PricingEngine, rng: &mut R) -> Option<OfferSnapshot> {
    let segment = offer.itineraries.first()?.segments.first()?;
    let departure = parse_at(&segment.departure.at);
    let arrival = parse_at(&segment.arrival.at);
    let base: Option<f64> = offer.price.total.parse().ok();

    let (departure, arrival, base) = match (departure, arrival, base) {
        (Some(d), Some(a), Some(b)) => (d, a, b),
        _ => {
            warn!(offer_id = %offer.id, "Skipping unreadable provider offer");
            return None;
        }
    };

    Some(OfferSnapshot {
        id: format!("{}{}", OFFER_ID_PREFIX, offer.id),
        flight_number: format!("{}{}", segment.carrier_code, segment.number),
        airline: airline_name(&segment.carrier_code),
        source: query.source.clone(),
        destination: query.destination.clone(),
        departure_date: departure,
        departure_time: departure.format("%H:%M").to_string(),
        arrival_time: arrival.format("%H:%M").to_string(),
        duration: format_duration(departure, arrival),
        price: pricing.derive_class_prices(base),
        seats: mock_seats(rng),
        status: FlightStatus::Scheduled,
        external: true,
    })
}
