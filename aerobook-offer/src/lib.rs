pub mod promotion;
pub mod token;
pub mod amadeus;
pub mod breaker;
pub mod search;

pub use promotion::PromotionRegistry;
pub use token::{AccessToken, TokenCache, TokenSource};
pub use amadeus::{AmadeusClient, AmadeusSettings};
pub use breaker::{CircuitBreaker, CircuitState};
pub use search::{FlightSearchService, SearchParams, SearchResult, SearchSource};
