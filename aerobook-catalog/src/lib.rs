pub mod flight;
pub mod pricing;
pub mod inventory;

pub use flight::{FlightCatalog, FlightDraft};
pub use pricing::{PriceQuote, PricingConfig, PricingEngine};
pub use inventory::{InventoryError, SeatPool};
