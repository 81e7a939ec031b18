use aerobook_core::{CoreError, CoreResult, FareClass, PriceMap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Business fare as a multiple of the provider's base fare
    pub business_multiplier: f64,

    /// First fare as a multiple of the provider's base fare
    pub first_multiplier: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            business_multiplier: 2.5,
            first_multiplier: 4.0,
        }
    }
}

/// Result of pricing a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub class: FareClass,
    pub unit_price: i64,
    pub passengers: u32,
    pub total: i64,
}

pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Total = unit price x passenger count. No taxes, fees or discounts.
    pub fn quote(&self, class: FareClass, unit_price: i64, passengers: u32) -> CoreResult<PriceQuote> {
        let total = unit_price
            .checked_mul(passengers as i64)
            .ok_or_else(|| CoreError::InvalidArgument("Booking total is out of range".to_string()))?;

        Ok(PriceQuote {
            class,
            unit_price,
            passengers,
            total,
        })
    }

    /// Per-class prices from a single provider base fare, rounded to whole units.
    pub fn derive_class_prices(&self, base: f64) -> PriceMap {
        PriceMap {
            economy: Some(base.round() as i64),
            business: Some((base * self.config.business_multiplier).round() as i64),
            first: Some((base * self.config.first_multiplier).round() as i64),
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_multiplies_by_passengers() {
        let engine = PricingEngine::default();
        let quote = engine.quote(FareClass::Economy, 4999, 2).unwrap();
        assert_eq!(quote.total, 9998);
        assert_eq!(quote.unit_price, 4999);
    }

    #[test]
    fn test_quote_overflow_is_rejected() {
        let engine = PricingEngine::default();
        assert!(engine.quote(FareClass::First, i64::MAX, 2).is_err());
    }

    #[test]
    fn test_derived_class_prices() {
        let engine = PricingEngine::default();
        let prices = engine.derive_class_prices(4999.6);

        assert_eq!(prices.economy, Some(5000));
        assert_eq!(prices.business, Some(12499));
        assert_eq!(prices.first, Some(19998));
    }
}
