use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::flight::{FareClass, Flight, FlightListing, OfferSnapshot};

/// Local inventory filter. Text fields match case-insensitively as substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightFilter {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Price(FareClass),
    DepartureTime,
    DepartureDate,
    Airline,
    FlightNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightSort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for FlightSort {
    fn default() -> Self {
        Self { key: SortKey::DepartureDate, order: SortOrder::Asc }
    }
}

impl FlightSort {
    /// Build from the query-string form (`sortBy`, `sortOrder`, `class`).
    /// Unknown keys fall back to departure date; price without a class sorts by economy.
    pub fn from_params(sort_by: Option<&str>, order: Option<&str>, class: Option<FareClass>) -> Self {
        let key = match sort_by {
            Some("price") => SortKey::Price(class.unwrap_or(FareClass::Economy)),
            Some("departureTime") => SortKey::DepartureTime,
            Some("airline") => SortKey::Airline,
            Some("flightNumber") => SortKey::FlightNumber,
            _ => SortKey::DepartureDate,
        };
        let order = match order {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        Self { key, order }
    }
}

impl FlightFilter {
    pub fn matches<L: Listing>(&self, listing: &L) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle {
                Some(n) => haystack.to_lowercase().contains(&n.trim().to_lowercase()),
                None => true,
            }
        }

        contains(listing.source(), &self.source)
            && contains(listing.destination(), &self.destination)
            && self.date.map_or(true, |d| listing.departure_date().date_naive() == d)
    }
}

/// Common view over inventory flights and external offers for filtering and sorting.
pub trait Listing {
    fn source(&self) -> &str;
    fn destination(&self) -> &str;
    fn airline(&self) -> &str;
    fn flight_number(&self) -> &str;
    fn departure_date(&self) -> DateTime<Utc>;
    fn departure_time(&self) -> &str;
    fn price(&self, class: FareClass) -> Option<i64>;
}

impl Listing for Flight {
    fn source(&self) -> &str { &self.source }
    fn destination(&self) -> &str { &self.destination }
    fn airline(&self) -> &str { &self.airline }
    fn flight_number(&self) -> &str { &self.flight_number }
    fn departure_date(&self) -> DateTime<Utc> { self.departure_date }
    fn departure_time(&self) -> &str { &self.departure_time }
    fn price(&self, class: FareClass) -> Option<i64> { Some(*self.price.get(class)) }
}

impl Listing for OfferSnapshot {
    fn source(&self) -> &str { &self.source }
    fn destination(&self) -> &str { &self.destination }
    fn airline(&self) -> &str { &self.airline }
    fn flight_number(&self) -> &str { &self.flight_number }
    fn departure_date(&self) -> DateTime<Utc> { self.departure_date }
    fn departure_time(&self) -> &str { &self.departure_time }
    fn price(&self, class: FareClass) -> Option<i64> { self.price.get(class) }
}

impl Listing for FlightListing {
    fn source(&self) -> &str {
        match self {
            FlightListing::Inventory(f) => f.source(),
            FlightListing::External(o) => o.source(),
        }
    }
    fn destination(&self) -> &str {
        match self {
            FlightListing::Inventory(f) => f.destination(),
            FlightListing::External(o) => o.destination(),
        }
    }
    fn airline(&self) -> &str {
        match self {
            FlightListing::Inventory(f) => f.airline(),
            FlightListing::External(o) => o.airline(),
        }
    }
    fn flight_number(&self) -> &str {
        match self {
            FlightListing::Inventory(f) => f.flight_number(),
            FlightListing::External(o) => o.flight_number(),
        }
    }
    fn departure_date(&self) -> DateTime<Utc> {
        FlightListing::departure_date(self)
    }
    fn departure_time(&self) -> &str {
        match self {
            FlightListing::Inventory(f) => f.departure_time(),
            FlightListing::External(o) => o.departure_time(),
        }
    }
    fn price(&self, class: FareClass) -> Option<i64> {
        match self {
            FlightListing::Inventory(f) => Listing::price(f, class),
            FlightListing::External(o) => Listing::price(o, class),
        }
    }
}

impl FlightSort {
    pub fn compare<L: Listing>(&self, a: &L, b: &L) -> Ordering {
        let ord = match self.key {
            // Unpriced classes sort after priced ones.
            SortKey::Price(class) => a
                .price(class)
                .unwrap_or(i64::MAX)
                .cmp(&b.price(class).unwrap_or(i64::MAX)),
            SortKey::DepartureTime => a.departure_time().cmp(b.departure_time()),
            SortKey::DepartureDate => a.departure_date().cmp(&b.departure_date()),
            SortKey::Airline => a.airline().cmp(b.airline()),
            SortKey::FlightNumber => a.flight_number().cmp(b.flight_number()),
        };
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }

    pub fn apply<L: Listing>(&self, listings: &mut [L]) {
        listings.sort_by(|a, b| self.compare(a, b));
    }
}

/// Query handed to an external offer provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferSearch {
    pub source: String,
    pub destination: String,
    pub date: NaiveDate,
    pub class: FareClass,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::{FarePrices, FlightStatus, SeatCount, SeatMap};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn flight(number: &str, source: &str, destination: &str, day: u32, economy: i64) -> Flight {
        Flight {
            id: Uuid::new_v4(),
            flight_number: number.to_string(),
            airline: "IndiGo".to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            departure_date: Utc.with_ymd_and_hms(2026, 3, day, 6, 0, 0).unwrap(),
            departure_time: "06:00".to_string(),
            arrival_time: "08:10".to_string(),
            duration: "2h 10m".to_string(),
            price: FarePrices::new(economy, economy * 2, economy * 4),
            seats: SeatMap::new(SeatCount::new(150, 150), SeatCount::new(30, 30), SeatCount::new(10, 10)),
            status: FlightStatus::Scheduled,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let f = flight("6E201", "New Delhi", "Mumbai", 10, 4500);
        let filter = FlightFilter { source: Some("delhi".to_string()), destination: Some("MUM".to_string()), date: None };
        assert!(filter.matches(&f));

        let filter = FlightFilter { source: Some("Chennai".to_string()), ..Default::default() };
        assert!(!filter.matches(&f));
    }

    #[test]
    fn test_filter_date_matches_whole_day() {
        let f = flight("6E201", "Delhi", "Mumbai", 10, 4500);
        let on_day = FlightFilter { date: NaiveDate::from_ymd_opt(2026, 3, 10), ..Default::default() };
        let next_day = FlightFilter { date: NaiveDate::from_ymd_opt(2026, 3, 11), ..Default::default() };
        assert!(on_day.matches(&f));
        assert!(!next_day.matches(&f));
    }

    #[test]
    fn test_sort_by_price_descending() {
        let mut flights = vec![
            flight("A", "Delhi", "Mumbai", 10, 3000),
            flight("B", "Delhi", "Mumbai", 11, 5000),
            flight("C", "Delhi", "Mumbai", 12, 4000),
        ];
        FlightSort { key: SortKey::Price(FareClass::Economy), order: SortOrder::Desc }.apply(&mut flights);
        let order: Vec<_> = flights.iter().map(|f| f.flight_number.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_from_params() {
        let sort = FlightSort::from_params(Some("price"), Some("desc"), Some(FareClass::First));
        assert_eq!(sort.key, SortKey::Price(FareClass::First));
        assert_eq!(sort.order, SortOrder::Desc);

        let sort = FlightSort::from_params(Some("price"), None, None);
        assert_eq!(sort.key, SortKey::Price(FareClass::Economy));
        assert_eq!(sort.order, SortOrder::Asc);

        assert_eq!(FlightSort::from_params(Some("bogus"), None, None), FlightSort::default());
    }
}
