//! Demo inventory and promotions for local development.

use aerobook_core::promotion::Promotion;
use aerobook_core::repository::{FlightRepository, PromotionRepository, RepositoryResult};
use aerobook_core::search::{FlightFilter, FlightSort};
use aerobook_core::{FareTable, Flight, FlightStatus, SeatCount, SeatMap};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use tracing::info;
use uuid::Uuid;

// (number, airline, from, to, days out, dep, arr, duration, [prices], [(total, available)])
type FlightSeed = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    i64,
    &'static str,
    &'static str,
    &'static str,
    [i64; 3],
    [(u32, u32); 3],
);

const FLIGHTS: &[FlightSeed] = &[
    ("AI101", "Air India", "Delhi", "Mumbai", 7, "08:00", "10:15", "2h 15m", [4999, 12999, 19999], [(150, 120), (30, 25), (10, 8)]),
    ("6E235", "IndiGo", "Mumbai", "Bangalore", 5, "10:15", "12:00", "1h 45m", [3499, 8999, 14999], [(180, 150), (40, 35), (12, 10)]),
    ("SG123", "SpiceJet", "Bangalore", "Chennai", 3, "12:30", "13:45", "1h 15m", [2999, 7999, 12999], [(120, 100), (20, 18), (8, 6)]),
    ("UK456", "Vistara", "Delhi", "Kolkata", 2, "14:45", "17:00", "2h 15m", [5499, 11999, 18999], [(160, 140), (25, 20), (10, 8)]),
    ("G8567", "GoAir", "Mumbai", "Goa", 1, "07:30", "09:00", "1h 30m", [3299, 7499, 11999], [(140, 120), (20, 15), (8, 5)]),
    ("AI202", "Air India", "Chennai", "Delhi", 8, "22:00", "00:30", "2h 30m", [5299, 12499, 19499], [(150, 130), (30, 28), (10, 9)]),
    ("6E789", "IndiGo", "Kolkata", "Mumbai", 6, "15:20", "17:50", "2h 30m", [4599, 10999, 16999], [(180, 160), (40, 30), (12, 8)]),
    ("SG456", "SpiceJet", "Hyderabad", "Bangalore", 4, "09:45", "11:00", "1h 15m", [2799, 6999, 10999], [(120, 90), (20, 15), (8, 4)]),
    ("UK789", "Vistara", "Goa", "Delhi", 9, "11:15", "13:45", "2h 30m", [4999, 9999, 15999], [(160, 130), (25, 20), (10, 7)]),
    ("G8321", "GoAir", "Pune", "Chennai", 10, "18:30", "20:30", "2h 00m", [3599, 8599, 13599], [(140, 100), (20, 12), (8, 4)]),
    ("AI505", "Air India", "Delhi", "Bangalore", 3, "06:15", "08:45", "2h 30m", [5199, 11599, 18599], [(150, 125), (30, 22), (10, 7)]),
    ("6E404", "IndiGo", "Mumbai", "Jaipur", 5, "13:20", "15:10", "1h 50m", [3899, 8299, 13299], [(180, 145), (40, 32), (12, 9)]),
    ("AA1234", "American Airlines", "New York", "Los Angeles", 7, "08:00", "11:30", "3h 30m", [299, 599, 899], [(150, 120), (30, 25), (10, 8)]),
    ("DL5678", "Delta Airlines", "Chicago", "Miami", 5, "10:15", "14:00", "3h 45m", [249, 549, 849], [(180, 150), (40, 35), (12, 10)]),
    ("UA9012", "United Airlines", "San Francisco", "Seattle", 3, "12:30", "14:45", "2h 15m", [199, 399, 699], [(120, 100), (20, 18), (8, 6)]),
    ("SW3456", "Southwest Airlines", "Dallas", "Las Vegas", 2, "14:45", "16:30", "1h 45m", [179, 379, 579], [(160, 140), (25, 20), (10, 8)]),
    ("JB7890", "JetBlue", "Boston", "Washington DC", 1, "07:30", "09:00", "1h 30m", [149, 349, 549], [(140, 120), (20, 15), (8, 5)]),
    ("AA5432", "American Airlines", "Los Angeles", "New York", 8, "22:00", "06:30", "5h 30m", [329, 629, 929], [(150, 130), (30, 28), (10, 9)]),
];

// (title, description, discount, days valid, style)
const PROMOTIONS: &[(&str, &str, &str, i64, &str)] = &[
    ("Summer Sale", "Save up to 40% on domestic flights", "40% OFF", 30, "from-orange-400 to-pink-500"),
    ("Business Class Upgrade", "Upgrade to business class for just ₹4999", "₹4999", 45, "from-purple-500 to-indigo-600"),
    ("Group Booking", "Book for 4+ passengers and save 25%", "25% OFF", 60, "from-green-400 to-blue-500"),
];

/// Departure `days` after `now`, at the scheduled clock time (UTC).
fn departure(now: DateTime<Utc>, days: i64, time: &str) -> DateTime<Utc> {
    let day = (now + Duration::days(days)).date_naive();
    let time = NaiveTime::parse_from_str(time, "%H:%M").unwrap_or(NaiveTime::MIN);
    day.and_time(time).and_utc()
}

/// The demo schedule relative to `now`. `AI101` (Delhi to Mumbai) is always first.
pub fn demo_flights(now: DateTime<Utc>) -> Vec<Flight> {
    FLIGHTS
        .iter()
        .map(|(number, airline, source, destination, days, dep, arr, duration, price, seats)| Flight {
            id: Uuid::new_v4(),
            flight_number: number.to_string(),
            airline: airline.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            departure_date: departure(now, *days, dep),
            departure_time: dep.to_string(),
            arrival_time: arr.to_string(),
            duration: duration.to_string(),
            price: FareTable::new(price[0], price[1], price[2]),
            seats: SeatMap::new(
                SeatCount::new(seats[0].0, seats[0].1),
                SeatCount::new(seats[1].0, seats[1].1),
                SeatCount::new(seats[2].0, seats[2].1),
            ),
            status: FlightStatus::Scheduled,
            created_at: now,
        })
        .collect()
}

pub fn demo_promotions(now: DateTime<Utc>) -> Vec<Promotion> {
    PROMOTIONS
        .iter()
        .enumerate()
        .map(|(i, (title, description, discount, days, style))| Promotion {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            discount: discount.to_string(),
            valid_until: now + Duration::days(*days),
            bg_color: style.to_string(),
            is_active: true,
            // Keep listing order stable: first entry is the newest.
            created_at: now - Duration::seconds(i as i64),
        })
        .collect()
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub flights: usize,
    pub promotions: usize,
}

/// Insert the demo data into empty stores. Stores that already hold data are left alone.
pub async fn seed_demo_data(
    flights: &dyn FlightRepository,
    promotions: &dyn PromotionRepository,
) -> RepositoryResult<SeedReport> {
    let now = Utc::now();
    let mut report = SeedReport::default();

    if flights.find_flights(&FlightFilter::default(), FlightSort::default()).await?.is_empty() {
        for flight in demo_flights(now) {
            flights.create_flight(&flight).await?;
            report.flights += 1;
        }
    }

    if promotions.list_promotions(false).await?.is_empty() {
        for promotion in demo_promotions(now) {
            promotions.create_promotion(&promotion).await?;
            report.promotions += 1;
        }
    }

    info!(flights = report.flights, promotions = report.promotions, "Demo data seeded");
    Ok(report)
}
