use aerobook_catalog::SeatPool;
use aerobook_core::booking::{Gender, Passenger};
use aerobook_core::{CoreError, CoreResult, FareClass, PaymentMethod};

use crate::models::{CreateBookingRequest, PassengerInput};
use crate::resolve::ResolvedFlight;

pub const MIN_PASSENGER_AGE: i64 = 1;
pub const MAX_PASSENGER_AGE: i64 = 120;

/// A request that passed every check, ready to be priced.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    pub class: FareClass,
    pub payment_method: PaymentMethod,
    pub passengers: Vec<Passenger>,
    pub unit_price: i64,
}

/// Run the booking checks in order; the first failure wins.
pub fn validate(req: &CreateBookingRequest, flight: &ResolvedFlight) -> CoreResult<ValidatedBooking> {
    let class: FareClass = req.class.parse().map_err(|_| {
        CoreError::InvalidArgument("Invalid booking class. Must be economy, business, or first".to_string())
    })?;

    let payment_method: PaymentMethod = req
        .payment_method
        .parse()
        .map_err(|_| CoreError::InvalidArgument("Invalid payment method".to_string()))?;

    if req.passengers.is_empty() {
        return Err(CoreError::InvalidArgument("At least one passenger is required".to_string()));
    }

    let passengers = req
        .passengers
        .iter()
        .enumerate()
        .map(|(i, p)| passenger(i + 1, p))
        .collect::<CoreResult<Vec<_>>>()?;

    if let Some(seats) = flight.seats(class) {
        seats.ensure_available(passengers.len() as u32).map_err(|_| {
            CoreError::Conflict(format!("Only {} seats available in {} class", seats.available, class))
        })?;
    }

    let unit_price = flight
        .unit_price(class)
        .filter(|p| *p > 0)
        .ok_or_else(|| CoreError::InvalidArgument(format!("Price not available for {} class", class)))?;

    Ok(ValidatedBooking {
        class,
        payment_method,
        passengers,
        unit_price,
    })
}

fn passenger(index: usize, input: &PassengerInput) -> CoreResult<Passenger> {
    let incomplete = || CoreError::InvalidArgument(format!("Incomplete passenger data for passenger {}", index));

    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(incomplete)?;
    let age = input.age.ok_or_else(incomplete)?;
    let gender = input.gender.as_deref().ok_or_else(incomplete)?;
    let seat_number = input
        .seat_number
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(incomplete)?;

    if !(MIN_PASSENGER_AGE..=MAX_PASSENGER_AGE).contains(&age) {
        return Err(CoreError::InvalidArgument(format!(
            "Passenger age must be between {} and {} for passenger {}",
            MIN_PASSENGER_AGE, MAX_PASSENGER_AGE, index
        )));
    }
    let gender: Gender = gender.parse().map_err(|_| {
        CoreError::InvalidArgument(format!("Please select a valid gender for passenger {}", index))
    })?;

    Ok(Passenger {
        name: name.to_string(),
        age: age as u8,
        gender,
        seat_number: seat_number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerobook_core::flight::FlightDetails;
    use aerobook_core::{PriceMap, SeatCount};
    use aerobook_store::seed::demo_flights;
    use chrono::Utc;

    fn passenger_input(name: &str, seat: &str) -> PassengerInput {
        PassengerInput {
            name: Some(name.to_string()),
            age: Some(34),
            gender: Some("male".to_string()),
            seat_number: Some(seat.to_string()),
        }
    }

    fn request(passengers: Vec<PassengerInput>) -> CreateBookingRequest {
        CreateBookingRequest {
            flight_id: "ignored".to_string(),
            passengers,
            class: "economy".to_string(),
            payment_method: "credit_card".to_string(),
            ..Default::default()
        }
    }

    fn inventory_flight(available: u32) -> ResolvedFlight {
        let mut flight = demo_flights(Utc::now()).remove(0);
        flight.seats.economy = SeatCount::new(150, available);
        ResolvedFlight::Inventory(flight)
    }

    fn external_flight(price: PriceMap) -> ResolvedFlight {
        ResolvedFlight::External(FlightDetails {
            offer_id: "amadeus_9".to_string(),
            flight_number: "UK955".to_string(),
            airline: "Vistara".to_string(),
            source: "Delhi".to_string(),
            destination: "Goa".to_string(),
            departure_date: Utc::now(),
            departure_time: "13:05".to_string(),
            arrival_time: "15:40".to_string(),
            duration: None,
            price,
            seats: None,
            external: true,
        })
    }

    fn message(err: CoreError) -> String {
        err.to_string()
    }

    #[test]
    fn test_valid_request() {
        let req = request(vec![passenger_input("Meera", "14C"), passenger_input("Arjun", "14D")]);
        let validated = validate(&req, &inventory_flight(120)).unwrap();
        assert_eq!(validated.class, FareClass::Economy);
        assert_eq!(validated.payment_method, PaymentMethod::CreditCard);
        assert_eq!(validated.passengers.len(), 2);
    }

    #[test]
    fn test_checks_run_in_order() {
        // Bad class and bad payment method: the class is reported.
        let mut req = request(vec![]);
        req.class = "premium".to_string();
        req.payment_method = "cash".to_string();
        assert_eq!(
            message(validate(&req, &inventory_flight(120)).unwrap_err()),
            "Invalid booking class. Must be economy, business, or first"
        );

        // Bad payment method and no passengers: the payment method is reported.
        req.class = "first".to_string();
        assert_eq!(message(validate(&req, &inventory_flight(120)).unwrap_err()), "Invalid payment method");

        req.payment_method = "upi".to_string();
        assert_eq!(
            message(validate(&req, &inventory_flight(120)).unwrap_err()),
            "At least one passenger is required"
        );
    }

    #[test]
    fn test_incomplete_passenger_is_named_by_position() {
        let mut second = passenger_input("Kiran", "3A");
        second.seat_number = Some("  ".to_string());
        let req = request(vec![passenger_input("Meera", "3B"), second]);

        let err = validate(&req, &inventory_flight(120)).unwrap_err();
        assert_eq!(err, CoreError::InvalidArgument("Incomplete passenger data for passenger 2".to_string()));
    }

    #[test]
    fn test_passenger_age_and_gender_ranges() {
        let mut p = passenger_input("Old", "1A");
        p.age = Some(121);
        assert!(matches!(validate(&request(vec![p]), &inventory_flight(120)), Err(CoreError::InvalidArgument(_))));

        let mut p = passenger_input("Zero", "1A");
        p.age = Some(0);
        assert!(validate(&request(vec![p]), &inventory_flight(120)).is_err());

        let mut p = passenger_input("Unknown", "1A");
        p.gender = Some("robot".to_string());
        let err = validate(&request(vec![p]), &inventory_flight(120)).unwrap_err();
        assert_eq!(message(err), "Please select a valid gender for passenger 1");
    }

    #[test]
    fn test_insufficient_seats_is_conflict() {
        let req = request(vec![passenger_input("A", "1A"), passenger_input("B", "1B")]);
        let err = validate(&req, &inventory_flight(1)).unwrap_err();
        assert_eq!(err, CoreError::Conflict("Only 1 seats available in economy class".to_string()));
    }

    #[test]
    fn test_external_flights_skip_seat_check() {
        let passengers = (0..200).map(|i| passenger_input("P", &format!("{}A", i))).collect();
        let flight = external_flight(PriceMap { economy: Some(5000), business: None, first: None });
        assert!(validate(&request(passengers), &flight).is_ok());
    }

    #[test]
    fn test_missing_class_price() {
        let mut req = request(vec![passenger_input("A", "1A")]);
        req.class = "business".to_string();
        let flight = external_flight(PriceMap { economy: Some(5000), business: None, first: None });

        let err = validate(&req, &flight).unwrap_err();
        assert_eq!(err, CoreError::InvalidArgument("Price not available for business class".to_string()));
    }
}
