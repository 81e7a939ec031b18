use aerobook_core::repository::{FlightRepository, RepositoryError, RepositoryResult};
use aerobook_core::search::{FlightFilter, FlightSort};
use aerobook_core::{FareClass, FareTable, Flight, SeatCount, SeatMap};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{backend, corrupt, db_int, on_insert};

pub struct PostgresFlightRepository {
    pool: PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_number: String,
    airline: String,
    source: String,
    destination: String,
    departure_date: DateTime<Utc>,
    departure_time: String,
    arrival_time: String,
    duration: String,
    price_economy: i64,
    price_business: i64,
    price_first: i64,
    economy_total: i32,
    economy_available: i32,
    business_total: i32,
    business_available: i32,
    first_total: i32,
    first_available: i32,
    status: String,
    created_at: DateTime<Utc>,
}

fn seats(total: i32, available: i32) -> SeatCount {
    SeatCount::new(total.max(0) as u32, available.max(0) as u32)
}

impl TryFrom<FlightRow> for Flight {
    type Error = RepositoryError;

    fn try_from(row: FlightRow) -> Result<Self, Self::Error> {
        Ok(Flight {
            id: row.id,
            flight_number: row.flight_number,
            airline: row.airline,
            source: row.source,
            destination: row.destination,
            departure_date: row.departure_date,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            duration: row.duration,
            price: FareTable::new(row.price_economy, row.price_business, row.price_first),
            seats: SeatMap::new(
                seats(row.economy_total, row.economy_available),
                seats(row.business_total, row.business_available),
                seats(row.first_total, row.first_available),
            ),
            status: row.status.parse().map_err(|e| corrupt("status", e))?,
            created_at: row.created_at,
        })
    }
}

/// Column pair holding `(total, available)` for a fare class.
fn seat_columns(class: FareClass) -> (&'static str, &'static str) {
    match class {
        FareClass::Economy => ("economy_total", "economy_available"),
        FareClass::Business => ("business_total", "business_available"),
        FareClass::First => ("first_total", "first_available"),
    }
}

const SELECT_FLIGHT: &str = r#"
    SELECT id, flight_number, airline, source, destination, departure_date,
           departure_time, arrival_time, duration,
           price_economy, price_business, price_first,
           economy_total, economy_available, business_total, business_available,
           first_total, first_available, status, created_at
    FROM flights
"#;

#[async_trait]
impl FlightRepository for PostgresFlightRepository {
    async fn get_flight(&self, id: Uuid) -> RepositoryResult<Option<Flight>> {
        let row: Option<FlightRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_FLIGHT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(Flight::try_from).transpose()
    }

    async fn find_flights(&self, filter: &FlightFilter, sort: FlightSort) -> RepositoryResult<Vec<Flight>> {
        let rows: Vec<FlightRow> = sqlx::query_as(&format!(
            r#"{}
            WHERE ($1::text IS NULL OR source ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR destination ILIKE '%' || $2 || '%')
              AND ($3::date IS NULL OR (departure_date AT TIME ZONE 'UTC')::date = $3)
            "#,
            SELECT_FLIGHT
        ))
        .bind(filter.source.as_deref().map(str::trim))
        .bind(filter.destination.as_deref().map(str::trim))
        .bind(filter.date)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut flights = rows.into_iter().map(Flight::try_from).collect::<RepositoryResult<Vec<_>>>()?;
        sort.apply(&mut flights);
        Ok(flights)
    }

    async fn create_flight(&self, flight: &Flight) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO flights (
                id, flight_number, airline, source, destination, departure_date,
                departure_time, arrival_time, duration,
                price_economy, price_business, price_first,
                economy_total, economy_available, business_total, business_available,
                first_total, first_available, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(flight.id)
        .bind(&flight.flight_number)
        .bind(&flight.airline)
        .bind(&flight.source)
        .bind(&flight.destination)
        .bind(flight.departure_date)
        .bind(&flight.departure_time)
        .bind(&flight.arrival_time)
        .bind(&flight.duration)
        .bind(flight.price.economy)
        .bind(flight.price.business)
        .bind(flight.price.first)
        .bind(db_int(flight.seats.economy.total, "economy_total")?)
        .bind(db_int(flight.seats.economy.available, "economy_available")?)
        .bind(db_int(flight.seats.business.total, "business_total")?)
        .bind(db_int(flight.seats.business.available, "business_available")?)
        .bind(db_int(flight.seats.first.total, "first_total")?)
        .bind(db_int(flight.seats.first.available, "first_available")?)
        .bind(flight.status.as_str())
        .bind(flight.created_at)
        .execute(&self.pool)
        .await
        .map_err(on_insert("flight_number"))?;

        Ok(())
    }

    async fn update_flight(&self, flight: &Flight) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE flights SET
                flight_number = $2, airline = $3, source = $4, destination = $5,
                departure_date = $6, departure_time = $7, arrival_time = $8, duration = $9,
                price_economy = $10, price_business = $11, price_first = $12,
                status = $13
            WHERE id = $1
            "#,
        )
        .bind(flight.id)
        .bind(&flight.flight_number)
        .bind(&flight.airline)
        .bind(&flight.source)
        .bind(&flight.destination)
        .bind(flight.departure_date)
        .bind(&flight.departure_time)
        .bind(&flight.arrival_time)
        .bind(&flight.duration)
        .bind(flight.price.economy)
        .bind(flight.price.business)
        .bind(flight.price.first)
        .bind(flight.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(on_insert("flight_number"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Flight".to_string()));
        }
        Ok(())
    }

    async fn set_seats(&self, id: Uuid, seats: &SeatMap) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE flights SET
                economy_total = $2, economy_available = $3,
                business_total = $4, business_available = $5,
                first_total = $6, first_available = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(db_int(seats.economy.total, "economy_total")?)
        .bind(db_int(seats.economy.available, "economy_available")?)
        .bind(db_int(seats.business.total, "business_total")?)
        .bind(db_int(seats.business.available, "business_available")?)
        .bind(db_int(seats.first.total, "first_total")?)
        .bind(db_int(seats.first.available, "first_available")?)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Flight".to_string()));
        }
        Ok(())
    }

    async fn delete_flight(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM flights WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn reserve_seats(&self, id: Uuid, class: FareClass, count: u32) -> RepositoryResult<SeatCount> {
        let (total, available) = seat_columns(class);

        // Conditional decrement: the row only changes if enough seats remain.
        let updated: Option<(i32, i32)> = sqlx::query_as(&format!(
            "UPDATE flights SET {a} = {a} - $2 WHERE id = $1 AND {a} >= $2 RETURNING {t}, {a}",
            a = available,
            t = total
        ))
        .bind(id)
        .bind(db_int(count, "count")?)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        if let Some((t, a)) = updated {
            return Ok(seats(t, a));
        }

        let current: Option<(i32,)> = sqlx::query_as(&format!("SELECT {} FROM flights WHERE id = $1", available))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match current {
            Some((a,)) => Err(RepositoryError::InsufficientSeats {
                requested: count,
                available: a.max(0) as u32,
            }),
            None => Err(RepositoryError::NotFound("Flight".to_string())),
        }
    }

    async fn release_seats(&self, id: Uuid, class: FareClass, count: u32) -> RepositoryResult<SeatCount> {
        let (total, available) = seat_columns(class);

        let updated: Option<(i32, i32)> = sqlx::query_as(&format!(
            "UPDATE flights SET {a} = LEAST({t}, {a} + $2) WHERE id = $1 RETURNING {t}, {a}",
            a = available,
            t = total
        ))
        .bind(id)
        .bind(db_int(count, "count")?)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        updated
            .map(|(t, a)| seats(t, a))
            .ok_or_else(|| RepositoryError::NotFound("Flight".to_string()))
    }
}
