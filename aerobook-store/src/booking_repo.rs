use aerobook_core::booking::{BookedFlight, Booking, BookingStatus, Passenger};
use aerobook_core::repository::{BookingRepository, RepositoryError, RepositoryResult};
use aerobook_core::{FlightDetails, PaymentStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{backend, corrupt, on_insert};

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    booking_reference: String,
    user_id: String,
    flight_id: Option<Uuid>,
    flight_details: Option<Json<FlightDetails>>,
    passengers: Json<Vec<Passenger>>,
    class: String,
    total_price: i64,
    payment_method: String,
    payment_status: String,
    booking_status: String,
    booked_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepositoryError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let flight = match (row.flight_id, row.flight_details) {
            (Some(flight_id), None) => BookedFlight::Inventory { flight_id },
            (None, Some(Json(details))) => BookedFlight::External(details),
            _ => return Err(corrupt("flight_id/flight_details", "exactly one must be set")),
        };

        Ok(Booking {
            id: row.id,
            booking_reference: row.booking_reference,
            user_id: row.user_id,
            flight,
            passengers: row.passengers.0,
            class: row.class.parse().map_err(|e| corrupt("class", e))?,
            total_price: row.total_price,
            payment_method: row.payment_method.parse().map_err(|e| corrupt("payment_method", e))?,
            payment_status: row.payment_status.parse().map_err(|e| corrupt("payment_status", e))?,
            booking_status: row.booking_status.parse().map_err(|e| corrupt("booking_status", e))?,
            booked_at: row.booked_at,
        })
    }
}

const SELECT_BOOKING: &str = r#"
    SELECT id, booking_reference, user_id, flight_id, flight_details, passengers, class,
           total_price, payment_method, payment_status, booking_status, booked_at
    FROM bookings
"#;

fn into_bookings(rows: Vec<BookingRow>) -> RepositoryResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn insert_booking(&self, booking: &Booking) -> RepositoryResult<()> {
        let (flight_id, flight_details) = match &booking.flight {
            BookedFlight::Inventory { flight_id } => (Some(*flight_id), None),
            BookedFlight::External(details) => (None, Some(Json(details))),
        };

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, booking_reference, user_id, flight_id, flight_details, passengers, class,
                total_price, payment_method, payment_status, booking_status, booked_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.booking_reference)
        .bind(&booking.user_id)
        .bind(flight_id)
        .bind(flight_details)
        .bind(Json(&booking.passengers))
        .bind(booking.class.as_str())
        .bind(booking.total_price)
        .bind(booking.payment_method.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.booking_status.as_str())
        .bind(booking.booked_at)
        .execute(&self.pool)
        .await
        .map_err(on_insert("booking_reference"))?;

        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> RepositoryResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_BOOKING))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(Booking::try_from).transpose()
    }

    async fn transition_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        payment_status: PaymentStatus,
    ) -> RepositoryResult<bool> {
        let updated: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE bookings SET booking_status = $3, payment_status = $4
            WHERE id = $1 AND booking_status = $2
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(payment_status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        if updated.is_some() {
            return Ok(true);
        }

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match exists {
            Some(_) => Ok(false),
            None => Err(RepositoryError::NotFound("Booking".to_string())),
        }
    }

    async fn list_bookings_for_user(&self, user_id: &str) -> RepositoryResult<Vec<Booking>> {
        let rows: Vec<BookingRow> =
            sqlx::query_as(&format!("{} WHERE user_id = $1 ORDER BY booked_at DESC", SELECT_BOOKING))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?;

        into_bookings(rows)
    }

    async fn list_bookings(&self) -> RepositoryResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!("{} ORDER BY booked_at DESC", SELECT_BOOKING))
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        into_bookings(rows)
    }
}
