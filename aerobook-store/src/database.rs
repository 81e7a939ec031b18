use aerobook_core::RepositoryError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

pub(crate) fn backend(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Backend(err.to_string())
}

/// Unique-constraint violations become `DuplicateKey(key)`.
pub(crate) fn on_insert(key: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
    move |err| match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::DuplicateKey(key.to_string()),
        _ => backend(err),
    }
}

/// Seat counts are stored as INTEGER.
pub(crate) fn db_int(value: u32, column: &str) -> Result<i32, RepositoryError> {
    i32::try_from(value).map_err(|_| RepositoryError::Backend(format!("{} out of range: {}", column, value)))
}

/// Stored enum/text column that failed to parse back into a domain value.
pub(crate) fn corrupt(column: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Backend(format!("invalid {} column: {}", column, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_int_rejects_values_past_i32() {
        assert_eq!(db_int(150, "economy_total"), Ok(150));
        assert_eq!(db_int(i32::MAX as u32, "count"), Ok(i32::MAX));
        assert!(matches!(db_int(u32::MAX, "count"), Err(RepositoryError::Backend(_))));
    }
}
