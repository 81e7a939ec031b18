use aerobook_core::repository::RepositoryError;
use aerobook_core::SeatCount;

/// Seat arithmetic for a single fare class.
pub trait SeatPool {
    /// Ensure `count` seats can be taken without touching the counts.
    fn ensure_available(&self, count: u32) -> Result<(), InventoryError>;

    /// Take `count` seats, only if that many remain.
    fn reserve(&mut self, count: u32) -> Result<(), InventoryError>;

    /// Return `count` seats. Never exceeds the class total.
    fn release(&mut self, count: u32);
}

impl SeatPool for SeatCount {
    fn ensure_available(&self, count: u32) -> Result<(), InventoryError> {
        if self.available < count {
            return Err(InventoryError::InsufficientSeats {
                requested: count,
                available: self.available,
            });
        }
        Ok(())
    }

    fn reserve(&mut self, count: u32) -> Result<(), InventoryError> {
        self.ensure_available(count)?;
        self.available -= count;
        Ok(())
    }

    fn release(&mut self, count: u32) {
        self.available = self.available.saturating_add(count).min(self.total);
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Insufficient seats: requested {requested}, available {available}")]
    InsufficientSeats {
        requested: u32,
        available: u32,
    },

    #[error("Seat counts out of range: available {available} exceeds total {total}")]
    InvalidCounts {
        total: u32,
        available: u32,
    },
}

impl From<InventoryError> for RepositoryError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::InsufficientSeats { requested, available } => {
                RepositoryError::InsufficientSeats { requested, available }
            }
            other => RepositoryError::Backend(other.to_string()),
        }
    }
}

/// Check `0 <= available <= total`.
pub fn validate_counts(seats: &SeatCount) -> Result<(), InventoryError> {
    if seats.available > seats.total {
        return Err(InventoryError::InvalidCounts {
            total: seats.total,
            available: seats.available,
        });
    }
    Ok(())
}
