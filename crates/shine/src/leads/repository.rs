use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{Booking, BookingId, BookingStatus};
use crate::repository::RepositoryError;

/// Storage abstraction so the booking service can be exercised in isolation.
pub trait BookingRepository: Send + Sync {
    fn insert(&self, booking: Booking) -> Result<Booking, RepositoryError>;
    fn update(&self, booking: Booking) -> Result<Booking, RepositoryError>;
    fn fetch(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError>;
    fn delete(&self, id: BookingId) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<Booking>, RepositoryError>;
    /// Set the status of every listed booking that exists and return how many matched.
    fn set_status(
        &self,
        ids: &[BookingId],
        status: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError>;
}

/// Mutex-guarded in-process store keyed by id.
#[derive(Debug, Default)]
pub struct MemoryBookingStore {
    bookings: Mutex<BTreeMap<BookingId, Booking>>,
}

impl MemoryBookingStore {
    fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<BookingId, Booking>>, RepositoryError> {
        self.bookings
            .lock()
            .map_err(|_| RepositoryError::Unavailable("booking store mutex poisoned".to_string()))
    }
}

impl BookingRepository for MemoryBookingStore {
    fn insert(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        let mut rows = self.rows()?;
        if rows.contains_key(&booking.id) {
            return Err(RepositoryError::Conflict);
        }
        rows.insert(booking.id, booking.clone());
        Ok(booking)
    }

    fn update(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        let mut rows = self.rows()?;
        match rows.get_mut(&booking.id) {
            Some(row) => {
                *row = booking.clone();
                Ok(booking)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.rows()?.get(&id).cloned())
    }

    fn delete(&self, id: BookingId) -> Result<(), RepositoryError> {
        self.rows()?
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<Booking>, RepositoryError> {
        Ok(self.rows()?.values().cloned().collect())
    }

    fn set_status(
        &self,
        ids: &[BookingId],
        status: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let mut rows = self.rows()?;
        let mut matched = 0;
        for id in ids.iter().collect::<BTreeSet<_>>() {
            if let Some(row) = rows.get_mut(id) {
                row.status = status;
                row.updated_at = at;
                matched += 1;
            }
        }
        Ok(matched)
    }
}
