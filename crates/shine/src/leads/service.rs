use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use serde::Deserialize;
use tracing::info;

use super::domain::{Booking, BookingId, BookingStatus};
use super::query::BookingQuery;
use super::repository::BookingRepository;
use super::validation::BookingSubmission;
use super::views::{BookingDetailView, BookingStatistics};
use crate::access::{AccessError, AccountDirectory, Caller};
use crate::clock::{Clock, IdSequence, SystemClock};
use crate::repository::RepositoryError;
use crate::validation::{Choice, FieldErrors};

const RECENT_WINDOW_DAYS: i64 = 30;

const EXPORT_HEADERS: [&str; 10] = [
    "ID",
    "Full Name",
    "Email",
    "Phone",
    "Service Type",
    "Frequency",
    "Selected Date",
    "Status",
    "Total Price",
    "Created At",
];

/// Body of `PATCH /api/bookings/:id/update_status`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

/// Body of `POST /api/bookings/bulk_status`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkStatusRequest {
    pub status: String,
    pub ids: Vec<BookingId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkStatusOutcome {
    pub affected: usize,
    pub message: String,
}

/// Lead intake and the staff-facing booking workflow.
pub struct BookingService<R> {
    repository: Arc<R>,
    accounts: Arc<AccountDirectory>,
    clock: Arc<dyn Clock>,
    ids: Arc<IdSequence>,
}

impl<R> BookingService<R>
where
    R: BookingRepository + 'static,
{
    pub fn new(repository: Arc<R>, accounts: Arc<AccountDirectory>) -> Self {
        Self {
            repository,
            accounts,
            clock: Arc::new(SystemClock),
            ids: Arc::new(IdSequence::default()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ids(mut self, ids: Arc<IdSequence>) -> Self {
        self.ids = ids;
        self
    }

    pub fn accounts(&self) -> Arc<AccountDirectory> {
        Arc::clone(&self.accounts)
    }

    /// Record a public booking request. New bookings always start pending.
    pub fn submit(&self, submission: BookingSubmission) -> Result<Booking, BookingServiceError> {
        let details = submission.validate()?;
        let now = self.clock.now();
        let booking = Booking {
            id: BookingId(self.ids.next_id()),
            details,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(booking)?;
        info!(
            booking_id = stored.id.0,
            service_type = stored.details.service_type.code(),
            selected_date = %stored.details.selected_date,
            "booking received"
        );
        Ok(stored)
    }

    pub fn list(
        &self,
        caller: &Caller,
        query: &BookingQuery,
    ) -> Result<Vec<Booking>, BookingServiceError> {
        caller.require()?;
        Ok(query.apply(self.repository.all()?))
    }

    pub fn get(&self, caller: &Caller, id: BookingId) -> Result<Booking, BookingServiceError> {
        caller.require()?;
        self.existing(id)
    }

    /// Full update with the create rules; status, id and creation time are kept.
    pub fn replace(
        &self,
        caller: &Caller,
        id: BookingId,
        submission: BookingSubmission,
    ) -> Result<Booking, BookingServiceError> {
        caller.require()?;
        let mut booking = self.existing(id)?;
        booking.details = submission.validate()?;
        booking.updated_at = self.clock.now();

        let stored = self.repository.update(booking)?;
        info!(booking_id = stored.id.0, "booking updated");
        Ok(stored)
    }

    /// Partial update: omitted fields keep their stored values.
    pub fn patch(
        &self,
        caller: &Caller,
        id: BookingId,
        submission: BookingSubmission,
    ) -> Result<Booking, BookingServiceError> {
        caller.require()?;
        let mut booking = self.existing(id)?;
        booking.details = submission.validate_patch(&booking.details)?;
        booking.updated_at = self.clock.now();

        let stored = self.repository.update(booking)?;
        info!(booking_id = stored.id.0, "booking patched");
        Ok(stored)
    }

    pub fn delete(&self, caller: &Caller, id: BookingId) -> Result<(), BookingServiceError> {
        caller.require()?;
        self.repository.delete(id)?;
        info!(booking_id = id.0, "booking deleted");
        Ok(())
    }

    /// Move a booking to the requested status; unknown values leave it untouched.
    pub fn update_status(
        &self,
        caller: &Caller,
        id: BookingId,
        requested: Option<&str>,
    ) -> Result<Booking, BookingServiceError> {
        caller.require()?;
        let mut booking = self.existing(id)?;
        let status = requested
            .and_then(BookingStatus::from_code)
            .ok_or_else(|| {
                BookingServiceError::InvalidStatus(requested.unwrap_or_default().to_string())
            })?;

        let previous = booking.status;
        booking.status = status;
        booking.updated_at = self.clock.now();
        let stored = self.repository.update(booking)?;
        info!(
            booking_id = id.0,
            from = previous.code(),
            to = status.code(),
            "booking status changed"
        );
        Ok(stored)
    }

    pub fn detailed(
        &self,
        caller: &Caller,
        id: BookingId,
    ) -> Result<BookingDetailView, BookingServiceError> {
        caller.require()?;
        let booking = self.existing(id)?;
        Ok(BookingDetailView::from(&booking))
    }

    /// Totals by status and service type plus the trailing 30 day count.
    pub fn statistics(&self, caller: &Caller) -> Result<BookingStatistics, BookingServiceError> {
        caller.require()?;
        let bookings = self.repository.all()?;
        let since = self.clock.now() - Duration::days(RECENT_WINDOW_DAYS);

        let mut status_breakdown = BTreeMap::new();
        let mut service_breakdown = BTreeMap::new();
        let mut recent = 0;
        for booking in &bookings {
            *status_breakdown.entry(booking.status.code()).or_insert(0) += 1;
            *service_breakdown
                .entry(booking.details.service_type.code())
                .or_insert(0) += 1;
            if booking.created_at >= since {
                recent += 1;
            }
        }

        Ok(BookingStatistics {
            total_bookings: bookings.len(),
            status_breakdown,
            service_breakdown,
            recent_bookings_30_days: recent,
        })
    }

    /// Admin list columns as CSV, honoring the list filters.
    pub fn export_csv(
        &self,
        caller: &Caller,
        query: &BookingQuery,
    ) -> Result<Vec<u8>, BookingServiceError> {
        let bookings = self.list(caller, query)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(EXPORT_HEADERS)?;
        for booking in &bookings {
            let details = &booking.details;
            writer.write_record([
                booking.id.0.to_string(),
                booking.full_name(),
                details.customer.email.clone(),
                details.customer.phone.clone(),
                details.service_type.label().to_string(),
                details.frequency.label().to_string(),
                details.selected_date.format("%Y-%m-%d").to_string(),
                booking.status.label().to_string(),
                price_cell(booking),
                booking.created_at.to_rfc3339(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|error| BookingServiceError::Export(error.into_error().into()))?;
        info!(rows = bookings.len(), "bookings exported");
        Ok(bytes)
    }

    /// Admin action: mark a batch as confirmed, completed or cancelled.
    pub fn bulk_status(
        &self,
        caller: &Caller,
        requested: &str,
        ids: &[BookingId],
    ) -> Result<BulkStatusOutcome, BookingServiceError> {
        caller.require()?;
        let status = BookingStatus::from_code(requested)
            .filter(|status| *status != BookingStatus::Pending)
            .ok_or_else(|| BookingServiceError::InvalidStatus(requested.to_string()))?;

        let affected = self.repository.set_status(ids, status, self.clock.now())?;
        info!(status = status.code(), affected, "bulk booking status applied");
        Ok(BulkStatusOutcome {
            affected,
            message: format!("{affected} booking(s) marked as {}.", status.code()),
        })
    }

    fn existing(&self, id: BookingId) -> Result<Booking, BookingServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(BookingServiceError::NotFound)
    }
}

fn price_cell(booking: &Booking) -> String {
    match booking.total_price() {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Error raised by the booking service.
#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Invalid(#[from] FieldErrors),
    #[error("\"{0}\" is not a valid booking status")]
    InvalidStatus(String),
    #[error("booking not found")]
    NotFound,
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
