//! Lead intake: public booking requests from the pricing calculator and the staff
//! workflow around them (status changes, detailed view, statistics, export).

pub mod domain;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    AccessMethod, AdditionalInfo, Address, Booking, BookingDetails, BookingId, BookingStatus,
    CleanlinessLevel, Customer, Frequency, HearAboutUs, Parking, RoomCounts, ServiceType,
    StructuredBlob, YesNo,
};
pub use query::BookingQuery;
pub use repository::{BookingRepository, MemoryBookingStore};
pub use router::booking_router;
pub use service::{
    BookingService, BookingServiceError, BulkStatusOutcome, BulkStatusRequest, StatusUpdate,
};
pub use validation::BookingSubmission;
pub use views::{BookingDetailView, BookingListView, BookingStatistics, BookingView};
