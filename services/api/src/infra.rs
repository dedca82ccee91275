use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use shine::access::AccountDirectory;
use shine::blog::{blog_router, BlogService, MemoryPostStore};
use shine::leads::{booking_router, BookingService, MemoryBookingStore};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Both verticals over process-local stores sharing one account directory.
pub(crate) struct Services {
    pub(crate) blog: Arc<BlogService<MemoryPostStore>>,
    pub(crate) bookings: Arc<BookingService<MemoryBookingStore>>,
}

impl Services {
    pub(crate) fn in_memory(accounts: Arc<AccountDirectory>) -> Self {
        Self {
            blog: Arc::new(BlogService::new(
                Arc::new(MemoryPostStore::default()),
                Arc::clone(&accounts),
            )),
            bookings: Arc::new(BookingService::new(
                Arc::new(MemoryBookingStore::default()),
                accounts,
            )),
        }
    }

    pub(crate) fn router(&self) -> Router {
        blog_router(Arc::clone(&self.blog)).merge(booking_router(Arc::clone(&self.bookings)))
    }
}
