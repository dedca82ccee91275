use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::access::{Account, AccountDirectory, Caller};
use crate::clock::ManualClock;
use crate::leads::domain::{Booking, BookingId, BookingStatus};
use crate::leads::repository::{BookingRepository, MemoryBookingStore};
use crate::leads::validation::BookingSubmission;
use crate::leads::{booking_router, BookingService};
use crate::repository::RepositoryError;

pub(super) const STAFF_TOKEN: &str = "office-token";

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap()
}

pub(super) fn accounts() -> Arc<AccountDirectory> {
    Arc::new(AccountDirectory::default().with_account(Account::new("office"), STAFF_TOKEN))
}

pub(super) fn staff() -> Caller {
    Caller::Authenticated(Account::new("office"))
}

pub(super) fn submission() -> BookingSubmission {
    BookingSubmission {
        service_type: Some(json!("deep")),
        frequency: Some(json!("fortnightly")),
        bedrooms: Some(json!(3)),
        bathrooms: Some(json!("2")),
        selected_add_ons: Some(json!("{\"carpet\": true}")),
        add_on_details: Some(json!({ "carpet": { "rooms": 2 } })),
        selected_date: Some(json!("2025-08-20")),
        first_name: Some(json!("Jane")),
        last_name: Some(json!("Citizen")),
        email: Some(json!("Jane@Example.com")),
        phone: Some(json!("0400 111 222")),
        unit_number: Some(json!("4B")),
        street: Some(json!("12 Wattle St")),
        suburb: Some(json!("Fitzroy")),
        postcode: Some(json!("3065")),
        has_pet: Some(json!("yes")),
        cleanliness_level: Some(json!("2")),
        parking: Some(json!("street")),
        price_details: Some(json!({ "base": 120, "total": 150 })),
        ..BookingSubmission::default()
    }
}

pub(super) fn submission_for(service_type: &str, first_name: &str) -> BookingSubmission {
    BookingSubmission {
        service_type: Some(json!(service_type)),
        first_name: Some(json!(first_name)),
        ..submission()
    }
}

pub(super) fn build_service() -> (
    BookingService<MemoryBookingStore>,
    Arc<MemoryBookingStore>,
    Arc<ManualClock>,
) {
    let repository = Arc::new(MemoryBookingStore::default());
    let clock = Arc::new(ManualClock::new(start()));
    let service = BookingService::new(repository.clone(), accounts()).with_clock(clock.clone());
    (service, repository, clock)
}

pub(super) fn router_with_service(service: BookingService<MemoryBookingStore>) -> axum::Router {
    booking_router(Arc::new(service))
}

pub(super) struct UnavailableRepository;

impl BookingRepository for UnavailableRepository {
    fn insert(&self, _booking: Booking) -> Result<Booking, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _booking: Booking) -> Result<Booking, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: BookingId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Booking>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_status(
        &self,
        _ids: &[BookingId],
        _status: BookingStatus,
        _at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}
