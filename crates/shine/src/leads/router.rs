use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde_json::json;
use tracing::{error, warn};

use super::domain::{Booking, BookingId};
use super::query::BookingQuery;
use super::repository::BookingRepository;
use super::service::{BookingService, BookingServiceError, BulkStatusRequest, StatusUpdate};
use super::validation::BookingSubmission;
use super::views::{BookingListView, BookingView};
use crate::access::Caller;
use crate::envelope::Envelope;
use crate::error::error_chain;
use crate::repository::RepositoryError;
use crate::validation::Choice;

const CREATE_FAILED: &str = "Failed to create booking";

type SharedService<R> = State<Arc<BookingService<R>>>;
type BookingPath = Result<Path<u64>, PathRejection>;

/// Router builder exposing public lead intake and the staff booking endpoints.
pub fn booking_router<R>(service: Arc<BookingService<R>>) -> Router
where
    R: BookingRepository + 'static,
{
    let accounts = service.accounts();
    Router::new()
        .route(
            "/api/bookings",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/bookings/statistics", get(statistics_handler::<R>))
        .route("/api/bookings/export", get(export_handler::<R>))
        .route("/api/bookings/bulk_status", post(bulk_status_handler::<R>))
        .route(
            "/api/bookings/:id",
            get(retrieve_handler::<R>)
                .put(replace_handler::<R>)
                .patch(patch_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route("/api/bookings/:id/detailed", get(detailed_handler::<R>))
        .route(
            "/api/bookings/:id/update_status",
            patch(update_status_handler::<R>),
        )
        .with_state(service)
        .layer(Extension(accounts))
}

/// Public intake. Every failure becomes a bounded 400 envelope.
pub(crate) async fn create_handler<R>(
    State(service): SharedService<R>,
    payload: Result<Json<BookingSubmission>, JsonRejection>,
) -> Response
where
    R: BookingRepository + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %error_chain(&rejection), "booking payload rejected");
            return Envelope::failure(CREATE_FAILED, rejection.body_text())
                .with_status(StatusCode::BAD_REQUEST);
        }
    };

    match service.submit(submission) {
        Ok(booking) => Envelope::ok(
            "Booking request received successfully!",
            BookingView::from(&booking),
        )
        .with_status(StatusCode::CREATED),
        Err(BookingServiceError::Invalid(errors)) => {
            warn!(errors = %errors.summary(), "booking failed validation");
            Envelope::invalid(CREATE_FAILED, &errors).with_status(StatusCode::BAD_REQUEST)
        }
        Err(other) => {
            error!(error = %error_chain(&other), "booking creation failed");
            Envelope::failure(CREATE_FAILED, other.to_string())
                .with_status(StatusCode::BAD_REQUEST)
        }
    }
}

pub(crate) async fn list_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    Query(query): Query<BookingQuery>,
) -> Response
where
    R: BookingRepository + 'static,
{
    match service.list(&caller, &query) {
        Ok(bookings) => {
            let views: Vec<BookingListView> = bookings.iter().map(BookingListView::from).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn retrieve_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    id: BookingPath,
) -> Response
where
    R: BookingRepository + 'static,
{
    let Ok(Path(id)) = id else {
        return not_found();
    };
    match service.get(&caller, BookingId(id)) {
        Ok(booking) => booking_response(&booking),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn replace_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    id: BookingPath,
    payload: Result<Json<BookingSubmission>, JsonRejection>,
) -> Response
where
    R: BookingRepository + 'static,
{
    let Ok(Path(id)) = id else {
        return not_found();
    };
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match service.replace(&caller, BookingId(id), submission) {
        Ok(booking) => booking_response(&booking),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn patch_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    id: BookingPath,
    payload: Result<Json<BookingSubmission>, JsonRejection>,
) -> Response
where
    R: BookingRepository + 'static,
{
    let Ok(Path(id)) = id else {
        return not_found();
    };
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match service.patch(&caller, BookingId(id), submission) {
        Ok(booking) => booking_response(&booking),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    id: BookingPath,
) -> Response
where
    R: BookingRepository + 'static,
{
    let Ok(Path(id)) = id else {
        return not_found();
    };
    match service.delete(&caller, BookingId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_status_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    id: BookingPath,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Response
where
    R: BookingRepository + 'static,
{
    let Ok(Path(id)) = id else {
        return not_found();
    };
    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match service.update_status(&caller, BookingId(id), update.status.as_deref()) {
        Ok(booking) => Envelope::ok(
            format!("Booking status updated to {}", booking.status.code()),
            BookingView::from(&booking),
        )
        .with_status(StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detailed_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    id: BookingPath,
) -> Response
where
    R: BookingRepository + 'static,
{
    let Ok(Path(id)) = id else {
        return not_found();
    };
    match service.detailed(&caller, BookingId(id)) {
        Ok(view) => Envelope::data(view).with_status(StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn statistics_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
) -> Response
where
    R: BookingRepository + 'static,
{
    match service.statistics(&caller) {
        Ok(statistics) => (StatusCode::OK, Json(statistics)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    Query(query): Query<BookingQuery>,
) -> Response
where
    R: BookingRepository + 'static,
{
    match service.export_csv(&caller, &query) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"bookings.csv\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn bulk_status_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    payload: Result<Json<BulkStatusRequest>, JsonRejection>,
) -> Response
where
    R: BookingRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match service.bulk_status(&caller, &request.status, &request.ids) {
        Ok(outcome) => Envelope::ok(outcome.message, json!({ "affected": outcome.affected }))
            .with_status(StatusCode::OK),
        Err(error) => error_response(error),
    }
}

fn booking_response(booking: &Booking) -> Response {
    (StatusCode::OK, Json(BookingView::from(booking))).into_response()
}

fn not_found() -> Response {
    Envelope::failure("Not found", "booking not found").with_status(StatusCode::NOT_FOUND)
}

fn malformed_body(rejection: JsonRejection) -> Response {
    Envelope::failure("Invalid request body", rejection.body_text())
        .with_status(StatusCode::BAD_REQUEST)
}

fn error_response(error: BookingServiceError) -> Response {
    match error {
        BookingServiceError::Access(error) => error.into_response(),
        BookingServiceError::Invalid(errors) => {
            Envelope::invalid("Invalid booking", &errors).with_status(StatusCode::BAD_REQUEST)
        }
        BookingServiceError::InvalidStatus(requested) => Envelope::failure(
            "Invalid status",
            format!("\"{requested}\" is not a valid choice."),
        )
        .with_status(StatusCode::BAD_REQUEST),
        BookingServiceError::NotFound
        | BookingServiceError::Repository(RepositoryError::NotFound) => not_found(),
        BookingServiceError::Repository(RepositoryError::Conflict) => {
            Envelope::failure("Conflict", "booking already exists")
                .with_status(StatusCode::CONFLICT)
        }
        other => {
            error!(error = %error_chain(&other), "booking request failed");
            Envelope::failure("Internal server error", other.to_string())
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
