use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde_json::json;
use tracing::error;

use super::domain::Post;
use super::query::PostQuery;
use super::repository::PostRepository;
use super::service::{BlogService, BlogServiceError, BulkPostRequest};
use super::validation::PostInput;
use super::views::{PostListView, PostView};
use crate::access::Caller;
use crate::envelope::Envelope;
use crate::repository::RepositoryError;

type SharedService<R> = State<Arc<BlogService<R>>>;

/// Router builder exposing the post catalog and its admin actions.
pub fn blog_router<R>(service: Arc<BlogService<R>>) -> Router
where
    R: PostRepository + 'static,
{
    let accounts = service.accounts();
    Router::new()
        .route(
            "/api/posts",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/posts/featured", get(featured_handler::<R>))
        .route("/api/posts/popular", get(popular_handler::<R>))
        .route("/api/posts/recent", get(recent_handler::<R>))
        .route("/api/posts/categories", get(categories_handler::<R>))
        .route("/api/posts/bulk", post(bulk_handler::<R>))
        .route(
            "/api/posts/:slug",
            get(retrieve_handler::<R>)
                .put(replace_handler::<R>)
                .patch(patch_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route("/api/posts/:slug/publish", patch(publish_handler::<R>))
        .route("/api/posts/:slug/unpublish", patch(unpublish_handler::<R>))
        .with_state(service)
        .layer(Extension(accounts))
}

pub(crate) async fn list_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    Query(query): Query<PostQuery>,
) -> Response
where
    R: PostRepository + 'static,
{
    match service.list(&caller, &query) {
        Ok(posts) => list_response(&posts),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    payload: Result<Json<PostInput>, JsonRejection>,
) -> Response
where
    R: PostRepository + 'static,
{
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match service.create(&caller, input) {
        Ok(post) => Envelope::ok("Blog post created successfully!", PostView::from(&post))
            .with_status(StatusCode::CREATED),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn retrieve_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    Path(slug): Path<String>,
) -> Response
where
    R: PostRepository + 'static,
{
    match service.retrieve(&caller, &slug) {
        Ok(post) => (StatusCode::OK, Json(PostView::from(&post))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn replace_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    Path(slug): Path<String>,
    payload: Result<Json<PostInput>, JsonRejection>,
) -> Response
where
    R: PostRepository + 'static,
{
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match service.replace(&caller, &slug, input) {
        Ok(post) => (StatusCode::OK, Json(PostView::from(&post))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn patch_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    Path(slug): Path<String>,
    payload: Result<Json<PostInput>, JsonRejection>,
) -> Response
where
    R: PostRepository + 'static,
{
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match service.patch(&caller, &slug, input) {
        Ok(post) => (StatusCode::OK, Json(PostView::from(&post))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    Path(slug): Path<String>,
) -> Response
where
    R: PostRepository + 'static,
{
    match service.delete(&caller, &slug) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn publish_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    Path(slug): Path<String>,
) -> Response
where
    R: PostRepository + 'static,
{
    match service.publish(&caller, &slug) {
        Ok(post) => Envelope::ok("Blog post published successfully!", PostView::from(&post))
            .with_status(StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn unpublish_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    Path(slug): Path<String>,
) -> Response
where
    R: PostRepository + 'static,
{
    match service.unpublish(&caller, &slug) {
        Ok(post) => Envelope::ok("Blog post unpublished successfully!", PostView::from(&post))
            .with_status(StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn featured_handler<R>(State(service): SharedService<R>, caller: Caller) -> Response
where
    R: PostRepository + 'static,
{
    match service.featured(&caller) {
        Ok(posts) => list_response(&posts),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn popular_handler<R>(State(service): SharedService<R>, caller: Caller) -> Response
where
    R: PostRepository + 'static,
{
    match service.popular(&caller) {
        Ok(posts) => list_response(&posts),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recent_handler<R>(State(service): SharedService<R>, caller: Caller) -> Response
where
    R: PostRepository + 'static,
{
    match service.recent(&caller) {
        Ok(posts) => list_response(&posts),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn categories_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
) -> Response
where
    R: PostRepository + 'static,
{
    match service.categories(&caller) {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn bulk_handler<R>(
    State(service): SharedService<R>,
    caller: Caller,
    payload: Result<Json<BulkPostRequest>, JsonRejection>,
) -> Response
where
    R: PostRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match service.bulk(&caller, request.action, &request.slugs) {
        Ok(outcome) => Envelope::ok(outcome.message, json!({ "affected": outcome.affected }))
            .with_status(StatusCode::OK),
        Err(error) => error_response(error),
    }
}

fn list_response(posts: &[Post]) -> Response {
    let views: Vec<PostListView> = posts.iter().map(PostListView::from).collect();
    (StatusCode::OK, Json(views)).into_response()
}

fn malformed_body(rejection: JsonRejection) -> Response {
    Envelope::failure("Invalid request body", rejection.body_text())
        .with_status(StatusCode::BAD_REQUEST)
}

fn error_response(error: BlogServiceError) -> Response {
    match error {
        BlogServiceError::Access(error) => error.into_response(),
        BlogServiceError::Invalid(errors) => {
            Envelope::invalid("Invalid blog post", &errors).with_status(StatusCode::BAD_REQUEST)
        }
        BlogServiceError::NotFound
        | BlogServiceError::Repository(RepositoryError::NotFound) => {
            Envelope::failure("Not found", "blog post not found").with_status(StatusCode::NOT_FOUND)
        }
        BlogServiceError::Repository(RepositoryError::Conflict) => {
            Envelope::failure("Conflict", "a blog post with this slug already exists")
                .with_status(StatusCode::CONFLICT)
        }
        other => {
            error!(error = %other, "blog request failed");
            Envelope::failure("Internal server error", other.to_string())
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
