use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::access::{Account, AccountDirectory, Caller};
use crate::blog::domain::Post;
use crate::blog::repository::{MemoryPostStore, PostRepository};
use crate::blog::validation::PostInput;
use crate::blog::{blog_router, BlogService};
use crate::clock::ManualClock;
use crate::repository::RepositoryError;

pub(super) const EDITOR_TOKEN: &str = "editor-token";

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()
}

pub(super) fn editor() -> Account {
    let mut account = Account::new("editor");
    account.first_name = "Ella".to_string();
    account.last_name = "Reyes".to_string();
    account
}

pub(super) fn accounts() -> Arc<AccountDirectory> {
    Arc::new(
        AccountDirectory::default()
            .with_account(editor(), EDITOR_TOKEN)
            .with_account(Account::new("writer"), "writer-token"),
    )
}

pub(super) fn staff() -> Caller {
    Caller::Authenticated(editor())
}

pub(super) fn input(title: &str) -> PostInput {
    PostInput {
        title: Some(title.to_string()),
        excerpt: Some(format!("{title} in brief")),
        content: Some("Open the windows and start from the top shelf down.".to_string()),
        category: Some("Cleaning Tips".to_string()),
        tags: Some("eco, kitchen".to_string()),
        ..PostInput::default()
    }
}

pub(super) fn published_input(title: &str) -> PostInput {
    PostInput {
        status: Some("published".to_string()),
        ..input(title)
    }
}

pub(super) fn build_service() -> (
    BlogService<MemoryPostStore>,
    Arc<MemoryPostStore>,
    Arc<ManualClock>,
) {
    let repository = Arc::new(MemoryPostStore::default());
    let clock = Arc::new(ManualClock::new(start()));
    let service = BlogService::new(repository.clone(), accounts()).with_clock(clock.clone());
    (service, repository, clock)
}

pub(super) fn router_with_service(service: BlogService<MemoryPostStore>) -> axum::Router {
    blog_router(Arc::new(service))
}

pub(super) struct ConflictRepository;

impl PostRepository for ConflictRepository {
    fn insert(&self, _post: Post) -> Result<Post, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _post: Post) -> Result<Post, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _slug: &str) -> Result<Option<Post>, RepositoryError> {
        Ok(None)
    }

    fn slug_exists(&self, _slug: &str) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn increment_views(&self, _slug: &str) -> Result<u64, RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    fn delete(&self, _slug: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<Post>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl PostRepository for UnavailableRepository {
    fn insert(&self, _post: Post) -> Result<Post, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _post: Post) -> Result<Post, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _slug: &str) -> Result<Option<Post>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn slug_exists(&self, _slug: &str) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn increment_views(&self, _slug: &str) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _slug: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Post>, RepositoryError> {
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
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
