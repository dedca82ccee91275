//! Blog catalog: posts with slugs, a publish workflow, view counting and the
//! featured, popular, recent and category views.

pub mod domain;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;
pub mod slug;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{CategoryCount, Post, PostId, PostStatus};
pub use query::PostQuery;
pub use repository::{MemoryPostStore, PostRepository};
pub use router::blog_router;
pub use service::{BlogService, BlogServiceError, BulkOutcome, BulkPostAction, BulkPostRequest};
pub use validation::{PostDraft, PostInput};
pub use views::{PostListView, PostView};
