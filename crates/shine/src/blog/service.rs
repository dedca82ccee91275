use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use super::domain::{default_order, newest_first, CategoryCount, Post, PostId, PostStatus};
use super::query::PostQuery;
use super::repository::PostRepository;
use super::slug::{slugify, unique_slug};
use super::validation::{PostDraft, PostInput};
use crate::access::{AccessError, AccountDirectory, Caller};
use crate::clock::{Clock, IdSequence, SystemClock};
use crate::repository::RepositoryError;
use crate::validation::FieldErrors;

const FEATURED_LIMIT: usize = 5;
const POPULAR_LIMIT: usize = 10;
const RECENT_LIMIT: usize = 10;

/// Admin actions applied to a batch of posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkPostAction {
    Publish,
    Unpublish,
    Feature,
    Unfeature,
}

impl BulkPostAction {
    fn past_tense(self) -> &'static str {
        match self {
            BulkPostAction::Publish => "published",
            BulkPostAction::Unpublish => "unpublished",
            BulkPostAction::Feature => "marked as featured",
            BulkPostAction::Unfeature => "unmarked as featured",
        }
    }
}

/// Body of `POST /api/posts/bulk`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkPostRequest {
    pub action: BulkPostAction,
    pub slugs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub affected: usize,
    pub message: String,
}

/// Post catalog: authoring, the publish workflow and the public read views.
pub struct BlogService<R> {
    repository: Arc<R>,
    accounts: Arc<AccountDirectory>,
    clock: Arc<dyn Clock>,
    ids: Arc<IdSequence>,
}

impl<R> BlogService<R>
where
    R: PostRepository + 'static,
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

    /// Create a post, defaulting the author to the caller and deriving a unique slug.
    pub fn create(&self, caller: &Caller, input: PostInput) -> Result<Post, BlogServiceError> {
        let account = caller.require()?;
        let draft = input.validate_new(&self.accounts)?;

        let slug = unique_slug(&slugify(&draft.title), |candidate| {
            self.repository.slug_exists(candidate)
        })?;
        let now = self.clock.now();

        let mut post = Post {
            id: PostId(self.ids.next_id()),
            slug,
            title: String::new(),
            author: Some(account.clone()),
            excerpt: String::new(),
            content: String::new(),
            featured_image: None,
            meta_description: String::new(),
            meta_keywords: String::new(),
            category: String::new(),
            tags: String::new(),
            status: PostStatus::Draft,
            published_date: None,
            views: 0,
            featured: false,
            created_at: now,
            updated_at: now,
        };
        apply_draft(&mut post, draft, now);

        let stored = self.repository.insert(post)?;
        info!(slug = %stored.slug, status = ?stored.status, "blog post created");
        Ok(stored)
    }

    /// Fetch a visible post; published posts count the read as a view.
    pub fn retrieve(&self, caller: &Caller, slug: &str) -> Result<Post, BlogServiceError> {
        let mut post = self.visible(caller, slug)?;
        if post.is_published() {
            post.views = self.repository.increment_views(slug)?;
        }
        Ok(post)
    }

    pub fn list(&self, caller: &Caller, query: &PostQuery) -> Result<Vec<Post>, BlogServiceError> {
        let posts = self
            .repository
            .all()?
            .into_iter()
            .filter(|post| is_visible_to(caller, post))
            .collect();
        Ok(query.apply(posts))
    }

    /// PUT: title, excerpt and content must be resent.
    pub fn replace(
        &self,
        caller: &Caller,
        slug: &str,
        input: PostInput,
    ) -> Result<Post, BlogServiceError> {
        caller.require()?;
        let mut post = self.existing(slug)?;
        let draft = input.validate_replacement(&post, &self.accounts)?;
        apply_draft(&mut post, draft, self.clock.now());
        self.save(post)
    }

    /// PATCH: omitted fields keep their stored values.
    pub fn patch(
        &self,
        caller: &Caller,
        slug: &str,
        input: PostInput,
    ) -> Result<Post, BlogServiceError> {
        caller.require()?;
        let mut post = self.existing(slug)?;
        let draft = input.validate_patch(&post, &self.accounts)?;
        apply_draft(&mut post, draft, self.clock.now());
        self.save(post)
    }

    pub fn delete(&self, caller: &Caller, slug: &str) -> Result<(), BlogServiceError> {
        caller.require()?;
        self.repository.delete(slug)?;
        info!(slug, "blog post deleted");
        Ok(())
    }

    pub fn publish(&self, caller: &Caller, slug: &str) -> Result<Post, BlogServiceError> {
        self.transition(caller, slug, PostStatus::Published)
    }

    /// Back to draft; the publish timestamp is kept.
    pub fn unpublish(&self, caller: &Caller, slug: &str) -> Result<Post, BlogServiceError> {
        self.transition(caller, slug, PostStatus::Draft)
    }

    pub fn featured(&self, caller: &Caller) -> Result<Vec<Post>, BlogServiceError> {
        let mut posts: Vec<Post> = self
            .published(caller)?
            .into_iter()
            .filter(|post| post.featured)
            .collect();
        posts.sort_by(default_order);
        posts.truncate(FEATURED_LIMIT);
        Ok(posts)
    }

    pub fn popular(&self, caller: &Caller) -> Result<Vec<Post>, BlogServiceError> {
        let mut posts = self.published(caller)?;
        posts.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| default_order(a, b)));
        posts.truncate(POPULAR_LIMIT);
        Ok(posts)
    }

    pub fn recent(&self, caller: &Caller) -> Result<Vec<Post>, BlogServiceError> {
        let mut posts = self.published(caller)?;
        posts.sort_by(|a, b| {
            newest_first(a.published_date, b.published_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        posts.truncate(RECENT_LIMIT);
        Ok(posts)
    }

    /// Published post counts per category, largest first, ties by name.
    pub fn categories(&self, caller: &Caller) -> Result<Vec<CategoryCount>, BlogServiceError> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for post in self.published(caller)? {
            *counts.entry(post.category).or_default() += 1;
        }

        let mut categories: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        Ok(categories)
    }

    /// Apply `action` once to every known slug; unknown slugs are skipped.
    pub fn bulk(
        &self,
        caller: &Caller,
        action: BulkPostAction,
        slugs: &[String],
    ) -> Result<BulkOutcome, BlogServiceError> {
        caller.require()?;
        let now = self.clock.now();
        let mut affected = 0;

        for slug in slugs.iter().collect::<BTreeSet<_>>() {
            let Some(mut post) = self.repository.fetch(slug)? else {
                continue;
            };
            match action {
                BulkPostAction::Publish => {
                    if post.is_published() {
                        continue;
                    }
                    post.set_status(PostStatus::Published, now);
                }
                BulkPostAction::Unpublish => post.status = PostStatus::Draft,
                BulkPostAction::Feature => post.featured = true,
                BulkPostAction::Unfeature => post.featured = false,
            }
            post.updated_at = now;
            self.repository.update(post)?;
            affected += 1;
        }

        info!(?action, affected, "bulk post action applied");
        Ok(BulkOutcome {
            affected,
            message: format!("{affected} blog post(s) {}.", action.past_tense()),
        })
    }

    fn transition(
        &self,
        caller: &Caller,
        slug: &str,
        status: PostStatus,
    ) -> Result<Post, BlogServiceError> {
        caller.require()?;
        let mut post = self.existing(slug)?;
        let now = self.clock.now();
        post.set_status(status, now);
        post.updated_at = now;
        let stored = self.repository.update(post)?;
        info!(slug, status = ?stored.status, published_date = ?stored.published_date, "blog post status changed");
        Ok(stored)
    }

    fn save(&self, post: Post) -> Result<Post, BlogServiceError> {
        let stored = self.repository.update(post)?;
        info!(slug = %stored.slug, status = ?stored.status, "blog post updated");
        Ok(stored)
    }

    fn existing(&self, slug: &str) -> Result<Post, BlogServiceError> {
        self.repository
            .fetch(slug)?
            .ok_or(BlogServiceError::NotFound)
    }

    fn visible(&self, caller: &Caller, slug: &str) -> Result<Post, BlogServiceError> {
        self.repository
            .fetch(slug)?
            .filter(|post| is_visible_to(caller, post))
            .ok_or(BlogServiceError::NotFound)
    }

    fn published(&self, caller: &Caller) -> Result<Vec<Post>, BlogServiceError> {
        Ok(self
            .repository
            .all()?
            .into_iter()
            .filter(|post| post.is_published() && is_visible_to(caller, post))
            .collect())
    }
}

/// Anonymous callers only see published posts.
fn is_visible_to(caller: &Caller, post: &Post) -> bool {
    caller.is_authenticated() || post.is_published()
}

fn apply_draft(post: &mut Post, draft: PostDraft, now: DateTime<Utc>) {
    post.title = draft.title;
    if let Some(author) = draft.author {
        post.author = Some(author);
    }
    post.excerpt = draft.excerpt;
    post.content = draft.content;
    post.featured_image = draft.featured_image;
    post.meta_description = draft.meta_description;
    post.meta_keywords = draft.meta_keywords;
    post.category = draft.category;
    post.tags = draft.tags;
    post.featured = draft.featured;
    post.set_status(draft.status, now);
    post.updated_at = now;
}

/// Error raised by the blog service.
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Invalid(#[from] FieldErrors),
    #[error("blog post not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
