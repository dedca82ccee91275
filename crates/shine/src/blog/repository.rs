use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::Post;
use crate::repository::RepositoryError;

/// Storage abstraction so the blog service can be exercised in isolation.
pub trait PostRepository: Send + Sync {
    /// Rejects a post whose slug is already stored with [`RepositoryError::Conflict`].
    fn insert(&self, post: Post) -> Result<Post, RepositoryError>;
    fn update(&self, post: Post) -> Result<Post, RepositoryError>;
    fn fetch(&self, slug: &str) -> Result<Option<Post>, RepositoryError>;
    fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError>;
    /// Atomically bump the view counter and return the new value.
    fn increment_views(&self, slug: &str) -> Result<u64, RepositoryError>;
    fn delete(&self, slug: &str) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<Post>, RepositoryError>;
}

/// Mutex-guarded in-process store keyed by slug.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: Mutex<BTreeMap<String, Post>>,
}

impl MemoryPostStore {
    fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<String, Post>>, RepositoryError> {
        self.posts
            .lock()
            .map_err(|_| RepositoryError::Unavailable("post store mutex poisoned".to_string()))
    }
}

impl PostRepository for MemoryPostStore {
    fn insert(&self, post: Post) -> Result<Post, RepositoryError> {
        let mut rows = self.rows()?;
        if rows.contains_key(&post.slug) || rows.values().any(|row| row.id == post.id) {
            return Err(RepositoryError::Conflict);
        }
        rows.insert(post.slug.clone(), post.clone());
        Ok(post)
    }

    fn update(&self, post: Post) -> Result<Post, RepositoryError> {
        let mut rows = self.rows()?;
        match rows.get_mut(&post.slug) {
            Some(row) => {
                *row = post.clone();
                Ok(post)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, slug: &str) -> Result<Option<Post>, RepositoryError> {
        Ok(self.rows()?.get(slug).cloned())
    }

    fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        Ok(self.rows()?.contains_key(slug))
    }

    fn increment_views(&self, slug: &str) -> Result<u64, RepositoryError> {
        let mut rows = self.rows()?;
        let row = rows.get_mut(slug).ok_or(RepositoryError::NotFound)?;
        row.views += 1;
        Ok(row.views)
    }

    fn delete(&self, slug: &str) -> Result<(), RepositoryError> {
        self.rows()?
            .remove(slug)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<Post>, RepositoryError> {
        Ok(self.rows()?.values().cloned().collect())
    }
}
