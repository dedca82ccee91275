use std::cmp::Ordering;

use serde::Deserialize;

use super::domain::{default_order, Post};
use crate::listing::{matches_terms, ordering_keys, search_terms, OrderingKey};
use crate::validation::{parse_flag, Choice};

/// Filters, search and ordering accepted by the post listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    /// `true`/`false`, `1`/`0`, `yes`/`no` in any case. Other values do not filter.
    pub featured: Option<String>,
    /// Username of the author.
    pub author: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostSortKey {
    PublishedDate,
    CreatedAt,
    Views,
    Title,
}

impl PostSortKey {
    fn resolve(name: &str) -> Option<Self> {
        match name {
            "published_date" => Some(Self::PublishedDate),
            "created_at" => Some(Self::CreatedAt),
            "views" => Some(Self::Views),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    fn compare(self, a: &Post, b: &Post) -> Ordering {
        match self {
            Self::PublishedDate => a.published_date.cmp(&b.published_date),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::Views => a.views.cmp(&b.views),
            Self::Title => a.title.cmp(&b.title),
        }
    }
}

impl PostQuery {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(status) = &self.status {
            if post.status.code() != status {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &post.category != category {
                return false;
            }
        }
        if let Some(featured) = self.featured.as_deref().and_then(parse_flag) {
            if post.featured != featured {
                return false;
            }
        }
        if let Some(author) = &self.author {
            let owner = post.author.as_ref().map(|account| account.username.as_str());
            if owner != Some(author.as_str()) {
                return false;
            }
        }

        let terms = search_terms(self.search.as_deref());
        matches_terms(
            &terms,
            &[
                &post.title,
                &post.excerpt,
                &post.content,
                &post.tags,
                &post.category,
            ],
        )
    }

    /// Requested ordering first, default ordering as the tie-breaker.
    pub fn sort(&self, posts: &mut [Post]) {
        let keys = ordering_keys(self.ordering.as_deref(), PostSortKey::resolve);
        posts.sort_by(|a, b| {
            keys.iter()
                .map(|OrderingKey { key, descending }| {
                    let ordering = key.compare(a, b);
                    if *descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| default_order(a, b))
        });
    }

    pub fn apply(&self, posts: Vec<Post>) -> Vec<Post> {
        let mut posts: Vec<Post> = posts.into_iter().filter(|post| self.matches(post)).collect();
        self.sort(&mut posts);
        posts
    }
}
