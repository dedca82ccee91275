use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::Account;
use crate::validation::Choice;

const WORDS_PER_MINUTE: usize = 200;

/// Auto-assigned post identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

/// Publishing lifecycle of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl Choice for PostStatus {
    const ALL: &'static [Self] = &[
        PostStatus::Draft,
        PostStatus::Published,
        PostStatus::Archived,
    ];

    fn code(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Published => "Published",
            PostStatus::Archived => "Archived",
        }
    }
}

/// A blog article as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    /// Unique and never regenerated after creation.
    pub slug: String,
    pub title: String,
    pub author: Option<Account>,
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub meta_description: String,
    pub meta_keywords: String,
    pub category: String,
    /// Comma separated.
    pub tags: String,
    pub status: PostStatus,
    pub published_date: Option<DateTime<Utc>>,
    pub views: u64,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Move to `status`, stamping the publish time the first time the post goes live.
    pub fn set_status(&mut self, status: PostStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == PostStatus::Published && self.published_date.is_none() {
            self.published_date = Some(now);
        }
    }

    /// Estimated minutes to read the body, never less than one.
    pub fn reading_time(&self) -> usize {
        let words = self.content.split_whitespace().count();
        (words / WORDS_PER_MINUTE).max(1)
    }

    pub fn tags_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn author_name(&self) -> String {
        self.author
            .as_ref()
            .map(Account::display_name)
            .unwrap_or_else(|| "Anonymous".to_string())
    }
}

/// Newest publish date first, unpublished posts last, then newest creation.
pub(crate) fn default_order(a: &Post, b: &Post) -> Ordering {
    newest_first(a.published_date, b.published_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub(crate) fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Group size for one category among visible published posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}
