use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Post, PostId, PostStatus};

/// Full post representation returned by single-post endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    /// Username of the author, when there is one.
    pub author: Option<String>,
    pub author_name: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub meta_description: String,
    pub meta_keywords: String,
    pub category: String,
    pub tags: String,
    pub tags_list: Vec<String>,
    pub status: PostStatus,
    pub published_date: Option<DateTime<Utc>>,
    pub views: u64,
    pub featured: bool,
    pub reading_time: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            author: post.author.as_ref().map(|account| account.username.clone()),
            author_name: post.author_name(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            featured_image: post.featured_image.clone(),
            meta_description: post.meta_description.clone(),
            meta_keywords: post.meta_keywords.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            tags_list: post.tags_list(),
            status: post.status,
            published_date: post.published_date,
            views: post.views,
            featured: post.featured,
            reading_time: post.reading_time(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Trimmed representation for collection endpoints; omits the body and SEO fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostListView {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub author_name: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub category: String,
    pub tags_list: Vec<String>,
    pub status: PostStatus,
    pub published_date: Option<DateTime<Utc>>,
    pub views: u64,
    pub featured: bool,
    pub reading_time: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Post> for PostListView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            author_name: post.author_name(),
            excerpt: post.excerpt.clone(),
            featured_image: post.featured_image.clone(),
            category: post.category.clone(),
            tags_list: post.tags_list(),
            status: post.status,
            published_date: post.published_date,
            views: post.views,
            featured: post.featured,
            reading_time: post.reading_time(),
            created_at: post.created_at,
        }
    }
}
