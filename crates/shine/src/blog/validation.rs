use serde::{Deserialize, Serialize};

use super::domain::{Post, PostStatus};
use crate::access::{Account, AccountDirectory};
use crate::validation::{optional_choice, optional_text, required_text, Choice, FieldErrors};

const TITLE_MAX: usize = 200;
const EXCERPT_MAX: usize = 300;
const IMAGE_MAX: usize = 100;
const META_DESCRIPTION_MAX: usize = 160;
const META_KEYWORDS_MAX: usize = 200;
const CATEGORY_MAX: usize = 100;
const TAGS_MAX: usize = 200;

/// Writable post fields as submitted by a client. Every member is optional so the
/// same payload serves create, full update and partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostInput {
    pub title: Option<String>,
    /// Username of the owning account.
    pub author: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
}

/// Validated writable fields, ready to be applied to a [`Post`].
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    /// Only set when the payload named an author explicitly.
    pub author: Option<Account>,
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub meta_description: String,
    pub meta_keywords: String,
    pub category: String,
    pub tags: String,
    pub status: PostStatus,
    pub featured: bool,
}

impl PostInput {
    /// Validate a payload for a brand new post.
    pub fn validate_new(self, accounts: &AccountDirectory) -> Result<PostDraft, FieldErrors> {
        self.check(accounts)
    }

    /// Full replacement: title, excerpt and content must be resent, the rest keep
    /// their stored values when omitted.
    pub fn validate_replacement(
        self,
        current: &Post,
        accounts: &AccountDirectory,
    ) -> Result<PostDraft, FieldErrors> {
        self.fill_optional_from(current).check(accounts)
    }

    /// Partial update: anything omitted keeps its stored value.
    pub fn validate_patch(
        self,
        current: &Post,
        accounts: &AccountDirectory,
    ) -> Result<PostDraft, FieldErrors> {
        let mut input = self.fill_optional_from(current);
        input.title = input.title.or_else(|| Some(current.title.clone()));
        input.excerpt = input.excerpt.or_else(|| Some(current.excerpt.clone()));
        input.content = input.content.or_else(|| Some(current.content.clone()));
        input.check(accounts)
    }

    fn fill_optional_from(mut self, current: &Post) -> Self {
        self.featured_image = self.featured_image.or_else(|| current.featured_image.clone());
        self.meta_description = self
            .meta_description
            .or_else(|| Some(current.meta_description.clone()));
        self.meta_keywords = self
            .meta_keywords
            .or_else(|| Some(current.meta_keywords.clone()));
        self.category = self.category.or_else(|| Some(current.category.clone()));
        self.tags = self.tags.or_else(|| Some(current.tags.clone()));
        self.status = self
            .status
            .or_else(|| Some(current.status.code().to_string()));
        self.featured = self.featured.or(Some(current.featured));
        self
    }

    fn check(self, accounts: &AccountDirectory) -> Result<PostDraft, FieldErrors> {
        let mut errors = FieldErrors::default();

        let title = required_text(&mut errors, "title", self.title, TITLE_MAX);

        let excerpt = required_text(&mut errors, "excerpt", self.excerpt, usize::MAX);
        if excerpt.chars().count() > EXCERPT_MAX {
            errors.add("excerpt", "Excerpt must be 300 characters or less.");
        }

        let content = required_text(&mut errors, "content", self.content, usize::MAX);

        let featured_image =
            optional_text(&mut errors, "featured_image", self.featured_image, Some(IMAGE_MAX));
        let featured_image = (!featured_image.is_empty()).then_some(featured_image);

        let meta_description = optional_text(
            &mut errors,
            "meta_description",
            self.meta_description,
            Some(META_DESCRIPTION_MAX),
        );
        let meta_keywords = optional_text(
            &mut errors,
            "meta_keywords",
            self.meta_keywords,
            Some(META_KEYWORDS_MAX),
        );
        let category = optional_text(&mut errors, "category", self.category, Some(CATEGORY_MAX));
        let tags = optional_text(&mut errors, "tags", self.tags, Some(TAGS_MAX));

        let status = optional_choice(&mut errors, "status", self.status).unwrap_or(PostStatus::Draft);

        let author = match self.author.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(username) => {
                let found = accounts.find(username).cloned();
                if found.is_none() {
                    errors.add(
                        "author",
                        format!("Invalid username \"{username}\" - object does not exist."),
                    );
                }
                found
            }
        };

        errors.finish(PostDraft {
            title,
            author,
            excerpt,
            content,
            featured_image,
            meta_description,
            meta_keywords,
            category,
            tags,
            status,
            featured: self.featured.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::domain::PostId;
    use chrono::{TimeZone, Utc};

    fn accounts() -> AccountDirectory {
        AccountDirectory::default().with_account(Account::new("editor"), "editor-token")
    }

    fn input() -> PostInput {
        PostInput {
            title: Some("  Green cleaning basics ".to_string()),
            excerpt: Some("Why vinegar works".to_string()),
            content: Some("Vinegar cuts grease.".to_string()),
            ..PostInput::default()
        }
    }

    fn stored() -> Post {
        let at = Utc.with_ymd_and_hms(2025, 4, 2, 10, 0, 0).unwrap();
        Post {
            id: PostId(7),
            slug: "stored".to_string(),
            title: "Stored".to_string(),
            author: None,
            excerpt: "Stored excerpt".to_string(),
            content: "Stored body".to_string(),
            featured_image: Some("blog/images/stored.jpg".to_string()),
            meta_description: "meta".to_string(),
            meta_keywords: String::new(),
            category: "Home Care".to_string(),
            tags: "home".to_string(),
            status: PostStatus::Published,
            published_date: Some(at),
            views: 3,
            featured: true,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn trims_title_and_defaults_optional_fields() {
        let draft = input().validate_new(&accounts()).expect("valid input");
        assert_eq!(draft.title, "Green cleaning basics");
        assert_eq!(draft.status, PostStatus::Draft);
        assert!(!draft.featured);
        assert!(draft.author.is_none());
        assert!(draft.featured_image.is_none());
    }

    #[test]
    fn rejects_blank_title_and_long_excerpt() {
        let mut input = input();
        input.title = Some("   ".to_string());
        input.excerpt = Some("x".repeat(301));

        let errors = input.validate_new(&accounts()).expect_err("invalid input");
        assert!(errors.contains("title"));
        assert_eq!(
            errors.messages("excerpt"),
            ["Excerpt must be 300 characters or less.".to_string()]
        );
    }

    #[test]
    fn accepts_an_excerpt_of_exactly_300_characters() {
        let mut input = input();
        input.excerpt = Some("é".repeat(300));
        assert!(input.validate_new(&accounts()).is_ok());
    }

    #[test]
    fn rejects_unknown_status_and_author() {
        let mut input = input();
        input.status = Some("live".to_string());
        input.author = Some("ghost".to_string());

        let errors = input.validate_new(&accounts()).expect_err("invalid input");
        assert_eq!(
            errors.messages("status"),
            ["\"live\" is not a valid choice.".to_string()]
        );
        assert!(errors.contains("author"));
    }

    #[test]
    fn resolves_named_authors() {
        let mut input = input();
        input.author = Some("editor".to_string());
        let draft = input.validate_new(&accounts()).expect("valid input");
        assert_eq!(draft.author.map(|a| a.username), Some("editor".to_string()));
    }

    #[test]
    fn patch_keeps_stored_values() {
        let patch = PostInput {
            category: Some("Eco-Friendly".to_string()),
            ..PostInput::default()
        };
        let draft = patch
            .validate_patch(&stored(), &accounts())
            .expect("valid patch");
        assert_eq!(draft.title, "Stored");
        assert_eq!(draft.category, "Eco-Friendly");
        assert_eq!(draft.status, PostStatus::Published);
        assert!(draft.featured);
        assert_eq!(
            draft.featured_image.as_deref(),
            Some("blog/images/stored.jpg")
        );
    }

    #[test]
    fn replacement_requires_core_fields() {
        let replacement = PostInput {
            title: Some("New title".to_string()),
            ..PostInput::default()
        };
        let errors = replacement
            .validate_replacement(&stored(), &accounts())
            .expect_err("excerpt and content missing");
        assert!(errors.contains("excerpt"));
        assert!(errors.contains("content"));
        assert!(!errors.contains("category"));
    }
}
