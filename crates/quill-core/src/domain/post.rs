use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

/// Post entity - a blog post authored by a user.
///
/// The slug is derived from the title at write time and is unique across
/// all posts; the store enforces the uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub status: PostStatus,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `user_id`, deriving the slug from the title.
    pub fn new(user_id: Uuid, title: String, body: String, status: PostStatus) -> Self {
        let now = Utc::now();
        let slug = slugify(&title);
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            body,
            status,
            slug,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the title, regenerating the slug to match.
    pub fn set_title(&mut self, title: String) {
        self.slug = slugify(&title);
        self.title = title;
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Derive a URL-safe slug from a title: lowercase, ASCII alphanumerics
/// kept, separator runs collapsed to a single `-`, everything else
/// stripped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_sep = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_sep = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_joins_words() {
        assert_eq!(slugify("Hello World!"), "hello-world");
    }

    #[test]
    fn slugify_collapses_separator_runs() {
        assert_eq!(slugify("a  -  b__c"), "a-b-c");
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("C'est la vie?"), "cest-la-vie");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_ignores_leading_and_trailing_separators() {
        assert_eq!(slugify("  spaced out  "), "spaced-out");
    }

    #[test]
    fn identical_titles_produce_identical_slugs() {
        let user = Uuid::new_v4();
        let a = Post::new(user, "Hello World!".into(), "x".into(), PostStatus::Draft);
        let b = Post::new(user, "Hello World!".into(), "y".into(), PostStatus::Draft);
        assert_eq!(a.slug, b.slug);
    }

    #[test]
    fn set_title_regenerates_slug() {
        let mut post = Post::new(
            Uuid::new_v4(),
            "First Title".into(),
            "body".into(),
            PostStatus::Published,
        );
        post.set_title("Second Title".into());
        assert_eq!(post.slug, "second-title");
        assert_eq!(post.title, "Second Title");
    }
}
