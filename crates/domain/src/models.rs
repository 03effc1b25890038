use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::portable_text::Document;

const MAX_SLUG_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(s: impl Into<String>) -> Result<Self, DomainError> {
        let s = s.into();
        let reason = if s.is_empty() {
            Some("slug cannot be empty")
        } else if s.trim() != s {
            Some("slug cannot start or end with whitespace")
        } else if s.contains(|c: char| matches!(c, '/' | '?' | '#')) {
            Some("slug must be a single path segment")
        } else if s.chars().any(char::is_control) {
            Some("slug contains control characters")
        } else if s.len() > MAX_SLUG_LEN {
            Some("slug is too long (max 200 bytes)")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DomainError::InvalidSlug { slug: s, reason }),
            None => Ok(Self(s)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sanity stores slugs as `{ "_type": "slug", "current": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugField {
    #[serde(default)]
    pub current: Option<String>,
}

impl SlugField {
    pub fn to_slug(&self) -> Result<Slug, DomainError> {
        Slug::new(self.current.clone().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<Reference>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub post: Option<Reference>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved: bool,
}

impl Comment {
    pub fn belongs_to(&self, post_id: &str) -> bool {
        self.post.as_ref().is_some_and(|r| r.id == post_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub slug: SlugField,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Document,
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn approved_comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| c.approved)
    }
}

/// Row of the path listing query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPath {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub slug: Option<SlugField>,
}

/// Row of the home page listing query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub slug: Option<SlugField>,
    #[serde(rename = "authorName", default)]
    pub author_name: Option<String>,
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,
}

// GROQ 投影对缺失字段返回 null
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slug_accepts_path_segment() {
        let slug = Slug::new("hello-world").unwrap();
        assert_eq!(slug.as_str(), "hello-world");
        assert_eq!(slug.to_string(), "hello-world");
    }

    #[test]
    fn slug_rejects_invalid_values() {
        for bad in ["", " padded", "a/b", "q?x=1", "frag#x", "tab\tin"] {
            assert!(Slug::new(bad).is_err(), "{bad:?} should be rejected");
        }
        assert!(Slug::new("x".repeat(201)).is_err());
    }

    #[test]
    fn post_tolerates_null_projection_fields() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p1",
            "_createdAt": "2024-03-01T10:00:00Z",
            "title": null,
            "description": null,
            "slug": { "_type": "slug", "current": "first" },
            "author": { "name": "Ada", "image": null },
            "comments": null,
            "mainImage": null,
            "body": null
        }))
        .unwrap();

        assert_eq!(post.title, "");
        assert!(post.comments.is_empty());
        assert!(post.body.is_empty());
        assert_eq!(post.slug.to_slug().unwrap().as_str(), "first");
    }

    #[test]
    fn approved_comments_skips_pending() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p1",
            "_createdAt": "2024-03-01T10:00:00Z",
            "slug": { "current": "first" },
            "comments": [
                { "_id": "c1", "name": "a", "email": "a@x", "comment": "yes", "approved": true },
                { "_id": "c2", "name": "b", "email": "b@x", "comment": "no", "approved": false },
                { "_id": "c3", "name": "c", "email": "c@x", "comment": "unset" }
            ]
        }))
        .unwrap();

        let ids: Vec<_> = post.approved_comments().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1"]);
    }

    #[test]
    fn comment_belongs_to_post_reference() {
        let c: Comment = serde_json::from_value(json!({
            "_id": "c1",
            "post": { "_type": "reference", "_ref": "p1" },
            "name": "a", "email": "a@x", "comment": "hi", "approved": true
        }))
        .unwrap();
        assert!(c.belongs_to("p1"));
        assert!(!c.belongs_to("p2"));
    }

    #[test]
    fn post_with_loose_body_block_still_parses() {
        let post: Post = serde_json::from_value(json!({
            "_id": "p1",
            "_createdAt": "2024-03-01T10:00:00Z",
            "slug": { "current": "first" },
            "body": [
                { "_type": "block", "style": "normal", "children": [{ "text": "ok" }], "markDefs": [] },
                { "_type": "block", "style": "normal", "children": [{ "text": "loose" }], "markDefs": null },
                { "_type": "image", "asset": "not-an-object" }
            ]
        }))
        .unwrap();
        assert_eq!(post.body.len(), 3);
    }
}
