//! Typed GROQ queries.
//!
//! Each query owns its GROQ text, its parameters and the shape of its
//! result, so a projection change and the struct it feeds move together.

use domain::{Post, PostPath, PostSummary, Slug};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub trait Query {
    type Output: DeserializeOwned;

    fn groq(&self) -> &'static str;

    /// `(name, value)` pairs, sent as `$name=<json>`.
    fn params(&self) -> Vec<(&'static str, Value)> {
        Vec::new()
    }
}

/// Every post's id and slug.
pub struct PostPathsQuery;

impl Query for PostPathsQuery {
    type Output = Vec<PostPath>;

    fn groq(&self) -> &'static str {
        r#"*[_type == "post"]{
  _id,
  slug{
    current
  }
}"#
    }
}

/// One post by slug, with its author and approved comments.
pub struct PostBySlugQuery<'a> {
    pub slug: &'a Slug,
}

impl Query for PostBySlugQuery<'_> {
    type Output = Option<Post>;

    fn groq(&self) -> &'static str {
        r#"*[_type == "post" && slug.current == $slug][0]{
  _id,
  _createdAt,
  title,
  author->{
    name,
    image
  },
  'comments': *[
    _type == "comment" && post._ref == ^._id && approved == true
  ]{
    _id,
    _createdAt,
    post,
    name,
    email,
    comment,
    approved
  },
  description,
  mainImage,
  slug,
  body
}"#
    }

    fn params(&self) -> Vec<(&'static str, Value)> {
        vec![("slug", Value::from(self.slug.as_str()))]
    }
}

/// Home page listing, newest first.
pub struct PostSummariesQuery;

impl Query for PostSummariesQuery {
    type Output = Vec<PostSummary>;

    fn groq(&self) -> &'static str {
        r#"*[_type == "post"] | order(_createdAt desc){
  _id,
  title,
  description,
  slug{
    current
  },
  "authorName": author->name,
  mainImage
}"#
    }
}
