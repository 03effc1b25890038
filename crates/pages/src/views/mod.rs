mod banner;
mod comments;
mod home;
mod layout;
mod not_found;
mod post;

pub use banner::banner;
pub use comments::{comment_form, comment_list};

use cms::ImageUrlBuilder;
use domain::{Post, PostSummary, Slug};
use maud::Markup;

use crate::form::CommentForm;
use crate::portable_text::Serializers;

/// Everything needed to turn CMS data into full HTML pages.
pub struct Site {
    pub title: String,
    pub images: ImageUrlBuilder,
    pub serializers: Serializers,
}

impl Site {
    pub fn new(title: impl Into<String>, images: ImageUrlBuilder) -> Self {
        Self {
            title: title.into(),
            images,
            serializers: Serializers::site(),
        }
    }

    pub fn comment_action(slug: &Slug) -> String {
        format!("/post/{}/comment", slug)
    }

    pub fn home(&self, posts: &[PostSummary]) -> Markup {
        layout::page(&self.title, None, home::home_body(self, posts))
    }

    /// A post page with the comment form in the given state.
    pub fn post(&self, post: &Post, form: &CommentForm) -> Markup {
        let action = match post.slug.to_slug() {
            Ok(slug) => Self::comment_action(&slug),
            Err(_) => "/api/createComment".to_string(),
        };
        layout::page(
            &self.title,
            Some(post.title.as_str()),
            post::post_body(self, post, form, &action),
        )
    }

    pub fn not_found(&self, requested: &str) -> Markup {
        layout::page(&self.title, Some("Not found"), not_found::not_found(requested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn site() -> Site {
        Site::new("Medium Blog", ImageUrlBuilder::new("proj", "production"))
    }

    fn post() -> Post {
        serde_json::from_value(json!({
            "_id": "p1",
            "_createdAt": "2024-03-01T10:30:00Z",
            "title": "Rust & Sanity",
            "description": "A short intro",
            "slug": { "current": "rust-sanity" },
            "author": { "name": "Ada", "image": { "asset": { "_ref": "image-face-100x100-jpg" } } },
            "mainImage": { "asset": { "_ref": "image-hero-1200x800-png" } },
            "body": [
                { "_type": "block", "style": "h2", "children": [{ "text": "Intro" }] }
            ],
            "comments": [
                { "_id": "c1", "name": "Bob", "email": "b@x", "comment": "Nice one", "approved": true }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn post_page_renders_fetched_fields() {
        let p = post();
        let html = site().post(&p, &CommentForm::new(&p.id)).into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Rust &amp; Sanity | Medium Blog</title>"));
        assert!(html.contains("https://cdn.sanity.io/images/proj/production/hero-1200x800.png"));
        assert!(html.contains("face-100x100.jpg?w=96&amp;h=96"));
        assert!(html.contains("published at 1 March 2024, 10:30 UTC"));
        assert!(html.contains(r#"<h2 class="text-xl font-bold my-5">Intro</h2>"#));
        assert!(html.contains(r#"action="/post/rust-sanity/comment""#));
        assert!(html.contains(r#"name="_id" value="p1""#));
        assert!(html.contains("Nice one"));
    }

    #[test]
    fn home_lists_posts_under_banner() {
        let summaries: Vec<PostSummary> = serde_json::from_value(json!([
            { "_id": "p1", "title": "One", "description": "d", "slug": { "current": "one" }, "authorName": "Ada" },
            { "_id": "p2", "title": "No slug", "slug": null }
        ]))
        .unwrap();
        let html = site().home(&summaries).into_string();

        assert!(html.contains("Better"));
        assert!(html.contains(r#"href="/post/one""#));
        assert!(html.contains(" by Ada"));
        assert!(!html.contains("No slug"));
    }

    #[test]
    fn not_found_escapes_requested_path() {
        let html = site().not_found("/post/<x>").into_string();
        assert!(html.contains("404"));
        assert!(html.contains("&lt;x&gt;"));
    }
}
