use async_trait::async_trait;
use cms::ContentSource;
use domain::{Post, Slug};
use maud::Markup;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::GenerateError;
use crate::form::CommentForm;
use crate::views::Site;

/// A generated post page: the data it was built from plus its HTML.
#[derive(Debug)]
pub struct PostPage {
    pub post: Post,
    pub html: String,
    pub etag: String,
}

impl PostPage {
    pub fn new(post: Post, markup: Markup) -> Self {
        let html = markup.into_string();
        let etag = etag_for(&html);
        Self { post, html, etag }
    }
}

pub fn etag_for(html: &str) -> String {
    let digest = Sha256::digest(html.as_bytes());
    format!("\"{}\"", hex::encode(&digest[..16]))
}

#[derive(Debug)]
pub enum Generation {
    Found(Arc<PostPage>),
    NotFound,
}

#[async_trait]
pub trait PageGenerator: Send + Sync {
    /// Slugs to pre-generate, without duplicates.
    async fn static_paths(&self) -> Result<Vec<Slug>, GenerateError>;

    async fn generate(&self, slug: &Slug) -> Result<Generation, GenerateError>;
}

/// Fetches posts from the content source and renders them with the site
/// templates.
pub struct SiteGenerator {
    source: Arc<dyn ContentSource>,
    site: Arc<Site>,
}

impl SiteGenerator {
    pub fn new(source: Arc<dyn ContentSource>, site: Arc<Site>) -> Self {
        Self { source, site }
    }
}

#[async_trait]
impl PageGenerator for SiteGenerator {
    async fn static_paths(&self) -> Result<Vec<Slug>, GenerateError> {
        let rows = self.source.post_paths().await?;
        let mut seen = HashSet::new();
        let mut slugs = Vec::with_capacity(rows.len());

        for row in rows {
            let slug = match row.slug.as_ref().map(|s| s.to_slug()) {
                Some(Ok(slug)) => slug,
                Some(Err(e)) => {
                    warn!("Skipping post {}: {}", row.id, e);
                    continue;
                }
                None => {
                    warn!("Skipping post {}: no slug", row.id);
                    continue;
                }
            };
            if seen.insert(slug.clone()) {
                slugs.push(slug);
            } else {
                warn!("Duplicate slug '{}' (post {}), keeping the first", slug, row.id);
            }
        }

        Ok(slugs)
    }

    async fn generate(&self, slug: &Slug) -> Result<Generation, GenerateError> {
        let Some(post) = self.source.post_by_slug(slug).await? else {
            debug!("No post for slug '{}'", slug);
            return Ok(Generation::NotFound);
        };

        let markup = self.site.post(&post, &CommentForm::new(&post.id));
        Ok(Generation::Found(Arc::new(PostPage::new(post, markup))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms::{Dataset, ImageUrlBuilder, MemorySource};
    use serde_json::json;

    fn generator(data: serde_json::Value) -> SiteGenerator {
        let dataset: Dataset = serde_json::from_value(data).unwrap();
        let site = Site::new("Blog", ImageUrlBuilder::new("proj", "production"));
        SiteGenerator::new(Arc::new(MemorySource::new(dataset)), Arc::new(site))
    }

    fn post(id: &str, slug: serde_json::Value) -> serde_json::Value {
        json!({ "_id": id, "_createdAt": "2024-01-01T00:00:00Z", "title": id, "slug": slug })
    }

    #[tokio::test]
    async fn static_paths_match_cms_slug_set() {
        let g = generator(json!({ "posts": [
            post("p1", json!({ "current": "one" })),
            post("p2", json!({ "current": "two" })),
            post("p3", json!({ "current": "one" })),
            post("p4", json!({ "current": "bad/slug" })),
            post("p5", json!({ "current": null }))
        ]}));

        let slugs: Vec<String> = g
            .static_paths()
            .await
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(slugs, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let g = generator(json!({ "posts": [post("p1", json!({ "current": "one" }))] }));
        let result = g.generate(&Slug::new("nope").unwrap()).await.unwrap();
        assert!(matches!(result, Generation::NotFound));
    }

    #[tokio::test]
    async fn generated_page_only_contains_approved_comments() {
        let g = generator(json!({
            "posts": [post("p1", json!({ "current": "one" }))],
            "comments": [
                { "_id": "c1", "post": { "_ref": "p1" }, "name": "A", "email": "a@x", "comment": "visible", "approved": true },
                { "_id": "c2", "post": { "_ref": "p1" }, "name": "B", "email": "b@x", "comment": "awaiting", "approved": false }
            ]
        }));

        let Generation::Found(page) = g.generate(&Slug::new("one").unwrap()).await.unwrap() else {
            panic!("expected a page");
        };
        assert!(page.html.contains("visible"));
        assert!(!page.html.contains("awaiting"));
        assert_eq!(page.etag, etag_for(&page.html));
    }
}
