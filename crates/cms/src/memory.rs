use async_trait::async_trait;
use chrono::Utc;
use domain::{Comment, CommentSubmission, Post, PostPath, PostSummary, Reference, Slug};
use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::error::CmsError;
use crate::source::ContentSource;

/// Posts and comments as two flat document lists, the way the CMS keeps them.
#[derive(Debug, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// In-process content source, used for local runs and as a stand-in for the
/// CMS in tests. Applies the same joins and filters as the GROQ queries.
#[derive(Clone, Default)]
pub struct MemorySource {
    data: Arc<RwLock<Dataset>>,
}

impl MemorySource {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            data: Arc::new(RwLock::new(dataset)),
        }
    }

    pub async fn from_fixture(path: impl AsRef<Path>) -> Result<Self, CmsError> {
        let raw = tokio::fs::read(path.as_ref()).await?;
        let dataset: Dataset = serde_json::from_slice(&raw)?;
        info!(
            "Loaded fixture {} ({} posts, {} comments)",
            path.as_ref().display(),
            dataset.posts.len(),
            dataset.comments.len()
        );
        Ok(Self::new(dataset))
    }

    pub fn insert_post(&self, post: Post) {
        let mut data = self.data.write().expect("dataset lock poisoned");
        data.posts.retain(|p| p.id != post.id);
        data.posts.push(post);
    }

    pub fn remove_post(&self, post_id: &str) -> bool {
        let mut data = self.data.write().expect("dataset lock poisoned");
        let before = data.posts.len();
        data.posts.retain(|p| p.id != post_id);
        data.posts.len() != before
    }

    pub fn insert_comment(&self, comment: Comment) {
        let mut data = self.data.write().expect("dataset lock poisoned");
        data.comments.push(comment);
    }

    /// Stands in for the moderation step.
    pub fn approve_comment(&self, comment_id: &str) -> bool {
        let mut data = self.data.write().expect("dataset lock poisoned");
        match data.comments.iter_mut().find(|c| c.id == comment_id) {
            Some(c) => {
                c.approved = true;
                true
            }
            None => false,
        }
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.data
            .read()
            .expect("dataset lock poisoned")
            .comments
            .clone()
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn post_paths(&self) -> Result<Vec<PostPath>, CmsError> {
        let data = self.data.read().expect("dataset lock poisoned");
        Ok(data
            .posts
            .iter()
            .map(|p| PostPath {
                id: p.id.clone(),
                slug: Some(p.slug.clone()),
            })
            .collect())
    }

    async fn post_by_slug(&self, slug: &Slug) -> Result<Option<Post>, CmsError> {
        let data = self.data.read().expect("dataset lock poisoned");
        let Some(post) = data
            .posts
            .iter()
            .find(|p| p.slug.current.as_deref() == Some(slug.as_str()))
        else {
            return Ok(None);
        };

        let mut post = post.clone();
        post.comments = data
            .comments
            .iter()
            .filter(|c| c.approved && c.belongs_to(&post.id))
            .cloned()
            .collect();
        Ok(Some(post))
    }

    async fn post_summaries(&self) -> Result<Vec<PostSummary>, CmsError> {
        let data = self.data.read().expect("dataset lock poisoned");
        let mut posts: Vec<&Post> = data.posts.iter().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(posts
            .into_iter()
            .map(|p| PostSummary {
                id: p.id.clone(),
                title: p.title.clone(),
                description: p.description.clone(),
                slug: Some(p.slug.clone()),
                author_name: p.author.as_ref().map(|a| a.name.clone()),
                main_image: p.main_image.clone(),
            })
            .collect())
    }

    async fn create_comment(&self, submission: &CommentSubmission) -> Result<(), CmsError> {
        let mut data = self.data.write().expect("dataset lock poisoned");
        let id = format!("comment-{}", data.comments.len() + 1);
        data.comments.push(Comment {
            id,
            created_at: Some(Utc::now()),
            post: Some(Reference {
                id: submission.post_id.clone(),
            }),
            name: submission.name.clone(),
            email: submission.email.clone(),
            comment: submission.comment.clone(),
            approved: false,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset() -> Dataset {
        serde_json::from_value(json!({
            "posts": [
                {
                    "_id": "p1",
                    "_createdAt": "2024-01-01T00:00:00Z",
                    "title": "First",
                    "slug": { "current": "first" },
                    "author": { "name": "Ada" }
                },
                {
                    "_id": "p2",
                    "_createdAt": "2024-02-01T00:00:00Z",
                    "title": "Second",
                    "slug": { "current": "second" }
                }
            ],
            "comments": [
                { "_id": "c1", "post": { "_ref": "p1" }, "name": "a", "email": "a@x", "comment": "ok", "approved": true },
                { "_id": "c2", "post": { "_ref": "p1" }, "name": "b", "email": "b@x", "comment": "pending", "approved": false },
                { "_id": "c3", "post": { "_ref": "p2" }, "name": "c", "email": "c@x", "comment": "other post", "approved": true }
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn detail_joins_only_approved_comments_of_post() {
        let source = MemorySource::new(dataset());
        let post = source
            .post_by_slug(&Slug::new("first").unwrap())
            .await
            .unwrap()
            .unwrap();
        let ids: Vec<_> = post.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1"]);
    }

    #[tokio::test]
    async fn detail_of_unknown_slug_is_none() {
        let source = MemorySource::new(dataset());
        let post = source
            .post_by_slug(&Slug::new("missing").unwrap())
            .await
            .unwrap();
        assert!(post.is_none());
    }

    #[tokio::test]
    async fn summaries_are_newest_first() {
        let source = MemorySource::new(dataset());
        let titles: Vec<_> = source
            .post_summaries()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn created_comment_stays_hidden_until_approved() {
        let source = MemorySource::new(dataset());
        let slug = Slug::new("second").unwrap();
        source
            .create_comment(&CommentSubmission {
                post_id: "p2".into(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                comment: "new".into(),
            })
            .await
            .unwrap();

        let post = source.post_by_slug(&slug).await.unwrap().unwrap();
        assert_eq!(post.comments.len(), 1);

        let new_id = source.comments().last().unwrap().id.clone();
        assert!(source.approve_comment(&new_id));

        let post = source.post_by_slug(&slug).await.unwrap().unwrap();
        assert_eq!(post.comments.len(), 2);
        assert_eq!(post.comments[1].comment, "new");
    }

    #[tokio::test]
    async fn bundled_fixture_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/blog.json");
        let source = MemorySource::from_fixture(path).await.unwrap();

        let paths = source.post_paths().await.unwrap();
        assert_eq!(paths.len(), 2);

        let post = source
            .post_by_slug(&Slug::new("hello-medium").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.comments.len(), 1);
        assert_eq!(post.comments[0].name, "Ada");
    }
}
