use async_trait::async_trait;
use domain::{CommentSubmission, Post, PostPath, PostSummary, Slug};

use crate::error::CmsError;

/// Everything the site reads from, or writes to, the content backend.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn post_paths(&self) -> Result<Vec<PostPath>, CmsError>;

    /// `Ok(None)` when no post has this slug.
    async fn post_by_slug(&self, slug: &Slug) -> Result<Option<Post>, CmsError>;

    async fn post_summaries(&self) -> Result<Vec<PostSummary>, CmsError>;

    /// Stores a new, unapproved comment.
    async fn create_comment(&self, submission: &CommentSubmission) -> Result<(), CmsError>;
}
