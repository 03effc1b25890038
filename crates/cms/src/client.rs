use async_trait::async_trait;
use domain::{CommentSubmission, Post, PostPath, PostSummary, Slug};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::SanityConfig;
use crate::error::CmsError;
use crate::query::{PostBySlugQuery, PostPathsQuery, PostSummariesQuery, Query};
use crate::source::ContentSource;

#[derive(Deserialize)]
struct QueryResponse<T> {
    result: T,
}

#[derive(Clone)]
pub struct SanityClient {
    http: reqwest::Client,
    config: SanityConfig,
}

impl SanityClient {
    pub fn new(config: SanityConfig) -> Result<Self, CmsError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SanityConfig {
        &self.config
    }

    pub async fn fetch<Q: Query>(&self, query: &Q) -> Result<Q::Output, CmsError> {
        let mut params = vec![("query".to_string(), query.groq().to_string())];
        params.extend(
            query
                .params()
                .into_iter()
                .map(|(name, value)| (format!("${}", name), value.to_string())),
        );

        let mut req = self.http.get(self.config.query_url()).query(&params);
        if let Some(token) = &self.config.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(CmsError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let envelope: QueryResponse<Q::Output> = serde_json::from_slice(&bytes)?;
        debug!("Sanity query ok ({} bytes)", bytes.len());
        Ok(envelope.result)
    }

    pub async fn mutate(&self, mutations: Vec<Value>) -> Result<(), CmsError> {
        let token = self.config.token.as_ref().ok_or(CmsError::MissingToken)?;

        let resp = self
            .http
            .post(self.config.mutate_url())
            .bearer_auth(token)
            .json(&json!({ "mutations": mutations }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CmsError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

pub(crate) fn comment_document(submission: &CommentSubmission) -> Value {
    json!({
        "_type": "comment",
        "post": {
            "_type": "reference",
            "_ref": submission.post_id,
        },
        "name": submission.name,
        "email": submission.email,
        "comment": submission.comment,
        "approved": false,
    })
}

#[async_trait]
impl ContentSource for SanityClient {
    async fn post_paths(&self) -> Result<Vec<PostPath>, CmsError> {
        self.fetch(&PostPathsQuery).await
    }

    async fn post_by_slug(&self, slug: &Slug) -> Result<Option<Post>, CmsError> {
        self.fetch(&PostBySlugQuery { slug }).await
    }

    async fn post_summaries(&self) -> Result<Vec<PostSummary>, CmsError> {
        self.fetch(&PostSummariesQuery).await
    }

    async fn create_comment(&self, submission: &CommentSubmission) -> Result<(), CmsError> {
        self.mutate(vec![json!({ "create": comment_document(submission) })])
            .await?;
        info!("Comment stored for post {}", submission.post_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_document_is_unapproved_reference() {
        let doc = comment_document(&CommentSubmission {
            post_id: "post-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            comment: "Hello".into(),
        });
        assert_eq!(doc["_type"], "comment");
        assert_eq!(doc["post"]["_ref"], "post-1");
        assert_eq!(doc["post"]["_type"], "reference");
        assert_eq!(doc["approved"], false);
    }

    #[tokio::test]
    async fn create_comment_requires_token() {
        let client = SanityClient::new(SanityConfig::new("abc123", "production")).unwrap();
        let err = client
            .create_comment(&CommentSubmission::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CmsError::MissingToken));
    }

    #[test]
    fn query_response_unwraps_result() {
        let raw = br#"{"ms": 3, "query": "*", "result": [{"_id": "a", "slug": {"current": "x"}}]}"#;
        let resp: QueryResponse<Vec<PostPath>> = serde_json::from_slice(raw).unwrap();
        assert_eq!(resp.result.len(), 1);
        assert_eq!(resp.result[0].id, "a");
    }
}
