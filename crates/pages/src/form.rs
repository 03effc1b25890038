use async_trait::async_trait;
use cms::ContentSource;
use domain::{CommentSubmission, FormField};
use tracing::warn;

use crate::error::SubmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Submitting,
    Submitted,
}

/// Where a validated submission goes.
#[async_trait]
pub trait CommentTransport: Send + Sync {
    async fn send(&self, submission: &CommentSubmission) -> Result<(), SubmitError>;
}

/// Writes straight to the content backend, for forms handled server-side.
pub struct CmsTransport<'a>(pub &'a dyn ContentSource);

#[async_trait]
impl CommentTransport for CmsTransport<'_> {
    async fn send(&self, submission: &CommentSubmission) -> Result<(), SubmitError> {
        self.0.create_comment(submission).await?;
        Ok(())
    }
}

/// Comment form for one post.
///
/// `Editing -> Submitting -> Submitted`. A failed send goes back to
/// `Editing`, keeps the typed values and shows nothing; the error is only
/// logged. Nothing stops a second submission while one is in flight.
#[derive(Debug, Clone)]
pub struct CommentForm {
    values: CommentSubmission,
    errors: Vec<FormField>,
    state: FormState,
}

impl CommentForm {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            values: CommentSubmission {
                post_id: post_id.into(),
                ..Default::default()
            },
            errors: Vec::new(),
            state: FormState::Editing,
        }
    }

    pub fn from_submission(values: CommentSubmission) -> Self {
        Self {
            values,
            errors: Vec::new(),
            state: FormState::Editing,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.values.name = value,
            FormField::Email => self.values.email = value,
            FormField::Comment => self.values.comment = value,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn values(&self) -> &CommentSubmission {
        &self.values
    }

    pub fn errors(&self) -> &[FormField] {
        &self.errors
    }

    pub fn validate(&mut self) -> bool {
        self.errors = self.values.missing_fields();
        self.errors.is_empty()
    }

    /// Validates and moves to `Submitting`, returning the payload to send.
    pub fn begin_submit(&mut self) -> Option<CommentSubmission> {
        if self.state == FormState::Submitted || !self.validate() {
            return None;
        }
        self.state = FormState::Submitting;
        Some(self.values.clone())
    }

    pub fn finish_submit(&mut self, result: Result<(), SubmitError>) {
        self.state = match result {
            Ok(()) => FormState::Submitted,
            Err(e) => {
                warn!("Comment submission for post {} failed: {}", self.values.post_id, e);
                FormState::Editing
            }
        };
    }

    pub async fn submit<T>(&mut self, transport: &T) -> FormState
    where
        T: CommentTransport + ?Sized,
    {
        if let Some(submission) = self.begin_submit() {
            let result = transport.send(&submission).await;
            self.finish_submit(result);
        }
        self.state
    }
}
