use cms::CmsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("CMS fetch failed: {0}")]
    Cms(#[from] CmsError),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Endpoint rejected the comment with status {0}")]
    Rejected(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Cms(#[from] CmsError),
}
