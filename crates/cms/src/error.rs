use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid image reference: {0}")]
    InvalidImageRef(String),

    #[error("No write token configured, cannot create documents")]
    MissingToken,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
