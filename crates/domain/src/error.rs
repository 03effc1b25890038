use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid slug {slug:?}: {reason}")]
    InvalidSlug { slug: String, reason: &'static str },
}
