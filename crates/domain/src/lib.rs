mod error;
mod models;
pub mod portable_text;
mod submission;

pub use error::DomainError;
pub use models::{
    Author, Comment, ImageRef, Post, PostPath, PostSummary, Reference, Slug, SlugField,
};
pub use submission::{CommentSubmission, FormField};
