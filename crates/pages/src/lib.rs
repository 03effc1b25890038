mod error;
pub mod form;
mod generator;
pub mod isr;
pub mod portable_text;
pub mod views;

pub use error::{GenerateError, SubmitError};
pub use form::{CmsTransport, CommentForm, CommentTransport, FormState};
pub use generator::{etag_for, Generation, PageGenerator, PostPage, SiteGenerator};
pub use isr::{CacheStatus, PageCache, Served, DEFAULT_REVALIDATE};
pub use views::Site;
