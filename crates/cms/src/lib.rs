mod client;
mod config;
mod error;
mod image;
mod memory;
pub mod query;
mod source;

pub use client::SanityClient;
pub use config::{SanityConfig, DEFAULT_API_VERSION, DEFAULT_DATASET};
pub use error::CmsError;
pub use image::ImageUrlBuilder;
pub use memory::{Dataset, MemorySource};
pub use source::ContentSource;
