//! REST data-API client module.
//!
//! Fetches chart history, transaction pages, and token lists: the snapshot
//! data a page loads before the stream takes over.

pub mod client;
pub mod error;
pub mod types;

pub use client::{NiceapeApiClient, NiceapeApiClientBuilder, RetryConfig};
pub use error::{ApiError, ApiResult};
pub use types::*;
