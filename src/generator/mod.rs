//! Generative-text service boundary
//!
//! This module owns the single outbound content request of a run: a
//! templated prompt goes out, free-form text comes back. The service is
//! treated as untyped text in, untyped text out; coercing the response
//! into structured data is the [`crate::decode`] module's job.

mod client;
mod prompt;

use thiserror::Error;

pub use client::GeneratorClient;
pub use prompt::build_prompt;

/// Errors from the content request boundary
///
/// All of these are fatal for the run: there is no retry at this layer, the
/// caller decides whether the whole run aborts.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Transport failure or timeout
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the service
    #[error("Generative service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response envelope carried no candidate text
    #[error("Generative service response contained no candidate text")]
    EmptyCandidate,
}

impl UpstreamError {
    /// Whether the failure was a request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}
