// src/linkedin/mod.rs
pub mod client;
pub mod types;

pub use client::{authorization_url, LinkedInClient};
pub use types::{AccessToken, AuthorizationRequest, PublishedPost, TokenRequest};

use thiserror::Error;

/// Failure talking to LinkedIn, split by how the relay must report it.
#[derive(Debug, Error)]
pub enum LinkedInError {
    /// LinkedIn answered with a non-success status.
    #[error("LinkedIn returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("LinkedIn request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected LinkedIn response: {0}")]
    Decode(String),
}

impl LinkedInError {
    pub fn is_upstream(&self) -> bool {
        matches!(self, LinkedInError::Upstream { .. })
    }
}
