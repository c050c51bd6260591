mod client;
mod decode;

pub use client::ApiClient;
pub use decode::decode_items;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the bearer token (401). A signal for the
    /// calling screen, never handled inside the state core.
    #[error("session expired")]
    SessionExpired,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unrecognized response shape: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(String),
}
