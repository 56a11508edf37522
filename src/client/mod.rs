//! HTTP clients: one for this service, one for the NHL play-by-play feed.

mod game;
mod serving;

pub use game::{GameClient, SeenIdSet, GAMECENTER_BASE_URL};
pub use serving::{ServingClient, SwapResponse, DEFAULT_CLIENT_FEATURES};

use std::time::Duration;

/// Per-request timeout for both clients.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response structure: {0}")]
    UnexpectedResponse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn build_http(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}
