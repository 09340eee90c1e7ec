use reqwest::StatusCode;
use thiserror::Error;

/// Bodies longer than this are cut before they end up in an error.
const ERROR_BODY_LIMIT: usize = 500;

/// Why a CMS request produced no payload.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("CMS has no such resource: {0}")]
    NotFound(String),

    #[error("CMS kept answering 429 after every retry")]
    RateLimited,

    #[error("CMS failed with a server error: {0}")]
    ServerError(String),

    #[error("Could not reach the CMS: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("CMS response was not usable: {0}")]
    InvalidResponse(String),

    #[error("Snapshot unavailable: {0}")]
    Snapshot(String),
}

impl ApiError {
    /// Classify a non-2xx response. Anything that is neither missing, rate
    /// limited nor a 5xx is reported as an unusable response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = clip_body(body);
        if status == StatusCode::NOT_FOUND {
            ApiError::NotFound(body)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            ApiError::RateLimited
        } else if status.is_server_error() {
            ApiError::ServerError(body)
        } else {
            ApiError::InvalidResponse(format!("HTTP {}: {}", status.as_u16(), body))
        }
    }
}

/// First `ERROR_BODY_LIMIT` bytes of `body`, cut on a char boundary.
fn clip_body(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let cut = (0..=ERROR_BODY_LIMIT)
        .rev()
        .find(|&i| body.is_char_boundary(i))
        .unwrap_or(0);
    format!("{} [{} of {} bytes shown]", &body[..cut], cut, body.len())
}
