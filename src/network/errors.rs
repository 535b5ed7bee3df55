use thiserror::Error;

// * Unified Error type for the Network Layer.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {0} Forbidden/Throttled")]
    Blocked(u16),

    #[error("Upstream error HTTP {0}")]
    Upstream(u16),

    #[error("Empty response body ({0} bytes)")]
    EmptyResponse(usize),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl NetworkError {
    // * Permanent failures are never retried; everything else may succeed later.
    pub fn is_permanent(&self) -> bool {
        matches!(self, NetworkError::NotFound(_) | NetworkError::InvalidUrl(_))
    }

    pub fn is_transient(&self) -> bool {
        !self.is_permanent()
    }
}
