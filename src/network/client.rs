use crate::config::constants::MIN_BODY_BYTES;
use crate::network::errors::NetworkError;
use crate::network::identity::IdentityProfile;
use reqwest::{Client, StatusCode};
use std::time::Duration;

// * Single-identity HTTP client. Escalation across identities lives in escalation.rs.
pub struct FastClient {
    inner: Client,
    profile: &'static str,
}

impl FastClient {
    // * Initializes the client with the given identity.
    // * @param proxy_url - Optional proxy URL (e.g., "http://user:pass@ip:port")
    pub fn new(
        identity: &IdentityProfile,
        proxy_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, NetworkError> {
        let mut builder = Client::builder()
            .default_headers(identity.headers())
            .cookie_store(true)
            .gzip(true)
            .timeout(timeout);

        // * Apply Proxy if provided
        if let Some(url) = proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(url)?);
        }

        Ok(Self {
            inner: builder.build()?,
            profile: identity.name,
        })
    }

    pub fn profile(&self) -> &'static str {
        self.profile
    }

    // * Fetches a URL and maps the response status onto the fetch taxonomy.
    pub async fn fetch(&self, url: &str) -> Result<String, NetworkError> {
        let resp = self.inner.get(url).send().await?;

        if let Some(err) = classify_status(resp.status(), url) {
            return Err(err);
        }

        // * Chunked-encoding hiccups surface here as reqwest body errors (transient).
        let body = resp.text().await?;

        if body.len() < MIN_BODY_BYTES {
            return Err(NetworkError::EmptyResponse(body.len()));
        }

        Ok(body)
    }
}

// * Maps an HTTP status to an error, or None for success.
// * 404 is the only permanent answer; throttling and 5xx are worth retrying.
pub fn classify_status(status: StatusCode, url: &str) -> Option<NetworkError> {
    if status.is_success() {
        return None;
    }

    match status.as_u16() {
        404 | 410 => Some(NetworkError::NotFound(url.to_string())),
        403 | 429 => Some(NetworkError::Blocked(status.as_u16())),
        code => Some(NetworkError::Upstream(code)),
    }
}
