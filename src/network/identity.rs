use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

// * IdentityProfile defines the browser characteristics presented to the source.
// * The source serves localized titles by Accept-Language, so it is pinned to en-US.
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    pub name: &'static str,
    pub user_agent: String,
    pub accept: &'static str,
    pub accept_language: &'static str,
}

impl IdentityProfile {
    // * Primary tier: desktop Chrome.
    pub fn desktop_chrome() -> Self {
        let full_version = "120.0.6099.109";

        Self {
            name: "desktop_chrome",
            user_agent: format!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
                full_version
            ),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            accept_language: "en-US,en;q=0.9",
        }
    }

    // * Alternate tier: desktop Firefox, used once the primary identity hits a transient wall.
    pub fn desktop_firefox() -> Self {
        Self {
            name: "desktop_firefox",
            user_agent:
                "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,*/*;q=0.8",
            accept_language: "en-US,en;q=0.5",
        }
    }

    // * Builds the default header set for this profile.
    // * A profile whose UA cannot be encoded as a header value falls back to no UA header.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.apply_to_headers(&mut headers);
        headers
    }

    // * Applies the configured profile to a mutable HeaderMap.
    pub fn apply_to_headers(&self, headers: &mut HeaderMap) {
        if let Ok(ua) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        headers.insert(ACCEPT, HeaderValue::from_static(self.accept));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(self.accept_language));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    }
}
