use std::time::Duration;

use reel_harvest::network::client::{classify_status, FastClient};
use reel_harvest::network::identity::IdentityProfile;
use reel_harvest::network::NetworkError;
use reqwest::StatusCode;

#[test]
fn test_client_initialization() {
    let client = FastClient::new(&IdentityProfile::desktop_chrome(), None, Duration::from_secs(5));
    assert!(client.is_ok());
    assert_eq!(client.unwrap().profile(), "desktop_chrome");
}

#[test]
fn test_invalid_proxy_rejected() {
    let client = FastClient::new(
        &IdentityProfile::desktop_chrome(),
        Some("not a proxy url"),
        Duration::from_secs(5),
    );
    assert!(client.is_err());
}

#[test]
fn test_status_taxonomy() {
    let url = "https://www.imdb.com/title/tt0000000/";

    assert!(classify_status(StatusCode::OK, url).is_none());

    let missing = classify_status(StatusCode::NOT_FOUND, url).unwrap();
    assert!(matches!(missing, NetworkError::NotFound(_)));
    assert!(missing.is_permanent());

    let throttled = classify_status(StatusCode::TOO_MANY_REQUESTS, url).unwrap();
    assert!(matches!(throttled, NetworkError::Blocked(429)));
    assert!(throttled.is_transient());

    let upstream = classify_status(StatusCode::BAD_GATEWAY, url).unwrap();
    assert!(matches!(upstream, NetworkError::Upstream(502)));
    assert!(upstream.is_transient());
}
