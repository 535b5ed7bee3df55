// * Fetcher Adapter
// * The transport behind one trait so the pipeline never sees reqwest directly.

pub mod client;
pub mod errors;
pub mod escalation;
pub mod identity;

pub use client::{classify_status, FastClient};
pub use errors::NetworkError;
pub use escalation::{EscalatingFetcher, FetchTier};
pub use identity::IdentityProfile;

use std::future::Future;

/// Fetches the raw document behind a URL.
///
/// Implementations must report a missing resource as [`NetworkError::NotFound`]
/// so callers can tell it apart from transient failures.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, NetworkError>> + Send;
}
