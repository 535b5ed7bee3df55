// * Single-item pipeline: fetch -> decode -> classify -> build -> persist
// * Everything past the fetch is infallible by construction. Only the store can surface an error.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::settings::RetrySettings;
use crate::engine::backoff::Backoff;
use crate::engine::normalization::title_url;
use crate::network::{Fetcher, NetworkError};
use crate::ops::telemetry;
use crate::persistence::schema::{ExternalId, RecordKind};
use crate::persistence::store::{Store, StoreError};
use crate::refinery::classifier::{classify, Classification};
use crate::refinery::structured_data::{decode, DecodedPage};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0} does not exist at the source")]
    NotFound(ExternalId),

    #[error("{id}: gave up after {attempts} attempts ({reason})")]
    TransientFetch {
        id: ExternalId,
        attempts: u32,
        reason: String,
    },

    #[error("{0}: page carries no structured data")]
    NoStructuredData(ExternalId),

    #[error("{0}: cannot build a title URL")]
    InvalidUrl(ExternalId),
}

impl PipelineError {
    /// Worth another attempt in a later run
    pub fn is_transient(&self) -> bool {
        matches!(self, PipelineError::TransientFetch { .. })
    }
}

pub struct Pipeline<F> {
    fetcher: F,
    base_url: String,
    retry: RetrySettings,
}

impl<F: Fetcher> Pipeline<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>, retry: RetrySettings) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            retry,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn title_url(&self, id: &ExternalId) -> Result<String, PipelineError> {
        title_url(&self.base_url, id.as_str()).ok_or_else(|| PipelineError::InvalidUrl(id.clone()))
    }

    /// Fetches and decodes the title page, re-fetching on malformed payloads and
    /// transient transport failures until the backoff schedule runs out
    pub async fn acquire(&self, id: &ExternalId) -> Result<DecodedPage, PipelineError> {
        let url = self.title_url(id)?;
        let mut backoff = Backoff::new(&self.retry);
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let (cause, reason) = match self.fetcher.fetch(&url).await {
                Ok(body) => match decode(body) {
                    Ok(page) => return Ok(page),
                    Err(e) if e.is_transient() => ("malformed", e.to_string()),
                    Err(_) => return Err(PipelineError::NoStructuredData(id.clone())),
                },
                Err(NetworkError::NotFound(_)) => return Err(PipelineError::NotFound(id.clone())),
                Err(NetworkError::InvalidUrl(_)) => {
                    return Err(PipelineError::InvalidUrl(id.clone()))
                }
                Err(e) => ("transient", e.to_string()),
            };

            let Some(delay) = backoff.next() else {
                return Err(PipelineError::TransientFetch {
                    id: id.clone(),
                    attempts,
                    reason,
                });
            };

            warn!(
                id = %id,
                cause,
                attempt = attempts,
                delay_secs = delay.as_secs(),
                reason = %reason,
                "Fetch attempt failed, backing off"
            );
            telemetry::record_fetch_retry(cause);
            tokio::time::sleep(delay).await;
        }
    }

    pub async fn scrape(&self, id: &ExternalId) -> Result<Classification, PipelineError> {
        let page = self.acquire(id).await?;
        Ok(classify(id, &page))
    }
}

/// What happened to one work item
#[derive(Debug)]
pub enum ItemOutcome {
    /// Already stored; no fetch was made
    Skipped { title: String },
    Persisted { kind: RecordKind, title: String },
    /// Lost an insert race against an existing row
    Duplicate,
    /// Episode or unsupported kind
    Rejected(String),
    Failed(PipelineError),
}

/// Where an item goes after processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Remove,
    /// Kept for the next run
    Defer,
}

impl ItemOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::Skipped { .. } => "skipped",
            ItemOutcome::Persisted { .. } => "persisted",
            ItemOutcome::Duplicate => "duplicate",
            ItemOutcome::Rejected(_) => "rejected",
            ItemOutcome::Failed(PipelineError::NotFound(_)) => "not_found",
            ItemOutcome::Failed(PipelineError::NoStructuredData(_)) => "no_data",
            ItemOutcome::Failed(_) => "failed",
        }
    }

    pub fn disposition(&self) -> Disposition {
        match self {
            ItemOutcome::Failed(e) if e.is_transient() => Disposition::Defer,
            _ => Disposition::Remove,
        }
    }
}

/// Runs the whole pipeline for one id. The existence check runs before any fetch.
///
/// This is also the hook a lookup service calls on a storage miss before
/// re-querying the store.
pub async fn scrape_one<F: Fetcher>(
    pipeline: &Pipeline<F>,
    store: &Store,
    id: &ExternalId,
) -> Result<ItemOutcome, StoreError> {
    if let Some(title) = store.exists(id)? {
        debug!(id = %id, title = %title, "Already stored, fetch skipped");
        return Ok(ItemOutcome::Skipped { title });
    }

    let classification = match pipeline.scrape(id).await {
        Ok(classification) => classification,
        Err(e) => {
            warn!(id = %id, error = %e, "Item failed");
            return Ok(ItemOutcome::Failed(e));
        }
    };

    match classification {
        Classification::Record(record) => match store.insert(&record) {
            Ok(()) => Ok(ItemOutcome::Persisted {
                kind: record.kind(),
                title: record.title().to_string(),
            }),
            Err(e) if e.is_duplicate() => {
                info!(id = %id, "Duplicate id, insert rejected");
                Ok(ItemOutcome::Duplicate)
            }
            Err(e) => Err(e),
        },
        Classification::Episode => {
            info!(id = %id, "Episode page, not stored");
            Ok(ItemOutcome::Rejected("episode".to_string()))
        }
        Classification::Unsupported(tag) => {
            info!(id = %id, kind = %tag, "Unsupported kind, not stored");
            Ok(ItemOutcome::Rejected(format!("unsupported kind {}", tag)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ExternalId {
        ExternalId::parse(raw).unwrap()
    }

    #[test]
    fn test_dispositions() {
        let transient = ItemOutcome::Failed(PipelineError::TransientFetch {
            id: id("tt1"),
            attempts: 3,
            reason: "timeout".to_string(),
        });
        assert_eq!(transient.disposition(), Disposition::Defer);
        assert_eq!(transient.label(), "failed");

        let missing = ItemOutcome::Failed(PipelineError::NotFound(id("tt2")));
        assert_eq!(missing.disposition(), Disposition::Remove);
        assert_eq!(missing.label(), "not_found");

        assert_eq!(
            ItemOutcome::Rejected("episode".to_string()).disposition(),
            Disposition::Remove
        );
    }
}
