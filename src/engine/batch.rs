// * Batch Driver
// * Drains a work queue one item at a time. Insert-count pauses, connection recycling
// * and checkpointing each run on their own counter.

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::config::settings::BatchSettings;
use crate::engine::pipeline::{scrape_one, Disposition, ItemOutcome, Pipeline};
use crate::engine::rate_limiter::PauseThrottle;
use crate::network::Fetcher;
use crate::ops::telemetry;
use crate::persistence::store::{Store, StoreError};
use crate::persistence::worklist::{WorkList, WorkListError, WorkQueue};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Storage failure, batch aborted: {0}")]
    Store(#[from] StoreError),

    #[error("Checkpoint failure, batch aborted: {0}")]
    WorkList(#[from] WorkListError),
}

/// Counts per outcome for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub persisted: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub rejected: usize,
    /// Not found or without structured data
    pub dropped: usize,
    pub deferred: usize,
    pub pauses: usize,
    pub recycles: usize,
    pub checkpoints: usize,
    /// Ids left in the final checkpoint
    pub remaining: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: &ItemOutcome) {
        self.processed += 1;
        match outcome {
            ItemOutcome::Skipped { .. } => self.skipped += 1,
            ItemOutcome::Persisted { .. } => self.persisted += 1,
            ItemOutcome::Duplicate => self.duplicates += 1,
            ItemOutcome::Rejected(_) => self.rejected += 1,
            ItemOutcome::Failed(_) => match outcome.disposition() {
                Disposition::Defer => self.deferred += 1,
                Disposition::Remove => self.dropped += 1,
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn on_cadence(count: usize, every: usize) -> bool {
    every > 0 && count % every == 0
}

pub struct BatchDriver<'a, F> {
    pipeline: &'a Pipeline<F>,
    store: &'a mut Store,
    worklist: &'a WorkList,
    settings: BatchSettings,
}

impl<'a, F: Fetcher> BatchDriver<'a, F> {
    pub fn new(
        pipeline: &'a Pipeline<F>,
        store: &'a mut Store,
        worklist: &'a WorkList,
        settings: BatchSettings,
    ) -> Self {
        Self {
            pipeline,
            store,
            worklist,
            settings,
        }
    }

    fn checkpoint(&self, queue: &WorkQueue, report: &mut BatchReport) -> Result<(), WorkListError> {
        self.worklist.save(&queue.remaining())?;
        report.checkpoints += 1;
        Ok(())
    }

    /// Processes the queue until it is empty or the item limit is reached.
    ///
    /// Only a storage or checkpoint failure ends the run early; the remaining ids
    /// (including the item in flight) are checkpointed first.
    pub async fn run(&mut self, mut queue: WorkQueue) -> Result<BatchReport, BatchError> {
        let mut report = BatchReport::default();
        let mut throttle = PauseThrottle::new(
            self.settings.pause_after_inserts,
            self.settings.pause_duration,
        );

        info!(
            pending = queue.pending_len(),
            limit = ?self.settings.limit,
            "Batch run started"
        );

        loop {
            if self.settings.limit.is_some_and(|limit| report.processed >= limit) {
                info!(processed = report.processed, "Item limit reached");
                break;
            }
            let Some(id) = queue.next() else {
                break;
            };

            throttle.pause_if_due().await;

            let outcome = match scrape_one(self.pipeline, self.store, &id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(id = %id, error = %e, "Storage failure, checkpointing and aborting");
                    queue.requeue(id);
                    self.checkpoint(&queue, &mut report)?;
                    return Err(e.into());
                }
            };

            telemetry::record_item_outcome(outcome.label());
            if let ItemOutcome::Persisted { kind, .. } = &outcome {
                throttle.record_insert();
                telemetry::record_stored(kind.label());
            }
            if outcome.disposition() == Disposition::Defer {
                queue.defer(id);
            }
            report.record(&outcome);
            telemetry::set_queue_depth(queue.pending_len());

            if on_cadence(report.processed, self.settings.recycle_every) {
                if let Err(e) = self.store.recycle() {
                    error!(error = %e, "Storage recycle failed, checkpointing and aborting");
                    self.checkpoint(&queue, &mut report)?;
                    return Err(e.into());
                }
                report.recycles += 1;
            }
            if on_cadence(report.processed, self.settings.checkpoint_every) {
                self.checkpoint(&queue, &mut report)?;
                info!(
                    processed = report.processed,
                    pending = queue.pending_len(),
                    deferred = queue.deferred_len(),
                    "Checkpoint written"
                );
            }
        }

        self.checkpoint(&queue, &mut report)?;
        report.pauses = throttle.pauses_taken();
        report.remaining = queue.remaining().len();

        info!(
            processed = report.processed,
            persisted = report.persisted,
            skipped = report.skipped,
            deferred = report.deferred,
            remaining = report.remaining,
            "Batch run finished"
        );
        Ok(report)
    }
}
