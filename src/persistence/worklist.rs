// * Work-list checkpoint file and the in-memory queue the batch driver pops from
// * The file is a flat list of pending ids, one per line, replaced atomically.

use std::collections::VecDeque;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::persistence::schema::ExternalId;

// * Header of the first column in the source's tab-separated id dump
const DUMP_HEADER: &str = "tconst";

#[derive(Debug, Error)]
pub enum WorkListError {
    #[error("Work-list not found at {0} (seed it first)")]
    Missing(PathBuf),

    #[error("Work-list I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The durable work-list file
#[derive(Debug, Clone)]
pub struct WorkList {
    path: PathBuf,
}

impl WorkList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the pending ids. Unparseable lines are skipped.
    pub fn load(&self) -> Result<Vec<ExternalId>, WorkListError> {
        if !self.path.exists() {
            return Err(WorkListError::Missing(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let ids = parse_lines(&content, |line| Some(line.trim()));
        info!(path = %self.path.display(), pending = ids.len(), "Work-list loaded");
        Ok(ids)
    }

    /// Overwrites the file with the given ids (write to a sibling, then rename)
    pub fn save(&self, ids: &[ExternalId]) -> Result<(), WorkListError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            for id in ids {
                writeln!(file, "{}", id)?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), pending = ids.len(), "Checkpoint written");
        Ok(())
    }

    /// Builds an id list from the tab-separated dump (first column, header skipped)
    pub fn seed_from_dump(dump: impl AsRef<Path>) -> Result<Vec<ExternalId>, WorkListError> {
        let content = fs::read_to_string(dump.as_ref())?;
        Ok(parse_lines(&content, |line| line.split_whitespace().next()))
    }
}

fn parse_lines<'a>(content: &'a str, column: impl Fn(&'a str) -> Option<&'a str>) -> Vec<ExternalId> {
    content
        .lines()
        .filter_map(column)
        .filter(|token| !token.is_empty() && *token != DUMP_HEADER)
        .filter_map(|token| match ExternalId::parse(token) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(token, error = %e, "Skipping work-list entry");
                None
            }
        })
        .collect()
}

/// Pop-from-front cursor over the pending ids.
///
/// Items that failed transiently are deferred: they leave this run but stay in
/// every checkpoint so the next run retries them.
#[derive(Debug, Clone, Default)]
pub struct WorkQueue {
    pending: VecDeque<ExternalId>,
    deferred: Vec<ExternalId>,
}

impl WorkQueue {
    pub fn new(ids: impl IntoIterator<Item = ExternalId>) -> Self {
        Self {
            pending: ids.into_iter().collect(),
            deferred: Vec::new(),
        }
    }

    pub fn next(&mut self) -> Option<ExternalId> {
        self.pending.pop_front()
    }

    /// Puts an item back at the head (used when a run aborts mid-item)
    pub fn requeue(&mut self, id: ExternalId) {
        self.pending.push_front(id);
    }

    pub fn defer(&mut self, id: ExternalId) {
        self.deferred.push(id);
    }

    /// Snapshot written to the checkpoint: pending first, then deferred
    pub fn remaining(&self) -> Vec<ExternalId> {
        self.pending
            .iter()
            .chain(self.deferred.iter())
            .cloned()
            .collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }
}
