use super::{Submission, SubmissionStore};
use anyhow::{anyhow, Result};
use std::sync::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

pub struct MemoryStore {
    records: RwLock<Vec<Submission>>,
    tx: broadcast::Sender<Submission>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_records(Vec::new())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn with_records(records: Vec<Submission>) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        MemoryStore {
            records: RwLock::new(records),
            tx,
        }
    }

    /// Append, run `commit` on the full list while still holding the lock,
    /// and only notify subscribers once `commit` succeeded.
    pub(super) fn insert_with<F>(&self, submission: Submission, commit: F) -> Result<()>
    where
        F: FnOnce(&[Submission]) -> Result<()>,
    {
        let mut records = self.records.write().map_err(|_| anyhow!("submission store lock poisoned"))?;
        if records.iter().any(|s| s.id == submission.id) {
            return Err(anyhow!("submission {} already exists", submission.id));
        }
        records.push(submission.clone());
        if let Err(e) = commit(&records) {
            records.pop();
            return Err(e);
        }
        drop(records);

        // No subscribers is not an error.
        let _ = self.tx.send(submission);
        Ok(())
    }
}

impl SubmissionStore for MemoryStore {
    fn insert(&self, submission: Submission) -> Result<()> {
        self.insert_with(submission, |_| Ok(()))
    }

    fn get(&self, id: Uuid) -> Result<Option<Submission>> {
        let records = self.records.read().map_err(|_| anyhow!("submission store lock poisoned"))?;
        Ok(records.iter().find(|s| s.id == id).cloned())
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<Submission>> {
        let records = self.records.read().map_err(|_| anyhow!("submission store lock poisoned"))?;
        Ok(records.iter().filter(|s| s.owner == owner).cloned().collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<Submission> {
        self.tx.subscribe()
    }
}
