//! Submission history. Handed to the CLI and HTTP service explicitly.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::recipe::Recipe;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// One detect + synthesize run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub owner: String,
    pub source: String,
    pub tech_stack: Vec<String>,
    pub family: String,
    pub dockerfile: String,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(owner: &str, source: &str, tech_stack: Vec<String>, recipe: &Recipe) -> Self {
        Submission {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            source: source.to_string(),
            tech_stack,
            family: recipe.family.clone(),
            dockerfile: recipe.render(),
            created_at: Utc::now(),
        }
    }
}

pub trait SubmissionStore: Send + Sync {
    fn insert(&self, submission: Submission) -> Result<()>;
    fn get(&self, id: Uuid) -> Result<Option<Submission>>;
    /// Oldest first.
    fn list_by_owner(&self, owner: &str) -> Result<Vec<Submission>>;
    /// Every later successful insert is delivered to the receiver.
    fn subscribe(&self) -> broadcast::Receiver<Submission>;
}
