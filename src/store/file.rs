use super::{MemoryStore, Submission, SubmissionStore};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use uuid::Uuid;

/// JSON-file backed store; the whole list is rewritten on every insert.
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
        } else {
            Vec::new()
        };
        o_debug!("  loaded {} submissions from {}", records.len(), path.display());
        Ok(FileStore {
            path,
            inner: MemoryStore::with_records(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn persist(path: &Path, records: &[Submission]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(records)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))
}

impl SubmissionStore for FileStore {
    fn insert(&self, submission: Submission) -> Result<()> {
        self.inner
            .insert_with(submission, |records| persist(&self.path, records))
    }

    fn get(&self, id: Uuid) -> Result<Option<Submission>> {
        self.inner.get(id)
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<Submission>> {
        self.inner.list_by_owner(owner)
    }

    fn subscribe(&self) -> broadcast::Receiver<Submission> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{synthesize, RecipeInput};

    fn submission(owner: &str) -> Submission {
        let recipe = synthesize(&RecipeInput {
            tech_stack: vec!["Python".into()],
            ..Default::default()
        })
        .unwrap();
        Submission::new(owner, ".", vec!["Python".into()], &recipe)
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/submissions.json");

        let a = submission("alice");
        {
            let store = FileStore::open(&path).unwrap();
            assert!(store.list_by_owner("alice").unwrap().is_empty());
            store.insert(a.clone()).unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(a.id).unwrap(), Some(a));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submissions.json");
        fs::write(&path, "{not json").unwrap();
        assert!(FileStore::open(&path).is_err());
    }
}
