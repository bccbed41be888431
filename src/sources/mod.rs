//! File-retrieval providers feeding the detector.

pub mod github;
pub mod local;

use crate::scanner::SourceFile;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Files gathered from one source, in a stable order.
#[derive(Debug, Default)]
pub struct Collected {
    pub files: Vec<SourceFile>,
    /// More files existed than `max_files` allowed.
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Local(PathBuf),
    Github { owner: String, repo: String },
}

impl Source {
    /// Name used for compose services and submission records.
    pub fn display_name(&self) -> String {
        match self {
            Source::Github { owner, repo } => format!("github:{}/{}", owner, repo),
            Source::Local(p) => p.display().to_string(),
        }
    }

    pub fn project_name(&self) -> String {
        match self {
            Source::Github { repo, .. } => repo.clone(),
            Source::Local(p) => p
                .canonicalize()
                .ok()
                .and_then(|abs| abs.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "app".to_string()),
        }
    }
}

fn parse_owner_repo(s: &str) -> Option<(String, String)> {
    let s = s.trim_end_matches('/');
    let s = s.strip_suffix(".git").unwrap_or(s);
    let mut parts = s.split('/');
    let owner = parts.next()?;
    let repo = parts.next()?;
    let valid = |p: &str| {
        !p.is_empty()
            && !p.starts_with('.')
            && p.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if valid(owner) && valid(repo) {
        Some((owner.to_string(), repo.to_string()))
    } else {
        None
    }
}

/// Decide where `arg` points. Existing paths are always local; otherwise
/// `github:owner/repo`, a github.com URL, or bare `owner/repo`.
pub fn resolve(arg: &str) -> Result<Source> {
    let github = |rest: &str| -> Result<Source> {
        match parse_owner_repo(rest) {
            Some((owner, repo)) => Ok(Source::Github { owner, repo }),
            None => bail!("Invalid GitHub repository '{}' (expected owner/repo)", arg),
        }
    };

    if let Some(rest) = arg.strip_prefix("github:") {
        return github(rest);
    }
    for prefix in ["https://github.com/", "http://github.com/", "github.com/"] {
        if let Some(rest) = arg.strip_prefix(prefix) {
            return github(rest);
        }
    }

    let path = Path::new(arg);
    if path.exists() {
        return Ok(Source::Local(path.to_path_buf()));
    }
    if arg.matches('/').count() == 1 && !arg.starts_with('.') {
        if let Some((owner, repo)) = parse_owner_repo(arg) {
            return Ok(Source::Github { owner, repo });
        }
    }
    bail!("'{}' is neither a directory nor a GitHub repository", arg)
}
