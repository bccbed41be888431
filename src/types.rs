use crate::recipe::Recipe;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── GitHub REST ──────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub struct GithubError {
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct RepoResponse {
    pub default_branch: String,
}

#[derive(Deserialize, Debug)]
pub struct TreeResponse {
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

// ─── HTTP service ─────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize, Debug)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub files: Value,
}

#[derive(Serialize, Debug)]
pub struct GenerateResponse {
    pub dockerfile: String,
    pub recipe: Recipe,
}

#[derive(Deserialize, Debug)]
pub struct SubmissionRequest {
    pub owner: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub files: Value,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    pub owner: Option<String>,
}
