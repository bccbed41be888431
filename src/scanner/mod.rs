pub mod env_file;
pub mod manifest;
pub mod patterns;

use crate::error::PipelineError;
use manifest::ManifestParse;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

const TOO_LARGE_PREFIX: &str = "[FILE TOO LARGE FOR ANALYSIS";
const UNREADABLE_PREFIX: &str = "[ERROR READING FILE CONTENT:";

/// File body as captured by a source provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    TooLarge { size: u64 },
    Unreadable { reason: String },
}

impl FileContent {
    /// Map a wire string onto a content value, recognising the skip markers
    /// upload clients put in place of real contents.
    pub fn from_wire(raw: String, size: Option<u64>) -> Self {
        if raw.starts_with(TOO_LARGE_PREFIX) {
            FileContent::TooLarge { size: size.unwrap_or(0) }
        } else if let Some(rest) = raw.strip_prefix(UNREADABLE_PREFIX) {
            FileContent::Unreadable {
                reason: rest.trim().trim_end_matches(']').trim().to_string(),
            }
        } else {
            FileContent::Text(raw)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(s) => Some(s),
            _ => None,
        }
    }

    fn skip_detail(&self) -> String {
        match self {
            FileContent::Text(_) => String::new(),
            FileContent::TooLarge { size } => {
                format!("too large ({:.2}MB)", *size as f64 / 1024.0 / 1024.0)
            }
            FileContent::Unreadable { reason } => format!("unreadable ({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content: FileContent,
    pub size_bytes: Option<u64>,
}

impl SourceFile {
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        SourceFile {
            name: name.into(),
            size_bytes: Some(content.len() as u64),
            content: FileContent::Text(content),
        }
    }

    pub fn skipped(name: impl Into<String>, content: FileContent, size_bytes: Option<u64>) -> Self {
        SourceFile {
            name: name.into(),
            content,
            size_bytes,
        }
    }

    /// Last path component; both `/` and `\` separate.
    pub fn base_name(&self) -> &str {
        self.name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(&self.name)
    }

    /// Build a file list from an untyped JSON payload:
    /// `[{"name": "...", "content": "...", "size": 123}, ...]`.
    pub fn list_from_json(value: &Value) -> Result<Vec<SourceFile>, PipelineError> {
        let items = value
            .as_array()
            .ok_or_else(|| PipelineError::invalid("files must be an array"))?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let name = item
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| PipelineError::invalid(format!("files[{}] has no name", i)))?;
                let size = item
                    .get("size")
                    .or_else(|| item.get("sizeBytes"))
                    .and_then(Value::as_u64);
                let content = match item.get("content").and_then(Value::as_str) {
                    Some(raw) => FileContent::from_wire(raw.to_string(), size),
                    None => FileContent::Unreadable {
                        reason: "no content".into(),
                    },
                };
                Ok(SourceFile {
                    name: name.to_string(),
                    content,
                    size_bytes: size,
                })
            })
            .collect()
    }
}

/// Everything the detector learned about a file set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProfile {
    pub tech_stack: BTreeSet<String>,
    pub dependencies: BTreeSet<String>,
    pub env_variable_names: BTreeSet<String>,
    pub project_structure: Vec<String>,
    pub entry_point: Option<String>,
    pub build_command: Option<String>,
    pub start_command: Option<String>,
    pub ports: BTreeSet<u16>,
}

/// A file that was recovered from locally and contributed less than usual.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScanWarning {
    #[error("{file}: malformed manifest ({reason})")]
    MalformedManifest { file: String, reason: String },
    #[error("{file}: {detail}")]
    UnreadableFile { file: String, detail: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub profile: ProjectProfile,
    pub warnings: Vec<ScanWarning>,
}

/// Fallback start command for Node.js projects without a start script.
pub const NODE_DEFAULT_START: &str = "node .";

/// Classify `files` without executing any of them.
pub fn scan(files: &[SourceFile]) -> Analysis {
    let mut profile = ProjectProfile::default();
    let mut warnings = Vec::new();

    for file in files {
        profile.project_structure.push(file.name.clone());

        let content = match file.content.as_text() {
            Some(c) => c,
            None => {
                let warning = ScanWarning::UnreadableFile {
                    file: file.name.clone(),
                    detail: file.content.skip_detail(),
                };
                o_debug!("  skip {}", warning);
                warnings.push(warning);
                continue;
            }
        };
        let base = file.base_name();

        for label in patterns::labels_for(base) {
            profile.tech_stack.insert(label.to_string());
        }

        match manifest::parse(base, content) {
            Some(ManifestParse::Parsed(m)) => merge_manifest(&mut profile, m),
            Some(ManifestParse::Malformed { reason }) => {
                let warning = ScanWarning::MalformedManifest {
                    file: file.name.clone(),
                    reason,
                };
                o_debug!("  skip {}", warning);
                warnings.push(warning);
            }
            None => {}
        }

        if env_file::is_env_file(base) {
            profile.env_variable_names.extend(env_file::variable_names(content));
        }

        profile.ports.extend(patterns::ports_for(content));

        if profile.entry_point.is_none() && patterns::is_entry_point(base) {
            profile.entry_point = Some(file.name.clone());
        }
    }

    if profile.tech_stack.contains(patterns::NODE) && profile.start_command.is_none() {
        profile.start_command = Some(NODE_DEFAULT_START.to_string());
    }

    Analysis { profile, warnings }
}

/// Profile only; warnings are dropped.
pub fn detect(files: &[SourceFile]) -> ProjectProfile {
    scan(files).profile
}

fn merge_manifest(profile: &mut ProjectProfile, m: manifest::Manifest) {
    profile
        .tech_stack
        .extend(m.labels.into_iter().map(String::from));
    profile.dependencies.extend(m.dependencies);
    if profile.start_command.is_none() {
        profile.start_command = m.start_command;
    }
    if profile.build_command.is_none() {
        profile.build_command = m.build_command;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_empty() {
        let profile = detect(&[]);
        assert_eq!(profile, ProjectProfile::default());
        assert!(profile.entry_point.is_none());
        assert!(profile.start_command.is_none());
    }

    #[test]
    fn test_detect_package_json_react() {
        let files = vec![SourceFile::text(
            "package.json",
            r#"{"dependencies":{"react":"18.0.0"},"scripts":{"start":"node server.js"}}"#,
        )];
        let profile = detect(&files);
        assert!(profile.tech_stack.is_superset(&set(&["Node.js", "React"])));
        assert!(profile.dependencies.contains("react"));
        assert_eq!(profile.start_command.as_deref(), Some("node server.js"));
        assert!(profile.ports.contains(&3000));
    }

    #[test]
    fn test_detect_requirements_flask() {
        let files = vec![SourceFile::text("requirements.txt", "flask==2.0")];
        let profile = detect(&files);
        assert!(profile.tech_stack.is_superset(&set(&["Python", "Flask"])));
        assert!(profile.ports.contains(&5000));
    }

    #[test]
    fn test_detect_env_names_only() {
        let files = vec![SourceFile::text(".env", "API_KEY=xyz\n# comment\nDB_URL=abc")];
        let profile = detect(&files);
        assert_eq!(profile.env_variable_names, set(&["API_KEY", "DB_URL"]));
        let serialized = serde_json::to_string(&profile).unwrap();
        assert!(!serialized.contains("xyz"));
        assert!(!serialized.contains("abc"));
    }

    #[test]
    fn test_detect_malformed_package_json_keeps_other_files() {
        let files = vec![
            SourceFile::text("package.json", "{ \"dependencies\": "),
            SourceFile::text("requirements.txt", "django\n"),
            SourceFile::text(".env.production", "SECRET=1"),
        ];
        let analysis = scan(&files);
        let profile = &analysis.profile;
        assert!(profile.tech_stack.contains("Node.js"));
        assert!(profile.tech_stack.contains("Django"));
        assert!(profile.dependencies.contains("django"));
        assert_eq!(profile.env_variable_names, set(&["SECRET"]));
        assert_eq!(profile.start_command.as_deref(), Some(NODE_DEFAULT_START));
        assert!(matches!(
            analysis.warnings.as_slice(),
            [ScanWarning::MalformedManifest { file, .. }] if file == "package.json"
        ));
    }

    #[test]
    fn test_detect_first_manifest_wins() {
        let files = vec![
            SourceFile::text("package.json", r#"{"scripts":{"start":"node a.js"}}"#),
            SourceFile::text(
                "web/package.json",
                r#"{"scripts":{"start":"node b.js","build":"tsc"}}"#,
            ),
        ];
        let profile = detect(&files);
        assert_eq!(profile.start_command.as_deref(), Some("node a.js"));
        assert_eq!(profile.build_command.as_deref(), Some("tsc"));
    }

    #[test]
    fn test_detect_entry_point_input_order() {
        let files = vec![
            SourceFile::text("src/app.py", "print('hi')"),
            SourceFile::text("index.js", "console.log(1)"),
        ];
        let profile = detect(&files);
        assert_eq!(profile.entry_point.as_deref(), Some("src/app.py"));
    }

    #[test]
    fn test_detect_entry_point_suffix_match() {
        let files = vec![
            SourceFile::text("README.md", "# shop"),
            SourceFile::text("webapp.py", "print('hi')"),
        ];
        assert_eq!(detect(&files).entry_point.as_deref(), Some("webapp.py"));
    }

    #[test]
    fn test_detect_sentinel_files_listed_only() {
        let files = vec![
            SourceFile::skipped(
                "package.json",
                FileContent::TooLarge { size: 6 * 1024 * 1024 },
                Some(6 * 1024 * 1024),
            ),
            SourceFile::skipped(
                "index.js",
                FileContent::Unreadable { reason: "binary".into() },
                None,
            ),
        ];
        let analysis = scan(&files);
        assert_eq!(analysis.profile.project_structure, vec!["package.json", "index.js"]);
        assert!(analysis.profile.tech_stack.is_empty());
        assert!(analysis.profile.entry_point.is_none());
        assert!(analysis.profile.start_command.is_none());
        assert_eq!(analysis.warnings.len(), 2);
    }

    #[test]
    fn test_detect_idempotent() {
        let files = vec![
            SourceFile::text("package.json", r#"{"dependencies":{"express":"4"}}"#),
            SourceFile::text("server.js", "const express = require('express')"),
            SourceFile::text(".env", "PORT=3000"),
        ];
        assert_eq!(detect(&files), detect(&files));
    }

    #[test]
    fn test_list_from_json_rejects_non_array() {
        let err = SourceFile::list_from_json(&json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_list_from_json_maps_sentinels() {
        let files = SourceFile::list_from_json(&json!([
            {"name": "big.js", "content": "[FILE TOO LARGE FOR ANALYSIS - 6.00MB]", "size": 6291456},
            {"name": "bad.bin", "content": "[ERROR READING FILE CONTENT: invalid utf-8]"},
            {"name": "ok.txt", "content": "hello"},
            {"name": "none.txt"}
        ]))
        .unwrap();
        assert_eq!(files[0].content, FileContent::TooLarge { size: 6291456 });
        assert_eq!(
            files[1].content,
            FileContent::Unreadable { reason: "invalid utf-8".into() }
        );
        assert_eq!(files[2].content.as_text(), Some("hello"));
        assert!(files[3].content.as_text().is_none());
    }

    #[test]
    fn test_base_name() {
        assert_eq!(SourceFile::text("a/b/package.json", "").base_name(), "package.json");
        assert_eq!(SourceFile::text("a\\b\\.env", "").base_name(), ".env");
        assert_eq!(SourceFile::text("Pipfile", "").base_name(), "Pipfile");
    }
}
