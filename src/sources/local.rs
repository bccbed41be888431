use super::Collected;
use crate::scanner::{FileContent, SourceFile};
use crate::settings::Limits;
use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use std::fs;
use std::path::Path;

/// Walk `dir` honouring .gitignore. Dotfiles are included so `.env*` is seen.
pub fn collect(dir: &Path, limits: &Limits) -> Result<Collected> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let walker = WalkBuilder::new(dir)
        .hidden(false)
        .git_ignore(true)
        .require_git(false)
        .filter_entry(|e| e.file_name().to_str() != Some(".git"))
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    let mut out = Collected::default();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                o_debug!("  skip entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().map_or(false, |t| t.is_file()) {
            continue;
        }

        if out.files.len() >= limits.max_files {
            out.truncated = true;
            break;
        }

        let path = entry.path();
        let name = path
            .strip_prefix(dir)
            .context("Walked outside the source directory")?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        out.files.push(read_file(path, name, limits.max_file_bytes));
    }

    if out.truncated {
        o_warn!(
            "Stopped after {} files; raise limits.max_files to scan more",
            limits.max_files
        );
    }
    Ok(out)
}

fn read_file(path: &Path, name: String, max_bytes: u64) -> SourceFile {
    let size = match fs::metadata(path) {
        Ok(m) => m.len(),
        Err(err) => {
            return SourceFile::skipped(name, FileContent::Unreadable { reason: err.to_string() }, None)
        }
    };
    if size > max_bytes {
        return SourceFile::skipped(name, FileContent::TooLarge { size }, Some(size));
    }

    let content = match fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => return SourceFile::text(name, text),
            Err(_) => FileContent::Unreadable {
                reason: "not valid UTF-8".into(),
            },
        },
        Err(err) => FileContent::Unreadable {
            reason: err.to_string(),
        },
    };
    SourceFile::skipped(name, content, Some(size))
}
