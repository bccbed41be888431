use super::Collected;
use crate::api::{GithubClient, RateLimited};
use crate::scanner::{FileContent, SourceFile};
use crate::settings::Limits;
use anyhow::Result;

/// Fetch every blob of `owner/repo` at its default branch.
pub async fn fetch(client: &GithubClient, owner: &str, repo: &str, limits: &Limits) -> Result<Collected> {
    let branch = client.default_branch(owner, repo).await?;
    o_debug!("  {}/{} default branch: {}", owner, repo, branch);

    let tree = client.tree(owner, repo, &branch).await?;
    if tree.truncated {
        o_warn!("GitHub truncated the tree listing for {}/{}; some files were not seen", owner, repo);
    }

    let mut blobs: Vec<_> = tree.tree.into_iter().filter(|e| e.is_blob()).collect();
    blobs.sort_by(|a, b| a.path.cmp(&b.path));

    let mut out = Collected::default();
    if blobs.len() > limits.max_files {
        blobs.truncate(limits.max_files);
        out.truncated = true;
        o_warn!(
            "Stopped after {} files; raise limits.max_files to scan more",
            limits.max_files
        );
    }

    for entry in blobs {
        let size = entry.size.unwrap_or(0);
        if size > limits.max_remote_file_bytes {
            out.files.push(SourceFile::skipped(
                entry.path,
                FileContent::TooLarge { size },
                Some(size),
            ));
            continue;
        }

        let content = match client.raw(owner, repo, &branch, &entry.path).await {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => FileContent::Text(text),
                Err(_) => FileContent::Unreadable {
                    reason: "not valid UTF-8".into(),
                },
            },
            Err(err) if err.is::<RateLimited>() => return Err(err),
            Err(err) => FileContent::Unreadable {
                reason: format!("{:#}", err),
            },
        };
        out.files.push(SourceFile {
            name: entry.path,
            content,
            size_bytes: Some(size),
        });
    }

    Ok(out)
}
