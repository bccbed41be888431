use crate::api::GithubClient;
use crate::config::{self, Config};
use crate::scanner::{Analysis, ProjectProfile, ScanWarning};
use crate::settings::Limits;
use crate::sources::{self, github, local, Collected, Source};
use crate::store::FileStore;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Gather files from `source` with the configured limits.
pub async fn collect(source: &Source, limits: &Limits, cfg: &Config) -> Result<Collected> {
    match source {
        Source::Local(dir) => {
            o_step!("{}", format!("🔍 Scanning {}...", dir.display()).cyan());
            local::collect(dir, limits)
        }
        Source::Github { owner, repo } => {
            o_step!("{}", format!("🔍 Fetching {}/{} from GitHub...", owner, repo).cyan());
            let client = GithubClient::new(cfg.resolved_token())?;
            github::fetch(&client, owner, repo, limits).await
        }
    }
}

/// Resolve, collect and scan in one go.
pub async fn analyze(source_arg: &str, limits: &Limits, cfg: &Config) -> Result<(Source, Analysis)> {
    let source = sources::resolve(source_arg)?;
    let collected = collect(&source, limits, cfg).await?;
    let bytes: u64 = collected.files.iter().filter_map(|f| f.size_bytes).sum();
    o_debug!(
        "   {} files collected ({} bytes){}",
        collected.files.len(),
        bytes,
        if collected.truncated { ", truncated" } else { "" }
    );
    let analysis = crate::scanner::scan(&collected.files);
    Ok((source, analysis))
}

pub fn open_store(path: Option<&Path>) -> Result<FileStore> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config::default_store_path()?,
    };
    FileStore::open(path)
}

fn join_or_dash<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let joined: Vec<&str> = items.into_iter().map(String::as_str).collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(", ")
    }
}

pub fn print_profile(profile: &ProjectProfile) {
    let ports: Vec<String> = profile.ports.iter().map(u16::to_string).collect();
    o_result!("  {}   {}", "Tech stack:".bold(), join_or_dash(&profile.tech_stack).green());
    o_result!("  {} {}", "Dependencies:".bold(), profile.dependencies.len());
    o_detail!("                {}", join_or_dash(&profile.dependencies).dimmed());
    o_result!("  {}     {}", "Env vars:".bold(), join_or_dash(&profile.env_variable_names).yellow());
    o_result!(
        "  {}  {}",
        "Entry point:".bold(),
        profile.entry_point.as_deref().unwrap_or("-").cyan()
    );
    o_result!("  {}        {}", "Build:".bold(), profile.build_command.as_deref().unwrap_or("-"));
    o_result!("  {}        {}", "Start:".bold(), profile.start_command.as_deref().unwrap_or("-"));
    o_result!(
        "  {}        {}",
        "Ports:".bold(),
        if ports.is_empty() { "-".to_string() } else { ports.join(", ") }
    );
    o_detail!("  {}        {}", "Files:".bold(), profile.project_structure.len());
}

pub fn print_warnings(warnings: &[ScanWarning]) {
    if warnings.is_empty() {
        return;
    }
    o_warn!("{} {} file(s) contributed only their name:", "⚠".yellow(), warnings.len());
    for w in warnings {
        o_debug!("   {}", w);
    }
}

/// Write `content` to `path`. An existing file is replaced only with
/// `yes` or an interactive confirmation. Returns whether it was written.
pub fn write_artifact(path: &Path, content: &str, yes: bool, interactive: bool) -> Result<bool> {
    if path.exists() && !yes {
        let question = format!("{} exists. Overwrite?", path.display());
        if !crate::prompt::confirm_no(&question, interactive)? {
            o_warn!("{} Kept existing {} (use --yes to overwrite)", "⚠".yellow(), path.display());
            return Ok(false);
        }
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    o_success!("{} Wrote {}", "✓".green(), path.display());
    Ok(true)
}
