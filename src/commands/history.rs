use crate::commands::common;
use crate::config;
use crate::settings::Settings;
use crate::store::SubmissionStore;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn handle_history(owner: Option<String>, json: bool) -> Result<()> {
    let settings = Settings::load(None)?;
    let cfg = config::load_config().context("Config error")?;
    let owner = cfg.resolved_owner(owner.as_deref());

    let store = common::open_store(settings.server.store_path.as_deref())?;
    let submissions = store.list_by_owner(&owner)?;

    if json {
        o_result!("{}", serde_json::to_string_pretty(&submissions)?);
        return Ok(());
    }

    if submissions.is_empty() {
        o_result!("No submissions for {}.", owner.cyan());
        return Ok(());
    }

    o_step!("{} {}", "📜 Submissions for".cyan(), owner.bold());
    for s in submissions.iter().rev() {
        let id = s.id.to_string();
        o_result!(
            "  {}  {}  {:<12}  {}",
            id[..8].dimmed(),
            s.created_at.format("%Y-%m-%d %H:%M"),
            s.family.green(),
            s.source
        );
        o_debug!("            {}", s.tech_stack.join(", "));
    }
    Ok(())
}
