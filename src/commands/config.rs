use crate::config::{load_config, save_config};
use anyhow::{Context, Result};
use colored::Colorize;

fn mask(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    format!("{}{}", visible, "*".repeat(token.chars().count().saturating_sub(4).min(12)))
}

pub async fn handle_set_token(token: String) -> Result<()> {
    let mut cfg = load_config().context("Config error")?;
    cfg.github_token = Some(token.trim().to_string()).filter(|t| !t.is_empty());
    save_config(&cfg)?;
    o_success!("{} GitHub token saved", "✓".green());
    Ok(())
}

pub async fn handle_set_owner(owner: String) -> Result<()> {
    let owner = owner.trim();
    if owner.is_empty() {
        anyhow::bail!("Owner must not be empty");
    }
    let mut cfg = load_config().context("Config error")?;
    cfg.owner = Some(owner.to_string());
    save_config(&cfg)?;
    o_success!("{} Owner set to {}", "✓".green(), owner.cyan());
    Ok(())
}

pub async fn handle_show() -> Result<()> {
    let cfg = load_config().context("Config error")?;
    let stored = cfg.github_token.as_deref().map(mask);
    let from_env = std::env::var("GITHUB_TOKEN").map_or(false, |t| !t.trim().is_empty());

    o_result!(
        "  {}  {}{}",
        "GitHub token:".bold(),
        stored.unwrap_or_else(|| "-".into()),
        if from_env { " (overridden by GITHUB_TOKEN)".dimmed().to_string() } else { String::new() }
    );
    o_result!("  {}         {}", "Owner:".bold(), cfg.resolved_owner(None).cyan());
    Ok(())
}
