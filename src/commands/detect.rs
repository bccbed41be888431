use crate::commands::common;
use crate::config;
use crate::settings::Settings;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn handle_detect(source: String, json: bool) -> Result<()> {
    let settings = Settings::load(None)?;
    let cfg = config::load_config().context("Config error")?;

    let (source, analysis) = common::analyze(&source, &settings.limits, &cfg).await?;

    if json {
        o_result!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    o_step!("\n{} {}", "📋 Profile for".cyan(), source.display_name().bold());
    common::print_profile(&analysis.profile);
    common::print_warnings(&analysis.warnings);
    Ok(())
}
