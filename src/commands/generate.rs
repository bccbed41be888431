use crate::commands::common;
use crate::config;
use crate::prompt;
use crate::recipe::{self, render, RecipeInput};
use crate::settings::Settings;
use crate::store::{Submission, SubmissionStore};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

pub struct GenerateArgs {
    pub source: String,
    pub output: PathBuf,
    pub stack: Vec<String>,
    pub dockerignore: bool,
    pub compose: bool,
    pub yes: bool,
    pub owner: Option<String>,
}

/// Detect, synthesize, write the artifacts and record the run.
pub async fn handle_generate(args: GenerateArgs) -> Result<()> {
    let settings = Settings::load(None)?;
    let cfg = config::load_config().context("Config error")?;

    let (source, analysis) = common::analyze(&args.source, &settings.limits, &cfg).await?;
    common::print_warnings(&analysis.warnings);

    let mut input = RecipeInput::from(&analysis.profile);
    if !args.stack.is_empty() {
        o_debug!("   stack override: {}", args.stack.join(", "));
        input.tech_stack = args.stack.clone();
    }
    if input.tech_stack.is_empty() {
        anyhow::bail!(
            "No technology detected in {}; pass --stack to choose one",
            source.display_name()
        );
    }

    let recipe = recipe::synthesize(&input)?;
    o_detail!(
        "   {} {} ({})",
        "Recipe:".bold(),
        recipe.family.green(),
        input.tech_stack.join(", ").dimmed()
    );

    let interactive = prompt::is_interactive();
    let dockerfile = recipe.render();
    common::write_artifact(&args.output, &dockerfile, args.yes, interactive)?;

    let dir = args
        .output
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    if args.dockerignore {
        common::write_artifact(
            &dir.join(".dockerignore"),
            &render::render_dockerignore(&recipe),
            args.yes,
            interactive,
        )?;
    }
    if args.compose {
        common::write_artifact(
            &dir.join("docker-compose.yml"),
            &render::render_compose(&source.project_name(), &recipe),
            args.yes,
            interactive,
        )?;
    }

    let owner = cfg.resolved_owner(args.owner.as_deref());
    let store = common::open_store(settings.server.store_path.as_deref())?;
    let submission = Submission::new(&owner, &source.display_name(), input.tech_stack, &recipe);
    let id = submission.id;
    store.insert(submission)?;
    o_debug!("   recorded submission {} in {}", id, store.path().display());

    o_result!(
        "\n{} {} Dockerfile for {} (port {})",
        "✅".green(),
        recipe.family.cyan(),
        source.display_name().bold(),
        recipe.primary_port()
    );
    Ok(())
}
