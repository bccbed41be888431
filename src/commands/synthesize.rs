use crate::commands::common;
use crate::prompt;
use crate::recipe::{self, RecipeInput};
use crate::scanner::patterns;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Stacks offered by the interactive picker, framework first.
const STACK_CHOICES: &[&[&str]] = &[
    &[patterns::NODE, patterns::NEXTJS],
    &[patterns::NODE, patterns::EXPRESS],
    &[patterns::NODE],
    &[patterns::PYTHON, patterns::DJANGO],
    &[patterns::PYTHON, patterns::FLASK],
    &[patterns::PYTHON, patterns::FASTAPI],
    &[patterns::PYTHON],
    &[patterns::JAVA, patterns::SPRING_BOOT],
    &[patterns::JAVA],
    &[patterns::GO],
];

pub struct SynthesizeArgs {
    pub stack: Vec<String>,
    pub env: Vec<String>,
    pub dep: Vec<String>,
    pub port: Vec<u16>,
    pub entry: Option<String>,
    pub build_cmd: Option<String>,
    pub start_cmd: Option<String>,
    pub output: Option<PathBuf>,
    pub yes: bool,
}

impl SynthesizeArgs {
    fn into_input(self) -> RecipeInput {
        RecipeInput {
            tech_stack: self.stack,
            env_variable_names: self.env,
            dependencies: self.dep,
            entry_point: self.entry,
            build_command: self.build_cmd,
            start_command: self.start_cmd,
            ports: self.port,
            project_structure: Vec::new(),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Ask for whatever the flags left out.
fn wizard(input: &mut RecipeInput, interactive: bool) -> Result<()> {
    let labels: Vec<String> = STACK_CHOICES.iter().map(|c| c.join(" + ")).collect();
    let options: Vec<&str> = labels.iter().map(String::as_str).collect();

    o_step!("{}", "🧩 Choose a stack".cyan());
    let choice = prompt::select("Stack", &options, 0, interactive)?;
    input.tech_stack = STACK_CHOICES[choice].iter().map(|s| s.to_string()).collect();

    if input.ports.is_empty() {
        let port = prompt::input_with_default("Port", &recipe::DEFAULT_PORT.to_string(), interactive)?;
        input.ports = prompt::split_list(&port)
            .iter()
            .filter_map(|p| p.parse().ok())
            .collect();
    }
    if input.env_variable_names.is_empty() {
        input.env_variable_names =
            prompt::split_list(&prompt::input_optional("Env variable names (comma-separated):", interactive)?);
    }
    if input.entry_point.is_none() {
        input.entry_point = non_empty(prompt::input_optional("Entry point (optional):", interactive)?);
    }
    if input.start_command.is_none() {
        input.start_command = non_empty(prompt::input_optional("Start command (optional):", interactive)?);
    }
    Ok(())
}

/// Manual stack selection: no source files, just the declared stack.
pub async fn handle_synthesize(args: SynthesizeArgs) -> Result<()> {
    let mut output = args.output.clone();
    let yes = args.yes;
    let mut input = args.into_input();

    let interactive = prompt::is_interactive();
    if input.tech_stack.is_empty() && interactive {
        wizard(&mut input, interactive)?;
        if output.is_none() && prompt::confirm_yes("Save as ./Dockerfile?", interactive)? {
            output = Some(PathBuf::from("Dockerfile"));
        }
    }

    let recipe = recipe::synthesize(&input)?;
    let dockerfile = recipe.render();

    match output {
        Some(path) => {
            common::write_artifact(&path, &dockerfile, yes, interactive)?;
            o_detail!("   {} {}", "Recipe:".bold(), recipe.family.green());
        }
        None => {
            o_result!("{}", dockerfile.trim_end());
        }
    }
    Ok(())
}
