use super::{Recipe, StartInstruction};
use crate::scanner::patterns::{DJANGO, FASTAPI, FLASK, GO, JAVA, NEXTJS, NODE, PYTHON, SPRING_BOOT};

/// Render a Dockerfile from a recipe
pub fn render_dockerfile(recipe: &Recipe) -> String {
    let mut out = String::new();
    let last = recipe.stages.len().saturating_sub(1);

    for (i, stage) in recipe.stages.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }

        // FROM line
        if let Some(ref name) = stage.name {
            out.push_str(&format!("FROM {} AS {}\n", stage.base_image, name));
        } else {
            out.push_str(&format!("FROM {}\n", stage.base_image));
        }

        out.push_str(&format!("WORKDIR {}\n", stage.workdir));

        for instr in &stage.instructions {
            out.push_str(&format!("{}\n", instr));
        }

        if i != last {
            continue;
        }

        // Names only; values are supplied at run time.
        if !recipe.env_declarations.is_empty() {
            out.push_str("# Environment variables\n");
            for name in &recipe.env_declarations {
                out.push_str(&format!("ENV {}=\n", name));
            }
        }

        if !recipe.exposed_ports.is_empty() {
            let ports: Vec<String> = recipe.exposed_ports.iter().map(u16::to_string).collect();
            out.push_str(&format!("EXPOSE {}\n", ports.join(" ")));
        }

        out.push_str(&render_cmd(&recipe.start));
    }

    out
}

fn render_cmd(start: &StartInstruction) -> String {
    match start {
        StartInstruction::Exec(args) => {
            let parts: Vec<String> = args.iter().map(|s| quote(s)).collect();
            format!("CMD [{}]\n", parts.join(", "))
        }
        StartInstruction::Shell(cmd) => format!("CMD {}\n", cmd),
    }
}

/// JSON-array element quoting for exec form.
fn quote(arg: &str) -> String {
    format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render a docker-compose.yml for a single service
pub fn render_compose(project_name: &str, recipe: &Recipe) -> String {
    let mut service_name = project_name
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect::<String>();
    if service_name.is_empty() {
        service_name = "app".into();
    }

    let mut out = String::new();
    out.push_str("services:\n");
    out.push_str(&format!("  {}:\n", service_name));
    out.push_str("    build: .\n");
    out.push_str("    ports:\n");
    for port in &recipe.exposed_ports {
        out.push_str(&format!("      - \"{}:{}\"\n", port, port));
    }

    // Passed through from the host environment
    if !recipe.env_declarations.is_empty() {
        out.push_str("    environment:\n");
        for name in &recipe.env_declarations {
            out.push_str(&format!("      - {}\n", name));
        }
    }

    out.push_str("    restart: unless-stopped\n");

    out
}

fn family_ignores(family: &str) -> &'static [&'static str] {
    match family {
        NEXTJS | NODE => &["node_modules", ".next", "dist", "npm-debug.log*"],
        DJANGO | FLASK | FASTAPI | PYTHON => {
            &["__pycache__", "*.pyc", ".venv", "venv", ".pytest_cache", ".mypy_cache"]
        }
        SPRING_BOOT | JAVA => &["target", "build", ".gradle", "*.class"],
        GO => &["vendor", "*.test"],
        _ => &[],
    }
}

/// Render .dockerignore for the recipe's family
pub fn render_dockerignore(recipe: &Recipe) -> String {
    let mut entries: Vec<&str> = family_ignores(&recipe.family).to_vec();
    for e in [".git", ".env*", "*.md", ".vscode", ".idea"] {
        entries.push(e);
    }
    // Always add common entries
    for e in ["Dockerfile", "docker-compose*.yml", ".dockerignore"] {
        if !entries.contains(&e) {
            entries.push(e);
        }
    }
    entries.join("\n") + "\n"
}
