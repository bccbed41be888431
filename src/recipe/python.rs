use super::{start_or, Plan, RecipeInput, Stage, StartInstruction};

const PYTHON_IMAGE: &str = "python:3.12-slim";

/// Dependency install, Pipfile-based when pipenv is among the dependencies
fn install_instructions(input: &RecipeInput) -> Vec<String> {
    if input.has_dep("pipenv") {
        vec![
            "COPY Pipfile Pipfile.lock* ./".into(),
            "RUN pip install --no-cache-dir pipenv && pipenv install --system --deploy".into(),
        ]
    } else {
        vec![
            "COPY requirements.txt ./".into(),
            "RUN pip install --no-cache-dir -r requirements.txt".into(),
        ]
    }
}

/// "src/app.py" → "src.app:app"; WSGI/ASGI servers take module paths.
fn app_module(input: &RecipeInput, default: &str) -> String {
    input
        .entry_point()
        .and_then(|e| e.strip_suffix(".py"))
        .map(|m| format!("{}:app", m.replace(|c: char| c == '/' || c == '\\', ".")))
        .unwrap_or_else(|| default.to_string())
}

fn base_stage(input: &RecipeInput, server: Option<&str>) -> Stage {
    let mut instructions = install_instructions(input);
    if let Some(server) = server {
        if !input.has_dep(server) {
            instructions.push(format!("RUN pip install --no-cache-dir {}", server));
        }
    }
    instructions.push("COPY . .".into());
    Stage::new(PYTHON_IMAGE, instructions)
}

// ─── Django ───────────────────────────────────────────────────────

pub fn django(input: &RecipeInput, port: u16) -> Plan {
    let start = match input.start_command() {
        Some(cmd) => StartInstruction::Shell(cmd.to_string()),
        None => StartInstruction::Exec(vec![
            "python".into(),
            "manage.py".into(),
            "runserver".into(),
            format!("0.0.0.0:{}", port),
        ]),
    };
    Plan {
        stages: vec![base_stage(input, None)],
        start,
    }
}

// ─── Flask ────────────────────────────────────────────────────────

pub fn flask(input: &RecipeInput, port: u16) -> Plan {
    let start = match input.start_command() {
        Some(cmd) => StartInstruction::Shell(cmd.to_string()),
        None => StartInstruction::Exec(vec![
            "gunicorn".into(),
            app_module(input, "app:app"),
            "--bind".into(),
            format!("0.0.0.0:{}", port),
        ]),
    };
    Plan {
        stages: vec![base_stage(input, Some("gunicorn"))],
        start,
    }
}

// ─── FastAPI ──────────────────────────────────────────────────────

pub fn fastapi(input: &RecipeInput, port: u16) -> Plan {
    let start = match input.start_command() {
        Some(cmd) => StartInstruction::Shell(cmd.to_string()),
        None => StartInstruction::Exec(vec![
            "uvicorn".into(),
            app_module(input, "main:app"),
            "--host".into(),
            "0.0.0.0".into(),
            "--port".into(),
            port.to_string(),
        ]),
    };
    Plan {
        stages: vec![base_stage(input, Some("uvicorn"))],
        start,
    }
}

// ─── Generic Python ───────────────────────────────────────────────

pub fn generic(input: &RecipeInput, _port: u16) -> Plan {
    Plan {
        stages: vec![base_stage(input, None)],
        start: start_or(input, &["python"], &["python", "app.py"]),
    }
}
