use super::{Plan, RecipeInput, Stage, StartInstruction};

pub const FAMILY: &str = "Generic";

/// Minimal image for stacks no family recognises.
pub fn build(input: &RecipeInput, _port: u16) -> Plan {
    let mut instructions = vec!["COPY . .".to_string()];

    let start = if let Some(cmd) = input.start_command() {
        StartInstruction::Shell(cmd.to_string())
    } else if let Some(entry) = input.entry_point() {
        if entry.ends_with(".sh") {
            instructions.push(format!("RUN chmod +x {}", entry));
            StartInstruction::Exec(vec![format!("./{}", entry)])
        } else {
            StartInstruction::Exec(vec!["sh".into(), entry.to_string()])
        }
    } else {
        StartInstruction::exec(&["echo", "No entry point specified"])
    };

    Plan {
        stages: vec![Stage::new("alpine:3.20", instructions)],
        start,
    }
}
