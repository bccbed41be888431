use super::{start_or, Plan, RecipeInput, Stage, StartInstruction};

const NODE_IMAGE: &str = "node:20-alpine";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PackageManager {
    Npm { locked: bool },
    Yarn,
    Pnpm,
}

/// Detect package manager from lockfiles in the project structure
fn detect_package_manager(input: &RecipeInput) -> PackageManager {
    if input.has_file("pnpm-lock.yaml") {
        PackageManager::Pnpm
    } else if input.has_file("yarn.lock") {
        PackageManager::Yarn
    } else {
        PackageManager::Npm {
            locked: input.has_file("package-lock.json"),
        }
    }
}

impl PackageManager {
    fn bin(self) -> &'static str {
        match self {
            PackageManager::Npm { .. } => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// Copy lockfile instruction
    fn lockfile_copy(self) -> &'static str {
        match self {
            PackageManager::Pnpm => "COPY package.json pnpm-lock.yaml* ./",
            PackageManager::Yarn => "COPY package.json yarn.lock* ./",
            PackageManager::Npm { .. } => "COPY package.json package-lock.json* ./",
        }
    }

    fn install(self) -> &'static str {
        match self {
            PackageManager::Pnpm => "RUN corepack enable && pnpm install --frozen-lockfile",
            PackageManager::Yarn => "RUN yarn install --frozen-lockfile",
            PackageManager::Npm { locked: true } => "RUN npm ci",
            PackageManager::Npm { locked: false } => "RUN npm install",
        }
    }
}

// ─── Next.js ──────────────────────────────────────────────────────

pub fn nextjs(input: &RecipeInput, _port: u16) -> Plan {
    let pm = detect_package_manager(input);
    let build = input
        .build_command()
        .map(String::from)
        .unwrap_or_else(|| format!("{} run build", pm.bin()));

    let mut runner = vec!["ENV NODE_ENV=production".to_string()];
    if let PackageManager::Pnpm = pm {
        runner.push("RUN corepack enable".into());
    }
    runner.extend([
        "COPY --from=builder /app/package*.json ./".to_string(),
        "COPY --from=builder /app/node_modules ./node_modules".into(),
        "COPY --from=builder /app/.next ./.next".into(),
    ]);
    if input.has_dir("public") {
        runner.push("COPY --from=builder /app/public ./public".into());
    }

    let stages = vec![
        Stage::new(
            NODE_IMAGE,
            vec![
                pm.lockfile_copy().into(),
                pm.install().into(),
                "COPY . .".into(),
                format!("RUN {}", build),
            ],
        )
        .named("builder"),
        Stage::new(NODE_IMAGE, runner),
    ];

    // `next` is only on PATH through the package manager's script runner.
    Plan {
        stages,
        start: StartInstruction::exec(&[pm.bin(), "start"]),
    }
}

// ─── Generic Node.js ──────────────────────────────────────────────

pub fn generic(input: &RecipeInput, _port: u16) -> Plan {
    let pm = detect_package_manager(input);

    let mut instructions = vec![
        pm.lockfile_copy().to_string(),
        pm.install().to_string(),
        "COPY . .".to_string(),
    ];
    if let Some(build) = input.build_command() {
        instructions.push(format!("RUN {}", build));
    }

    Plan {
        stages: vec![Stage::new(NODE_IMAGE, instructions)],
        start: start_or(input, &["node"], &[pm.bin(), "start"]),
    }
}
