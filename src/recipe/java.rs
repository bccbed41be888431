use super::{Plan, RecipeInput, Stage, StartInstruction};

const JDK_IMAGE: &str = "eclipse-temurin:17-jdk";
const JRE_IMAGE: &str = "eclipse-temurin:17-jre";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildTool {
    Maven,
    Gradle,
}

impl BuildTool {
    /// Gradle only when the project ships a Gradle build; Maven otherwise.
    fn detect(input: &RecipeInput) -> Self {
        if input.has_file("build.gradle") || input.has_file("build.gradle.kts") {
            BuildTool::Gradle
        } else {
            BuildTool::Maven
        }
    }

    fn package(self, spring: bool) -> &'static str {
        match (self, spring) {
            (BuildTool::Maven, _) => "RUN ./mvnw package -DskipTests",
            (BuildTool::Gradle, true) => "RUN ./gradlew bootJar -x test",
            (BuildTool::Gradle, false) => "RUN ./gradlew build -x test",
        }
    }

    fn jar_glob(self) -> &'static str {
        match self {
            BuildTool::Maven => "target/*.jar",
            BuildTool::Gradle => "build/libs/*.jar",
        }
    }
}

fn run_jar() -> StartInstruction {
    StartInstruction::exec(&["java", "-jar", "app.jar"])
}

// ─── Spring Boot ──────────────────────────────────────────────────

pub fn spring_boot(input: &RecipeInput, _port: u16) -> Plan {
    let tool = BuildTool::detect(input);
    let stages = vec![
        Stage::new(JDK_IMAGE, vec!["COPY . .".into(), tool.package(true).into()]).named("builder"),
        Stage::new(
            JRE_IMAGE,
            vec![format!("COPY --from=builder /app/{} app.jar", tool.jar_glob())],
        ),
    ];
    Plan {
        stages,
        start: run_jar(),
    }
}

// ─── Generic Java ─────────────────────────────────────────────────

pub fn generic(input: &RecipeInput, _port: u16) -> Plan {
    let tool = BuildTool::detect(input);
    let instructions = vec![
        "COPY . .".to_string(),
        tool.package(false).to_string(),
        format!("RUN cp {} app.jar", tool.jar_glob()),
    ];
    Plan {
        stages: vec![Stage::new(JDK_IMAGE, instructions)],
        start: run_jar(),
    }
}
