use super::{Plan, RecipeInput, Stage, StartInstruction};

const BINARY: &str = "main";

pub fn build(input: &RecipeInput, _port: u16) -> Plan {
    let go_sum = if input.has_file("go.sum") { "go.sum" } else { "go.sum*" };
    let stages = vec![
        Stage::new(
            "golang:1.22-alpine",
            vec![
                format!("COPY go.mod {} ./", go_sum),
                "RUN go mod download".into(),
                "COPY . .".into(),
                format!("RUN CGO_ENABLED=0 go build -o {} .", BINARY),
            ],
        )
        .named("builder"),
        Stage::new(
            "alpine:3.20",
            vec![
                "RUN apk add --no-cache ca-certificates".into(),
                format!("COPY --from=builder /app/{} .", BINARY),
            ],
        ),
    ];

    Plan {
        stages,
        start: StartInstruction::Exec(vec![format!("./{}", BINARY)]),
    }
}
