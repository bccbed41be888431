use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[macro_use]
mod output;

mod api;
mod commands;
mod config;
mod error;
mod prompt;
mod recipe;
mod scanner;
mod settings;
mod sources;
mod store;
mod types;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Only print results and errors
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Print scan diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the tech stack of a directory or GitHub repository
    Detect {
        /// Directory, owner/repo, github:owner/repo or a github.com URL
        source: String,
        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect and write a Dockerfile for a project
    Generate {
        source: String,
        /// Dockerfile path
        #[arg(short, long, default_value = "Dockerfile")]
        output: PathBuf,
        /// Use these labels instead of the detected stack
        #[arg(long = "stack")]
        stack: Vec<String>,
        /// Also write .dockerignore next to the Dockerfile
        #[arg(long)]
        dockerignore: bool,
        /// Also write docker-compose.yml next to the Dockerfile
        #[arg(long)]
        compose: bool,
        /// Overwrite existing files without asking
        #[arg(short, long)]
        yes: bool,
        /// Record the submission under this owner
        #[arg(long)]
        owner: Option<String>,
    },

    /// Build a Dockerfile from a hand-picked stack (prompts when --stack is omitted)
    Synthesize {
        #[arg(long = "stack")]
        stack: Vec<String>,
        /// Environment variable name (repeatable)
        #[arg(long = "env")]
        env: Vec<String>,
        /// Dependency name (repeatable)
        #[arg(long = "dep")]
        dep: Vec<String>,
        /// Port to expose (repeatable)
        #[arg(long = "port")]
        port: Vec<u16>,
        #[arg(long)]
        entry: Option<String>,
        #[arg(long)]
        build_cmd: Option<String>,
        #[arg(long)]
        start_cmd: Option<String>,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the HTTP API
    Serve {
        /// Listen port (default: server.port from stackprobe.toml, else 8377)
        #[arg(long)]
        port: Option<u16>,
        /// Bearer token required on every route except /health
        #[arg(long)]
        token: Option<String>,
        /// Settings file (default: ./stackprobe.toml when present)
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// List recorded submissions
    History {
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Manage stored credentials and defaults
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Print the version
    Version,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Store a GitHub token for remote sources
    SetToken { token: String },
    /// Default owner for recorded submissions
    SetOwner { owner: String },
    /// Show the stored configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    output::init(output::Verbosity::from_flags(cli.quiet, cli.verbose));

    // A missing .env is fine; GITHUB_TOKEN may come from it.
    let _ = dotenvy::dotenv();

    let result = match cli.command {
        Commands::Detect { source, json } => commands::detect::handle_detect(source, json).await,

        Commands::Generate { source, output, stack, dockerignore, compose, yes, owner } =>
            commands::generate::handle_generate(commands::generate::GenerateArgs {
                source,
                output,
                stack,
                dockerignore,
                compose,
                yes,
                owner,
            }).await,

        Commands::Synthesize { stack, env, dep, port, entry, build_cmd, start_cmd, output, yes } =>
            commands::synthesize::handle_synthesize(commands::synthesize::SynthesizeArgs {
                stack,
                env,
                dep,
                port,
                entry,
                build_cmd,
                start_cmd,
                output,
                yes,
            }).await,

        Commands::Serve { port, token, settings } =>
            commands::serve::handle_serve(port, token, settings).await,

        Commands::History { owner, json } => commands::history::handle_history(owner, json).await,

        Commands::Config(cmd) => match cmd {
            ConfigCommands::SetToken { token } => commands::config::handle_set_token(token).await,
            ConfigCommands::SetOwner { owner } => commands::config::handle_set_owner(owner).await,
            ConfigCommands::Show => commands::config::handle_show().await,
        },

        Commands::Version => {
            o_result!("stackprobe version: {}", env!("CARGO_PKG_VERSION").cyan());
            Ok(())
        }
    };

    if let Err(e) = result {
        o_error!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
