//! Construction stages service - entry point.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use stages::bootstrap;
use stages::config::{ConfigLoader, StagesConfig, DEFAULT_ENV_PREFIX};
use stages::telemetry::init_logging;

/// Configuration file read when `--config` is not given, if present.
const DEFAULT_CONFIG_FILE: &str = "stages.toml";

/// What the process should do once configured.
enum Command {
    Serve,
    Setup,
    GenerateDocs(PathBuf),
}

/// Command-line arguments.
struct Args {
    config: Option<PathBuf>,
    command: Command,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut command = Command::Serve;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = Some(PathBuf::from(required_value(&arg, args.next())));
                }
                "--setup" => command = Command::Setup,
                "--generate-docs" => {
                    command = Command::GenerateDocs(PathBuf::from(required_value(
                        &arg,
                        args.next(),
                    )));
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("stages {}", stages::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config, command }
    }
}

fn required_value(flag: &str, value: Option<String>) -> String {
    value.unwrap_or_else(|| {
        eprintln!("Missing value for {flag}");
        std::process::exit(1);
    })
}

fn print_help() {
    println!(
        r"Construction Stages API server

USAGE:
    stages [OPTIONS]

OPTIONS:
    -c, --config <PATH>          Configuration file (TOML or JSON), default ./stages.toml if present
        --setup                  Create the database schema and exit
        --generate-docs <DIR>    Write swagger.json and api.md into DIR and exit
    -h, --help                   Print help information
    -v, --version                Print version information

ENVIRONMENT VARIABLES:
    STAGES__SERVER__HTTP_ADDR                    Bind address (default: 127.0.0.1:8000)
    STAGES__DATABASE__BACKEND                    memory | sqlite (default: sqlite)
    STAGES__DATABASE__URL                        SQLite URL (default: sqlite://construction_stages.db)
    STAGES__LOGGING__LEVEL                       Log filter (default: info)
    STAGES__LOGGING__FORMAT                      json | pretty (default: json)
    STAGES__STAGES__ALLOW_DELETE_VIA_UPDATE      PATCH status DELETED soft-deletes (default: true)

    Variables may also be placed in a .env file in the working directory.

EXAMPLES:
    stages --setup
    stages --config /etc/stages/stages.toml
    STAGES__DATABASE__BACKEND=memory stages
"
    );
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<StagesConfig> {
    let loader = ConfigLoader::new()
        .with_defaults()
        .with_dotenv()
        .context("failed to read .env")?;

    let loader = match path {
        Some(path) => loader
            .with_file(&path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE)?,
    };

    loader
        .with_env_prefix(DEFAULT_ENV_PREFIX)
        .load()
        .context("invalid configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(args.config)?;
    init_logging(&config.logging.to_log_config()).context("failed to initialize logging")?;

    match args.command {
        Command::Setup => {
            bootstrap::setup(&config.database).await?;
            info!("Setup complete");
        }
        Command::GenerateDocs(dir) => {
            for path in bootstrap::generate_docs(&dir)? {
                println!("{}", path.display());
            }
        }
        Command::Serve => {
            info!(version = stages::VERSION, "Starting construction stages service");
            let server = bootstrap::build_server(&config).await?;
            server.run().await?;
        }
    }

    Ok(())
}
