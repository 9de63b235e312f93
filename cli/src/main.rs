mod demo;

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use schema_synth_core::{OpenApiDocument, SchemaConfig, validate_document};
use tracing::{debug, info};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "schema-synth")]
#[command(about = "Derive OpenAPI component schemas from type descriptions")]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the demo API description.
    Generate(GenerateArgs),
    /// List the component schemas registered for the demo API.
    List(ConfigArgs),
    /// Validate the demo API description and exit non-zero on findings.
    Check(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.verbose) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::List(args) => run_list(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) -> Result<(), String> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SCHEMA_SYNTH_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("Failed to initialize tracing subscriber: {err}"))
}

fn load_config(args: &ConfigArgs) -> Result<SchemaConfig, String> {
    match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration");
            SchemaConfig::load(path)
                .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))
        }
        None => Ok(SchemaConfig::default()),
    }
}

fn build_document(args: &ConfigArgs) -> Result<OpenApiDocument, String> {
    let config = load_config(args)?;
    demo::build(config).map_err(|err| format!("Failed to build API description: {err}"))
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let document = build_document(&args.config)?;

    let raw = match args.format {
        CliOutputFormat::Json => document.to_json(),
        CliOutputFormat::Yaml => document.to_yaml(),
    }
    .map_err(|err| format!("Failed to serialize API description: {err}"))?;

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|err| {
                        format!(
                            "Failed to create output directory '{}': {err}",
                            parent.display()
                        )
                    })?;
                }
            }
            fs::write(&path, raw)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            info!(path = %path.display(), "Wrote API description");
            println!(
                "Wrote {} schema(s) to '{}'.",
                document.components.schemas.len(),
                path.display()
            );
        }
        None => println!("{raw}"),
    }

    Ok(())
}

fn run_list(args: ConfigArgs) -> Result<(), String> {
    let document = build_document(&args)?;
    for name in document.components.schemas.names() {
        println!("{name}");
    }
    Ok(())
}

fn run_check(args: ConfigArgs) -> Result<(), String> {
    let document = build_document(&args)?;
    let errors = validate_document(&document);
    if errors.is_empty() {
        println!(
            "Validated {} schema(s) across {} path(s).",
            document.components.schemas.len(),
            document.paths.len()
        );
        return Ok(());
    }

    for err in &errors {
        eprintln!("  {err}");
    }
    Err(format!("{} validation finding(s)", errors.len()))
}
