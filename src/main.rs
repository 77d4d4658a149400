use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use report_salvage::{
    RecoveryParser, RecoveryResult, ReportValidator, SalvageConfig, ValidationOutcome,
};

/// Report-Salvage CLI: recover structured life reports from raw LLM output
#[derive(Parser, Debug)]
#[command(name = "report-salvage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recover a report from raw generation output
    #[command(name = "parse")]
    Parse {
        #[command(flatten)]
        args: ParseArgs,
    },

    /// Check an already well-formed report against the expected shape
    #[command(name = "validate")]
    Validate {
        /// Report JSON file (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
struct ParseArgs {
    /// Raw generation output file (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Also validate the recovered report shape
    #[arg(long)]
    validate: bool,

    /// Pretty-print the JSON result
    #[arg(short, long)]
    pretty: bool,
}

/// Parse output: the recovery result plus an optional validation block
#[derive(Serialize)]
struct ParseOutput<'a> {
    #[serde(flatten)]
    result: &'a RecoveryResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<ValidationOutcome>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().or_else(SalvageConfig::default_path);
    let config = SalvageConfig::load_or_default(config_path.as_deref())?;
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Some(Command::Parse { args }) => handle_parse_command(args, config),
        Some(Command::Validate { input }) => handle_validate_command(input.as_deref(), config),
        None => {
            // Default behavior: show help
            eprintln!("No command specified. Use --help for usage information.");
            eprintln!("Example: report-salvage parse --input generation.txt --validate");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    // Logs go to stderr so stdout carries only the JSON result
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Read input from a file, or stdin when no path is given
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => {
            std::fs::read_to_string(p).with_context(|| format!("Failed to read: {:?}", p))
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn handle_parse_command(args: ParseArgs, config: SalvageConfig) -> Result<()> {
    let raw = read_input(args.input.as_deref())?;
    info!("Recovering report from {} bytes of input", raw.len());

    let parser = RecoveryParser::new(config.recovery);
    let result = match parser.parse(&raw) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let validation = args
        .validate
        .then(|| ReportValidator::new(config.validation).validate(&result.data));

    let output = ParseOutput {
        result: &result,
        validation,
    };
    print_json(&output, args.pretty)?;

    if let Some(warning) = &result.warning_message {
        eprintln!("\n⚠️  {}", warning);
    }

    Ok(())
}

fn handle_validate_command(input: Option<&Path>, config: SalvageConfig) -> Result<()> {
    let raw = read_input(input)?;
    let report: serde_json::Value = serde_json::from_str(&raw)
        .context("Input is not valid JSON; use `parse` to recover truncated output")?;

    let outcome = ReportValidator::new(config.validation).validate(&report);
    print_json(&outcome, true)?;

    if !outcome.valid {
        eprintln!("\n{}", outcome.describe());
        std::process::exit(1);
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}
