//! Swagger Guard CLI
//!
//! Command-line interface for normalizing Swagger specs and validating payloads.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use swagger_guard::{
    load_spec, load_value, normalize, validate_data, validate_path_params, validate_query_params,
    NormalizedSpec, Verdict,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swagger-guard")]
#[command(about = "Normalize Swagger specs and validate payloads against them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized spec (models and operations) as JSON
    Normalize {
        /// Spec file (JSON, or YAML with a .yaml/.yml extension)
        spec: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List operations with their method, URL and model
    Operations {
        /// Spec file (JSON, or YAML with a .yaml/.yml extension)
        spec: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a payload or URL parameters for an operation
    Validate {
        /// Spec file (JSON, or YAML with a .yaml/.yml extension)
        spec: PathBuf,

        /// Operation id to validate for
        #[arg(long, short)]
        op: String,

        /// JSON payload file (an empty object if omitted)
        payload: Option<PathBuf>,

        /// What the payload is
        #[arg(long, value_enum, default_value_t = Target::Data)]
        kind: Target,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    /// Request body
    Data,
    /// Path parameters
    Path,
    /// Query parameters
    Query,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "swagger_guard=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Normalize {
            spec,
            output,
            pretty,
        } => run_normalize(&spec, output, pretty),
        Commands::Operations { spec, json } => run_operations(&spec, json),
        Commands::Validate {
            spec,
            op,
            payload,
            kind,
            json,
        } => run_validate(&spec, &op, payload.as_deref(), kind, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn load_normalized(path: &Path, json_output: bool) -> Result<NormalizedSpec, u8> {
    let raw = load_spec(path).map_err(|e| {
        report_error(json_output, &format!("loading spec: {}", e));
        e.exit_code() as u8
    })?;

    normalize(&raw).map_err(|e| {
        report_error(json_output, &e.to_string());
        e.exit_code() as u8
    })
}

fn run_normalize(spec_path: &Path, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let spec = load_normalized(spec_path, false)?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&spec)
    } else {
        serde_json::to_string(&spec)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_operations(spec_path: &Path, json_output: bool) -> Result<(), u8> {
    let spec = load_normalized(spec_path, json_output)?;

    if json_output {
        let output = serde_json::to_string_pretty(spec.operations()).map_err(|e| {
            report_error(true, &e.to_string());
            2u8
        })?;
        println!("{}", output);
        return Ok(());
    }

    for (operation_id, operation) in spec.operations() {
        println!(
            "{}\t{}\t{}\t{}",
            operation_id,
            operation.method.as_str().to_uppercase(),
            operation.url,
            operation.model_name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn run_validate(
    spec_path: &Path,
    operation_id: &str,
    payload_path: Option<&Path>,
    kind: Target,
    json_output: bool,
) -> Result<(), u8> {
    let spec = load_normalized(spec_path, json_output)?;

    let payload: Option<Value> = match payload_path {
        Some(path) => Some(load_value(path).map_err(|e| {
            report_error(json_output, &format!("loading payload: {}", e));
            e.exit_code() as u8
        })?),
        None => None,
    };

    let result = match kind {
        Target::Data => validate_data(&spec, operation_id, payload.as_ref()),
        Target::Path => validate_path_params(&spec, operation_id, payload.as_ref()),
        Target::Query => validate_query_params(&spec, operation_id, payload.as_ref()),
    };

    match result {
        Ok(Verdict::Valid) => {
            if json_output {
                println!("{}", json!({ "valid": true }));
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Ok(Verdict::Invalid(report)) => {
            if json_output {
                println!("{}", json!({ "valid": false, "report": report }));
            } else {
                eprintln!("Validation failed:");
                for line in report.to_string().lines() {
                    eprintln!("  {}", line);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
