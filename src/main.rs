//! xG serving entry point.
//!
//! ## CLI Subcommands
//!
//! - `xg-serving` or `xg-serving serve` - Run the HTTP server (default)
//! - `xg-serving config show|defaults|validate` - Inspect configuration
//! - `xg-serving version` - Print version

use std::process::ExitCode;

use xg_serving::cli;
use xg_serving::config::{self, ServiceConfig};
use xg_serving::server;
use xg_serving::telemetry::init_logging;
use xg_serving::Service;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("serve");

    match command {
        "serve" | "" => {
            let config = config::load();
            if let Err(e) = init_logging(&config.log) {
                eprintln!("Logging setup failed: {}", e);
                return ExitCode::FAILURE;
            }
            match run_server(config) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Server error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    cli::run_show();
                    ExitCode::SUCCESS
                }
                "defaults" => {
                    cli::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => {
                    let code = cli::run_validate();
                    ExitCode::from(code as u8)
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = args.get(2) {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("xg-serving {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "xg-serving - Expected-goals model server v{}

USAGE:
    xg-serving [COMMAND]

COMMANDS:
    serve        Run the HTTP server (default when no command given)
    config       Inspect configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

ENVIRONMENT:
    XG_SERVING_BIND_ADDR       HTTP listen address (default: 0.0.0.0:5000)
    XG_SERVING_REGISTRY_ROOT   Artifact registry directory (default: registry)
    XG_SERVING_DEFAULT_MODEL   Model loaded at startup (default: logreg_distance)
    XG_SERVING_LOG_LEVEL       Log filter (debug, info, warn, error)

    Run 'xg-serving config defaults' for the full list.

EXIT CODES:
    0  Success
    1  Failure / configuration warnings
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "serve" => {
            eprintln!(
                "xg-serving serve - Run the HTTP server

USAGE:
    xg-serving serve

DESCRIPTION:
    Loads the configured default model from the registry (best effort;
    the server starts with no model if that fails) and serves:

    POST /predict                  Goal probabilities for a feature table
    POST /download_registry_model  Swap the active model
    GET  /logs                     Contents of the service log file
    GET  /model                    Active model and its feature schema
    GET  /health                   Liveness and swap state
"
            );
        }
        "config" => {
            eprintln!(
                "xg-serving config - Inspect configuration

USAGE:
    xg-serving config <SUBCOMMAND>

SUBCOMMANDS:
    show           Show effective configuration
    defaults       Show default configuration
    validate       Check configuration (exit 1 on warnings)
"
            );
        }
        _ => {
            eprintln!(
                "No detailed help available for '{}'. Use 'xg-serving help' for general usage.",
                command
            );
        }
    }
}

fn run_server(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let bind_addr = config.bind_addr;
        let service = Service::start(config).await;

        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        server::serve(listener, service.router()).await?;
        tracing::info!("shutdown complete");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
