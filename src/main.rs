//! Command-line front end: validate or send a JSON body to a configured
//! endpoint.

use std::error::Error;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use aistudio_requests::client::{Endpoint, EndpointClient, SendOutcome};
use aistudio_requests::config::{load_config, ClientConfig};
use aistudio_requests::dispatch::{DispatchOutcome, EndpointDispatcher};
use aistudio_requests::observability::{logging, metrics, telemetry};
use aistudio_requests::request::{RequestBody, ValidationResult};

#[derive(Parser)]
#[command(name = "aistudio-requests")]
#[command(about = "Validate and send requests to hosted model endpoints", long_about = None)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long, default_value = "aistudio.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured endpoints and their fields
    Endpoints,
    /// Check a body against an endpoint's declared fields
    Validate {
        #[arg(short, long)]
        endpoint: String,
        /// JSON body file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        body: PathBuf,
    },
    /// Validate a body and POST it to the endpoint
    Send {
        #[arg(short, long)]
        endpoint: String,
        /// JSON body file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        body: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability)?;

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let endpoints = config.resolve_endpoints()?;
    tracing::debug!(endpoints = endpoints.len(), "Endpoints resolved");

    match cli.command {
        Commands::Endpoints => {
            print_endpoints(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { endpoint, body } => {
            let client = build_client(&config, endpoints, &endpoint)?;
            match client.validate(read_body(&body)?) {
                ValidationResult::Valid(_) => {
                    println!("{}", serde_json::to_string_pretty(&json!({"valid": true}))?);
                    Ok(ExitCode::SUCCESS)
                }
                ValidationResult::Invalid(errors) => {
                    let report = json!({"valid": false, "errors": errors});
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Send { endpoint, body } => {
            let client = build_client(&config, endpoints, &endpoint)?;
            let outcome = client.send(read_body(&body)?).await;
            print_outcome(&outcome)?;
            Ok(if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn build_client(
    config: &ClientConfig,
    endpoints: Vec<Endpoint>,
    name: &str,
) -> Result<EndpointClient, Box<dyn Error>> {
    let mut sink = telemetry::FanoutSink::new().with(Arc::new(telemetry::TracingSink));
    if config.observability.metrics_enabled {
        sink = sink.with(Arc::new(telemetry::MetricsSink));
    }

    let dispatcher = EndpointDispatcher::new(&config.dispatch, Arc::new(sink))?;
    Ok(EndpointClient::from_resolved(config, endpoints, name, dispatcher)?)
}

fn read_body(path: &Path) -> Result<RequestBody, Box<dyn Error>> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)?
    };

    let value: Value = serde_json::from_str(&text)?;
    Ok(RequestBody::from_value(value)?)
}

fn print_endpoints(config: &ClientConfig) -> Result<(), Box<dyn Error>> {
    let endpoints: Vec<Value> = config
        .endpoints
        .iter()
        .map(|e| {
            json!({
                "name": e.name,
                "url": e.url,
                "auth_scheme": e.auth_scheme,
                "fields": e.fields,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&endpoints)?);
    Ok(())
}

fn print_outcome(outcome: &SendOutcome) -> Result<(), Box<dyn Error>> {
    let report = match outcome {
        SendOutcome::Rejected(errors) => json!({"sent": false, "errors": errors}),
        SendOutcome::Dispatched(DispatchOutcome::Success {
            payload,
            status,
            latency,
        }) => json!({
            "sent": true,
            "status": status,
            "latency_ms": latency.as_millis() as u64,
            "response": payload,
        }),
        SendOutcome::Dispatched(DispatchOutcome::Failure(err)) => json!({
            "sent": true,
            "outcome": err.tag(),
            "status": err.status(),
            "retryable": err.is_retryable(),
            "error": err.to_string(),
        }),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
