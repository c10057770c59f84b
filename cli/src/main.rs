use std::fs;
use std::io::{self, Read};

use analysis::{ConfigError, FetchError, Geometry, GeometryError, OverpassClient, OverpassConfig};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read input {path}: {source}")]
    Input { path: String, source: io::Error },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("feature client: {0}")]
    Fetch(#[from] FetchError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "omniview-cli", about = "OmniView selection analysis CLI")]
struct Cli {
    #[arg(long, env = "OMNIVIEW_BASE_URL", default_value = "http://127.0.0.1:5000")]
    base_url: String,

    /// Log pipeline progress at debug level on stderr.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a GeoJSON polygon locally against the Overpass API.
    Analyze {
        #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
        input: String,
    },
    /// Show the service's active selection and run phase.
    Status,
    /// Submit a GeoJSON polygon to the service as the new selection.
    Submit {
        #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
        input: String,
        /// Mark the selection as an edit of the previous one.
        #[arg(long, default_value_t = false)]
        edited: bool,
    },
    /// Print the latest published analysis.
    Result,
    /// Clear the service's selection.
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Analyze { input } => run_analyze(&input).await,
        Command::Status => {
            let json = api_request(&cli.base_url, reqwest::Method::GET, "/api/status", None).await?;
            print_json(&json)
        }
        Command::Submit { input, edited } => {
            let body = read_input(&input)?;
            let path = submit_path(edited);
            let json = api_request(&cli.base_url, reqwest::Method::POST, &path, Some(body)).await?;
            print_json(&json)
        }
        Command::Result => {
            let json = api_request(&cli.base_url, reqwest::Method::GET, "/api/selection", None).await?;
            print_json(&json)
        }
        Command::Clear => {
            api_request(&cli.base_url, reqwest::Method::DELETE, "/api/selection", None).await?;
            println!("cleared");
            Ok(())
        }
    }
}

async fn run_analyze(input: &str) -> Result<(), CliError> {
    let raw = read_input(input)?;
    let geometry = Geometry::from_geojson_str(&raw)?;

    let config = OverpassConfig::from_env()?;
    let client = OverpassClient::new(&config)?;
    tracing::debug!(url = client.url(), "querying Overpass");

    let report = analysis::analyze(&client, &geometry).await;
    print_json(&serde_json::to_value(&report)?)
}

fn read_input(input: &str) -> Result<String, CliError> {
    let input_error = |source| CliError::Input { path: input.to_owned(), source };
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(input_error)?;
        return Ok(buf);
    }
    fs::read_to_string(input).map_err(input_error)
}

fn submit_path(edited: bool) -> String {
    let origin = if edited { "edited" } else { "drawn" };
    format!("/api/selection?origin={origin}")
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

async fn api_request(
    base_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<String>,
) -> Result<Value, CliError> {
    let client = reqwest::Client::new();
    let request = client.request(method, endpoint(base_url, path));
    let request = if let Some(raw) = body {
        request
            .header(reqwest::header::CONTENT_TYPE, "application/geo+json")
            .body(raw)
    } else {
        request
    };

    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;
    decode_body(status, &bytes)
}

/// Success bodies must be JSON; `204` and empty bodies read as `null`.
/// Error bodies are best effort, since proxies answer with HTML.
fn decode_body(status: reqwest::StatusCode, bytes: &[u8]) -> Result<Value, CliError> {
    if status == reqwest::StatusCode::NO_CONTENT || bytes.is_empty() {
        if status.is_success() {
            return Ok(Value::Null);
        }
        return Err(CliError::ServerError { status: status.as_u16(), message: server_message(&Value::Null) });
    }

    if status.is_success() {
        return Ok(serde_json::from_slice(bytes)?);
    }

    let value = serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()));
    Err(CliError::ServerError { status: status.as_u16(), message: server_message(&value) })
}

/// Prefer the `message` field of an error body, else the raw JSON.
fn server_message(value: &Value) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .map_or_else(|| value.to_string(), ToOwned::to_owned)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
