//! Operator CLI for the BCC provider
//!
//! Prints schemas, reads data sources and imports resources against a live
//! endpoint. Results go to stdout as JSON, logs go to stderr.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use bcc_provider::config::{ENDPOINT_ENV, TOKEN_ENV};
use bcc_provider::state::{decode_dynamic_value, int_value, make_state, DynamicValue};
use bcc_provider::{BccProvider, StateResponse};

#[derive(Parser)]
#[command(name = "bcc-provider")]
#[command(author, version, about = "BCC provider operator tool", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// API endpoint
    #[arg(long, env = ENDPOINT_ENV, global = true)]
    endpoint: Option<String>,

    /// API token
    #[arg(long, env = TOKEN_ENV, hide_env_values = true, global = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    timeout: u64,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the provider schema
    Schema {
        /// Only print the schema of this resource or data source
        #[arg(long = "type")]
        type_name: Option<String>,
    },

    /// Read a data source
    Data {
        /// Data source type, e.g. bcc_vdc
        type_name: String,

        /// Configuration attribute (key=value, value may be JSON)
        #[arg(long = "set", value_parser = parse_attr)]
        attrs: Vec<(String, DynamicValue)>,
    },

    /// Import an existing resource by id
    Import {
        /// Resource type, e.g. bcc_disk
        type_name: String,

        id: String,
    },
}

fn parse_attr(s: &str) -> std::result::Result<(String, DynamicValue), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let value = decode_dynamic_value(raw.as_bytes()).unwrap_or_else(|_| DynamicValue::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Schema { type_name } => {
            let schema = BccProvider::schema();
            let output = match type_name {
                None => serde_json::to_string_pretty(&schema)?,
                Some(name) => {
                    let found = schema
                        .resource_schemas
                        .get(&name)
                        .or_else(|| schema.data_source_schemas.get(&name))
                        .with_context(|| format!("unknown type '{}'", name))?;
                    serde_json::to_string_pretty(found)?
                }
            };
            println!("{}", output);
        }

        Commands::Data { type_name, attrs } => {
            let provider = connect(cli.endpoint, cli.token, cli.timeout)?;
            let config = make_state(attrs.iter().map(|(k, v)| (k.as_str(), v.clone())).collect());
            let response = provider.read_data_source(&type_name, config).await;
            emit(response)?;
        }

        Commands::Import { type_name, id } => {
            let provider = connect(cli.endpoint, cli.token, cli.timeout)?;
            let response = provider.import_resource_state(&type_name, &id).await;
            emit(response)?;
        }
    }

    Ok(())
}

/// Configure the provider the same way a provider block would
fn connect(endpoint: Option<String>, token: Option<String>, timeout: u64) -> Result<BccProvider> {
    let block = make_state(vec![
        ("api_endpoint", endpoint.into()),
        ("token", token.into()),
        ("request_timeout_secs", int_value(timeout as i64)),
    ]);
    BccProvider::configure(&block).map_err(|d| anyhow!("{}: {}", d.summary, d.detail))
}

fn emit(response: StateResponse) -> Result<()> {
    let failed = response.has_errors();
    println!("{}", serde_json::to_string_pretty(&response)?);
    if failed {
        bail!("request finished with errors");
    }
    Ok(())
}
