//! Command-line probe for the list endpoints
//!
//! Fetches one page through the list-query client and prints it as JSON.
//!
//! Usage: `cargo run --bin list-probe -- config-center --config-type security --page-size 5`

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use admin_lists::{
    client::{resources, ListItem, ListQuery, QueryClient},
    config::{ClientConfig, QueryConfig},
    models::{ConfigCenterPatch, PageQueryPatch, QueryParams},
};

#[derive(Parser, Debug)]
#[command(name = "list-probe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch one page from an admin list endpoint")]
struct Cli {
    /// Server base URL
    #[arg(long, env = "ADMIN_LISTS_CLIENT_BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECONDS")]
    timeout: u64,

    /// Page to fetch (1-based)
    #[arg(long, default_value = "1", value_name = "NUM")]
    page_index: u32,

    /// Items per page
    #[arg(long, default_value = "10", value_name = "NUM")]
    page_size: u32,

    #[command(subcommand)]
    resource: Resource,
}

#[derive(Subcommand, Debug)]
enum Resource {
    /// Configuration-center entries
    ConfigCenter {
        #[arg(long)]
        config_name: Option<String>,
        #[arg(long)]
        config_type: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        config_key: Option<String>,
    },
    /// Welcome-table rows
    WelcomeTable,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admin_lists=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = QueryClient::http(
        &ClientConfig {
            base_url: cli.base_url.clone(),
            timeout_seconds: cli.timeout,
        },
        &QueryConfig::default(),
    )?;

    match cli.resource {
        Resource::ConfigCenter {
            config_name,
            config_type,
            status,
            config_key,
        } => {
            let patch = ConfigCenterPatch {
                page_index: Some(cli.page_index),
                page_size: Some(cli.page_size),
                config_name,
                config_type,
                status,
                config_key,
            };
            let query: resources::ConfigCenterListQuery =
                client.list_query(resources::config_center_options(patch).enabled(false))?;
            print_page(query).await
        }
        Resource::WelcomeTable => {
            let patch = PageQueryPatch {
                page_index: Some(cli.page_index),
                page_size: Some(cli.page_size),
            };
            let query: resources::WelcomeTableListQuery =
                client.list_query(resources::welcome_table_options(patch).enabled(false))?;
            print_page(query).await
        }
    }
}

/// Fetch the query's current page and print the envelope
async fn print_page<P: QueryParams, T: ListItem>(query: ListQuery<P, T>) -> Result<()> {
    tracing::debug!("Fetching {} from {}", query.key_prefix(), query.api_url());

    let envelope = query.fetch().await;
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    if query.state().is_error() {
        bail!(
            "list request failed with code {}: {}",
            envelope.code,
            envelope.message
        );
    }
    Ok(())
}
