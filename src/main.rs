use crate::config::Config;
use crate::server::{create_server, run_server, ServerState};
use clap::Parser;
use tracing::info;

pub mod agentic;
pub mod config;
pub mod elastic;
pub mod handlers;
pub mod llm;
pub mod personas;
pub mod prompts;
pub mod query;
pub mod review;
pub mod search;
pub mod server;
pub mod utils;

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("review_search_server=info".parse()?),
        )
        .init();

    let config = Config::parse();
    let state = ServerState::from_config(&config)?;

    info!("starting review search backend");
    info!(elasticsearch = %config.elasticsearch_url, review_index = %config.review_index, "search engine");
    info!(model = %state.llm.model(), "completion service");
    info!(default_username = %config.default_username, "personalized summaries");
    info!(address = %config.address, port = config.port, "binding");
    for (method, path) in [
        ("GET", "/"),
        ("GET", "/cluster-health"),
        ("POST", "/search-reviews"),
        ("POST", "/keyword-search"),
        ("POST", "/semantic-search"),
        ("POST", "/agentic-summary"),
    ] {
        info!("  {method:<5}{path}");
    }

    let figment = rocket::Config::figment()
        .merge(("address", config.address))
        .merge(("port", config.port));

    run_server(create_server(state).configure(figment)).await?;
    Ok(())
}
