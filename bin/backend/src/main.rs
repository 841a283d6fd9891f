use anyhow::Result;
// Environment variables
static BACKEND_HOST: std::sync::LazyLock<String> =
    std::sync::LazyLock::new(|| std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()));
static BACKEND_PORT: std::sync::LazyLock<String> =
    std::sync::LazyLock::new(|| std::env::var("BACKEND_PORT").unwrap_or_else(|_| "8000".to_string()));

use axum::{
    routing::{delete, get, post},
    Router,
};
use clap::Parser;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    endpoints::{
        blockchain_info, chat_endpoint, contract_template, convert_units, delete_session, gas_fees,
        health, root, validate_address,
    },
    manager::SessionManager,
    session::ChatBackend,
};
use buddy_agent::ChatApp;

pub(crate) mod endpoints;
pub(crate) mod manager;
pub(crate) mod session;
#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "backend")]
#[command(about = "Web backend for the BlockchainBuddy assistant")]
struct Cli {
    /// Anthropic model to run the assistant on
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let chat_app = ChatApp::new(cli.model.as_deref()).map_err(|e| anyhow::anyhow!("{e}"))?;
    let chat_backend: Arc<dyn ChatBackend> = Arc::new(chat_app);
    let session_manager = Arc::new(SessionManager::new(chat_backend));

    // Start automatic session cleanup
    Arc::clone(&session_manager).start_cleanup_task();

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", post(chat_endpoint))
        .route("/session/:session_id", delete(delete_session))
        .route("/tools/blockchain/:chain_name", get(blockchain_info))
        .route("/tools/validate-address", get(validate_address))
        .route("/tools/gas-fees/:chain", get(gas_fees))
        .route("/tools/contract-template/:contract_type", get(contract_template))
        .route("/tools/convert", get(convert_units))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(session_manager);

    let host = &*BACKEND_HOST;
    let port = &*BACKEND_PORT;
    let bind_addr = format!("{}:{}", host, port);

    println!("🚀 BlockchainBuddy backend starting on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
