use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::net::SocketAddr;
use std::sync::Arc;

use nerdchat::api::GeminiClient;
use nerdchat::chat::ChatRelay;
use nerdchat::cli::Cli;
use nerdchat::config::AppConfig;
use nerdchat::store::HistoryStore;
use nerdchat::web::server::{WebServer, WebServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let store = HistoryStore::open(&cli.database).with_context(|| {
        format!(
            "failed to open history database at {}",
            cli.database.display()
        )
    })?;
    println!(
        "{} History database: {}",
        "💾".blue(),
        cli.database.display()
    );

    let model = Arc::new(GeminiClient::new(
        config.api_key.clone(),
        config.model.clone(),
        config.api_url.clone(),
        config.system_prompt.clone(),
    ));
    println!("{} Using model: {}", "🤖".blue(), config.model);
    if config.system_prompt.is_some() {
        println!("{} System prompt configured", "📝".blue());
    }

    let relay = Arc::new(ChatRelay::new(store, model, cli.history_limit));

    let bind_addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cli.host, cli.port))?;

    let server = WebServer::new(
        WebServerConfig {
            bind_addr,
            cookie_key: config.cookie_key(),
            static_dir: cli.static_dir.clone(),
        },
        relay,
    );

    server.start().await
}
