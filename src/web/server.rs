use anyhow::Result;
use axum_extra::extract::cookie::Key;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::chat::ChatRelay;
use crate::web::routes;

/// Web server configuration
pub struct WebServerConfig {
    pub bind_addr: SocketAddr,
    pub cookie_key: Key,
    pub static_dir: Option<PathBuf>,
}

/// Web server instance
pub struct WebServer {
    config: WebServerConfig,
    relay: Arc<ChatRelay>,
}

impl WebServer {
    /// Create a new web server
    pub fn new(config: WebServerConfig, relay: Arc<ChatRelay>) -> Self {
        Self { config, relay }
    }

    /// Start the web server
    pub async fn start(self) -> Result<()> {
        let app_state = routes::AppState {
            relay: self.relay,
            cookie_key: self.config.cookie_key,
        };

        // Create router
        let mut app = routes::create_router(app_state);

        // Add CORS layer for development
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        app = app.layer(cors);

        // Serve extra static files if a directory is provided
        if let Some(static_dir) = &self.config.static_dir {
            if static_dir.exists() {
                println!("Serving static files from: {}", static_dir.display());
                let serve_dir = ServeDir::new(static_dir);
                app = app.nest_service("/static", serve_dir);
            }
        }

        // Start server
        println!("🌐 Web server starting on http://{}", self.config.bind_addr);
        println!("   Chat endpoint: http://{}/chat", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
