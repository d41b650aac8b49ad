use clap::Parser;
use std::path::PathBuf;

use crate::chat::DEFAULT_HISTORY_LIMIT;

/// CLI arguments for nerdchat
#[derive(Parser, Debug)]
#[command(name = "nerdchat")]
#[command(about = "NerdChat - relays a web chat client to the Gemini API with per-session history")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Host address to bind the web server to
    #[arg(long, value_name = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the web server
    #[arg(long, value_name = "PORT", env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Path to the SQLite history database
    #[arg(
        long,
        value_name = "PATH",
        env = "DATABASE_PATH",
        default_value = "chat_history.db"
    )]
    pub database: PathBuf,

    /// Maximum number of stored turns supplied to the model as context
    #[arg(
        long,
        value_name = "N",
        env = "HISTORY_LIMIT",
        default_value_t = DEFAULT_HISTORY_LIMIT
    )]
    pub history_limit: usize,

    /// Directory of extra static assets to serve under /static
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,
}
