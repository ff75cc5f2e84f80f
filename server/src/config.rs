use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Command-line and environment configuration for the server binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "todo-server")]
#[command(about = "Serve a to-do list as MCP tools and a REST API")]
#[command(version)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "TODO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Public URL the widget loads its assets from and calls back to.
    /// Without it the widget shell uses relative paths.
    #[arg(long, env = "TODO_BASE_URL")]
    pub base_url: Option<String>,

    /// Log output format
    #[arg(long, env = "TODO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
