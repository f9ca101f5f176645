// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, StaticFilesConfig,
    UpstreamConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for environment overrides, e.g. `RELAY_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "RELAY";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; environment variables override it and code
    /// defaults fill in everything else.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "polyfun-relay")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("static_files.root", ".")?
            .set_default("static_files.index_files", vec!["index.html"])?
            .set_default("upstream.trade_url", "https://pumpportal.fun/api/trade-local")?
            .set_default("upstream.trade_origin", "https://pumpportal.fun")?
            .set_default("upstream.trade_referer", "https://pumpportal.fun/")?
            .set_default("upstream.ipfs_url", "https://pump.fun/api/ipfs")?
            .set_default("upstream.ipfs_origin", "https://pump.fun")?
            .set_default("upstream.ipfs_referer", "https://pump.fun/create")?
            .set_default("upstream.user_agent", DEFAULT_USER_AGENT)?
            .set_default("upstream.accept_language", "en-US,en;q=0.9")?
            .set_default("upstream.timeout_secs", 30)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
