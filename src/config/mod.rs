// Configuration module entry point
// Loads application configuration and holds shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DatabaseBackend, DatabaseConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig, StaticFilesConfig,
};

/// Environment variable holding the PostgreSQL connection string
pub const DATABASE_URL_ENV: &str = "POSTGRESQL_URL";

/// Environment variable overriding the config file path
pub const CONFIG_PATH_ENV: &str = "TODOS_CONFIG";

impl Config {
    /// Load configuration from `$TODOS_CONFIG` or "config" (extension optional)
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config".to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("TODOS")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("http.server_name", "todos-server")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("static_files.dir", "public")?
            .set_default("static_files.index_files", vec!["index.html", "index.htm"])?
            .set_default("database.backend", "postgres")?
            .set_default("database.max_connections", 4)?
            .set_default("database.min_connections", 0)?
            .set_default("database.connect_timeout", 5)?
            .set_default("database.max_lifetime", 3600)?
            .set_default("database.idle_timeout", 1800)?
            .set_default("database.seed_sample", false)?
            .set_override_option("database.url", std::env::var(DATABASE_URL_ENV).ok())?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.max_connections, 4);
        assert_eq!(cfg.database.min_connections, 0);
        assert_eq!(cfg.database.max_lifetime, 3600);
        assert_eq!(cfg.database.idle_timeout, 1800);
        assert_eq!(cfg.static_files.dir, "public");
        assert_eq!(cfg.static_files.index_files, vec!["index.html", "index.htm"]);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(!cfg.database.seed_sample);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("does-not-exist").unwrap();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 3000;
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 3000);

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
