// Configuration module entry point
// Manages application configuration and shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{ApiConfig, Config, CorsConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Local development origins allowed by default (React, Vite, Vite preview)
const DEFAULT_ALLOWED_ORIGINS: [&str; 5] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:4173",
    "http://127.0.0.1:5173",
    "http://localhost:8000",
];

impl Config {
    /// Load configuration from the default "config.toml" location
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension).
    ///
    /// Layering, lowest priority first: hard-coded defaults, the optional
    /// config file, `SETTINGS_`-prefixed environment variables, and finally
    /// the bare `PORT` variable for the listen port.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SETTINGS").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "plain")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default(
                "cors.allowed_origins",
                DEFAULT_ALLOWED_ORIGINS.map(String::from).to_vec(),
            )?
            .set_default("api.update_mode", "replace")?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.apply_port_override(std::env::var("PORT").ok().as_deref())?;
        Ok(cfg)
    }

    /// Override the listen port from the `PORT` environment variable
    fn apply_port_override(&mut self, port: Option<&str>) -> Result<(), config::ConfigError> {
        if let Some(port) = port {
            self.server.port = port.parse().map_err(|e| {
                config::ConfigError::Message(format!("Invalid PORT value '{port}': {e}"))
            })?;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::UpdateMode;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "plain".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
            },
            cors: CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
            api: ApiConfig {
                update_mode: UpdateMode::Replace,
            },
        }
    }

    #[test]
    fn test_socket_addr() {
        let cfg = test_config();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_port_override_applied() {
        let mut cfg = test_config();
        cfg.apply_port_override(Some("9090")).unwrap();
        assert_eq!(cfg.server.port, 9090);
    }

    #[test]
    fn test_port_override_absent_keeps_default() {
        let mut cfg = test_config();
        cfg.apply_port_override(None).unwrap();
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn test_port_override_rejects_garbage() {
        let mut cfg = test_config();
        assert!(cfg.apply_port_override(Some("not-a-port")).is_err());
        assert!(cfg.apply_port_override(Some("70000")).is_err());
    }
}
