//! Configuration module for the JobFinder backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy job index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Public base URL used in links inside notification emails
    pub site_url: String,
    /// Sender address for notification emails
    pub mail_from: Option<String>,
    /// HTTP mail relay endpoint; notifications go to the console when unset
    pub mail_webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = non_empty_var("JOBBOARD_API_PSK");

        let db_path = env::var("JOBBOARD_DB_PATH")
            .unwrap_or_else(|_| "./data/jobboard.sqlite".to_string())
            .into();

        let index_path = env::var("JOBBOARD_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        // An unparsable address falls back to the default rather than aborting startup.
        let bind_addr = env::var("JOBBOARD_BIND_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        let log_level = env::var("JOBBOARD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let site_url = env::var("JOBBOARD_SITE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        Self {
            api_psk,
            db_path,
            index_path,
            bind_addr,
            log_level,
            site_url,
            mail_from: non_empty_var("JOBBOARD_MAIL_FROM"),
            mail_webhook_url: non_empty_var("JOBBOARD_MAIL_WEBHOOK_URL"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("JOBBOARD_API_PSK");
        env::remove_var("JOBBOARD_DB_PATH");
        env::remove_var("JOBBOARD_INDEX_PATH");
        env::remove_var("JOBBOARD_BIND_ADDR");
        env::remove_var("JOBBOARD_LOG_LEVEL");
        env::remove_var("JOBBOARD_SITE_URL");
        env::remove_var("JOBBOARD_MAIL_FROM");
        env::remove_var("JOBBOARD_MAIL_WEBHOOK_URL");

        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/jobboard.sqlite"));
        assert_eq!(config.index_path, PathBuf::from("./data/index"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.site_url, "http://localhost:8000");
        assert!(config.mail_webhook_url.is_none());
    }
}
