//! Environment-driven startup configuration.

use std::env;

/// Startup configuration read once at process start.
///
/// Required URLs fail loudly on startup (matching the teacher's
/// `std::process::exit(1)` pattern on unrecoverable init failure) rather
/// than deferring the failure to first use.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub status_backend_url: String,
    pub speech_backend_url: String,
    pub joiner_url: String,
    pub punctuator_url: String,
    pub store_conn_str: Option<String>,
    pub store_encryption_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let status_backend_url = required_env("STATUS_BACKEND_URL")?;
        let speech_backend_url = required_env("SPEECH_BACKEND_URL")?;
        let joiner_url = required_env("JOINER_URL")?;
        let punctuator_url = required_env("PUNCTUATOR_URL")?;

        let store_conn_str = env::var("STORE_CONN_STR").ok().filter(|s| !s.is_empty());
        let store_encryption_key = env::var("STORE_ENCRYPTION_KEY")
            .ok()
            .filter(|s| !s.is_empty());

        if store_conn_str.is_some() && store_encryption_key.is_none() {
            return Err("STORE_ENCRYPTION_KEY is required when STORE_CONN_STR is set".into());
        }

        Ok(Self {
            port,
            status_backend_url,
            speech_backend_url,
            joiner_url,
            punctuator_url,
            store_conn_str,
            store_encryption_key,
        })
    }
}

fn required_env(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("missing required env var {name}"))
}
