//! Transcription proxy server entry point.
//!
//! Usage: transcribe-proxy-server
//! Configuration is read entirely from the environment - see `Config::from_env`.

use std::sync::Arc;

use tracing::{error, info};

use transcribe_proxy::http::{self, AppState};
use transcribe_proxy::middleware::{Joiner, PunctuatorClient};
use transcribe_proxy::store::{DataStore, EncryptedStore, MemoryStore, RedisKv};
use transcribe_proxy::{logging, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Config::from_env().map_err(|e| {
        error!("invalid configuration: {e}");
        e
    })?;
    info!(port = config.port, "starting transcription proxy");

    let store: Arc<dyn DataStore> = match (&config.store_conn_str, &config.store_encryption_key) {
        (Some(conn_str), Some(key)) => {
            info!("using encrypted Redis store");
            let backend = RedisKv::connect(conn_str).await?;
            Arc::new(EncryptedStore::new(backend, key.as_bytes())?)
        }
        _ => {
            info!("using in-memory store (no STORE_CONN_STR configured)");
            Arc::new(MemoryStore::new())
        }
    };

    let joiner = Arc::new(Joiner::new(config.joiner_url.clone())?);
    let punctuator_client = Arc::new(PunctuatorClient::new(config.punctuator_url.clone())?);

    let port = config.port;
    let state = AppState {
        config: Arc::new(config),
        store,
        joiner,
        punctuator_client,
    };
    let app = http::router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
