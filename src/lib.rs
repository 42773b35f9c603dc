//! A real-time transcription session proxy: terminates a client WebSocket,
//! dials a transcription backend, and relays frames through a voice-command
//! driven recording state machine and a cross-segment punctuation pipeline.

pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod record;
pub mod store;
pub mod ws;

pub use config::Config;
pub use error::{ProxyError, Result};
