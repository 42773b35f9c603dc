//! Shared error taxonomy used across the proxy.

use thiserror::Error;

/// Error kinds surfaced by the proxy's components.
///
/// `Timeout` is folded into `RemoteEnrichment` at the call site rather than
/// matched separately downstream — both are handled identically by the
/// middleware chain (stage skipped, previous output kept).
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to decode input frame: {0}")]
    InputDecode(#[source] serde_json::Error),

    #[error("remote enrichment call failed: {0}")]
    RemoteEnrichment(String),

    #[error("punctuator alignment mismatch: {0}")]
    AlignmentMismatch(String),

    #[error("failed writing to peer: {0}")]
    PeerWrite(String),

    #[error("failed dialing backend: {0}")]
    BackendDial(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
