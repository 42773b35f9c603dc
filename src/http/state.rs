use std::sync::Arc;

use crate::config::Config;
use crate::middleware::{Joiner, PunctuatorClient};
use crate::store::DataStore;

/// Shared, process-wide collaborators. `joiner`/`punctuator_client` are the
/// pooled HTTP transports (SPEC_FULL.md §5) - a fresh `MiddlewareChain`,
/// and with it a fresh per-connection `SegmentLedger`, is built from these
/// for every WebSocket session rather than stored here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DataStore>,
    pub joiner: Arc<Joiner>,
    pub punctuator_client: Arc<PunctuatorClient>,
}
