//! C1/C2/C8: the bidirectional proxy - frame reader, generic pump, and the
//! per-connection orchestrator that ties them to a backend dial.

mod frame;
mod orchestrator;
mod pump;
mod reader;

pub use frame::Frame;
pub use orchestrator::{handle_connection, handle_passthrough};
