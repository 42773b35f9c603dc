//! C7: record session state machine driven by voice commands.

mod commands;
mod session;

pub use session::{RecordSession, RecordState};

/// Position of the last matched command, or the `(-1, -1)` sentinel meaning
/// "no prior command in this connection".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordPos {
    pub segment: i64,
    pub word_index: i64,
}

impl WordPos {
    pub fn none() -> Self {
        Self {
            segment: -1,
            word_index: -1,
        }
    }
}

impl Default for WordPos {
    fn default() -> Self {
        Self::none()
    }
}
