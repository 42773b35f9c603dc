//! C4/C5: transform middlewares and the chain that sequences them.

mod chain;
mod cleaner;
mod joiner;
mod ledger;
mod punctuator;

pub use chain::MiddlewareChain;
pub use cleaner::Cleaner;
pub use joiner::Joiner;
pub use punctuator::{Punctuator, PunctuatorClient};
