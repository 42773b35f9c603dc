//! C4a: pure text cleanup. Grounded on `internal/handlers/cleaner.go`.

use crate::error::Result;
use crate::model::FullResult;

pub struct Cleaner;

impl Cleaner {
    pub fn new() -> Self {
        Self
    }

    /// Trims, replaces `_` with a space, collapses whitespace runs. Never fails.
    pub fn process(&self, mut input: FullResult) -> Result<FullResult> {
        if let Some(hyp) = input.result.hypotheses.first_mut() {
            hyp.transcript = clean(&hyp.transcript);
        }
        Ok(input)
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

fn clean(text: &str) -> String {
    let replaced = text.replace('_', " ");
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_underscores_and_whitespace() {
        assert_eq!(clean("  labas_  rytas   vilniau "), "labas rytas vilniau");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean(""), "");
    }
}
