//! Per-connection segment ledger backing the punctuator's cross-segment
//! corrections. Grounded on `internal/utils/context.go`'s `CustomData`
//! (`Segments`/`ProcessData`) — the ledger/`old-updates` mechanism itself is
//! a spec-level enrichment beyond that file's literal (non-ledger) use,
//! since the retrieved `punctuator.go` predates it; see DESIGN.md.

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedWord {
    pub original: String,
    pub punctuated: String,
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub id: i64,
    pub is_final: bool,
    pub processed: Vec<ProcessedWord>,
}

impl Segment {
    pub fn joined_punctuated(&self) -> String {
        self.processed
            .iter()
            .map(|w| w.punctuated.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Default)]
pub struct SegmentLedger {
    segments: Vec<Segment>,
}

impl SegmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Collects context words walking backward from the latest segment,
    /// skipping non-final segments, stopping once more than 15 words have
    /// been collected and the next-earlier word ends a sentence and the
    /// word after it (chronologically) starts with an uppercase letter or
    /// digit — or once the ledger is exhausted. Returns the context words in
    /// chronological order plus the `(segment, word)` position of the last
    /// word included.
    pub fn collect_context(&self, max_words: usize) -> (Vec<String>, Option<(i64, usize)>) {
        let mut collected: Vec<(i64, usize, String)> = Vec::new();
        let mut from: Option<(i64, usize)> = None;

        'outer: for seg in self.segments.iter().rev() {
            if !seg.is_final {
                continue;
            }
            for (word_idx, word) in seg.processed.iter().enumerate().rev() {
                collected.push((seg.id, word_idx, word.original.clone()));
                from = Some((seg.id, word_idx));

                if collected.len() > max_words {
                    let ends_sentence = word
                        .original
                        .chars()
                        .last()
                        .map(|c| matches!(c, '.' | '?' | '!'))
                        .unwrap_or(false);
                    let starts_upper_or_digit = word
                        .punctuated
                        .chars()
                        .next()
                        .map(|c| c.is_uppercase() || c.is_ascii_digit())
                        .unwrap_or(false);
                    if ends_sentence && starts_upper_or_digit {
                        break 'outer;
                    }
                }
            }
        }

        collected.reverse();
        let words = collected.into_iter().map(|(_, _, w)| w).collect();
        (words, from)
    }

    /// Merges a returned `(original[], punctuated[])` pair back into the
    /// ledger starting at `(from_segment, from_word)`, appending a new
    /// segment for `current_segment` if the walk runs past the end.
    /// Returns the ids of any already-emitted earlier segments whose
    /// `punctuated` text changed.
    pub fn merge(
        &mut self,
        current_segment: i64,
        is_final: bool,
        from: Option<(i64, usize)>,
        original: &[String],
        punctuated: &[String],
    ) -> Result<Vec<i64>, String> {
        if original.len() != punctuated.len() {
            return Err(format!(
                "length mismatch: original={} punctuated={}",
                original.len(),
                punctuated.len()
            ));
        }

        let (mut seg_idx, mut word_idx) = match from {
            Some((seg_id, word)) => (
                self.segments
                    .iter()
                    .position(|s| s.id == seg_id)
                    .unwrap_or(self.segments.len()),
                word,
            ),
            None => (self.segments.len(), 0),
        };

        let mut changed_earlier = Vec::new();

        let mut i = 0;
        while i < original.len() {
            if seg_idx >= self.segments.len() {
                self.segments.push(Segment {
                    id: current_segment,
                    is_final: false,
                    processed: Vec::new(),
                });
            }

            let seg_is_final = self.segments[seg_idx].is_final;
            let seg_id = self.segments[seg_idx].id;
            let seg_len = self.segments[seg_idx].processed.len();

            if word_idx >= seg_len {
                if seg_is_final {
                    seg_idx += 1;
                    word_idx = 0;
                    continue;
                }
                self.segments[seg_idx].processed.push(ProcessedWord {
                    original: original[i].clone(),
                    punctuated: punctuated[i].clone(),
                });
            } else {
                if seg_is_final && self.segments[seg_idx].processed[word_idx].original != original[i] {
                    return Err(format!(
                        "alignment broken at segment {seg_id} word {word_idx}"
                    ));
                }
                let slot = &mut self.segments[seg_idx].processed[word_idx];
                slot.original = original[i].clone();
                if slot.punctuated != punctuated[i] {
                    slot.punctuated = punctuated[i].clone();
                    if seg_id != current_segment {
                        changed_earlier.push(seg_id);
                    }
                }
            }

            word_idx += 1;
            i += 1;
        }

        if let Some(last) = self.segments.last_mut() {
            last.is_final = is_final;
        }

        changed_earlier.dedup();
        Ok(changed_earlier)
    }

    pub fn get(&self, id: i64) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }
}
