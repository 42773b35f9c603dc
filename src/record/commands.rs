//! Lithuanian voice-command phrase matching. Grounded on
//! `internal/handlers/transcription.go`'s `posAt`/`posInWords`/`startAtPos`/
//! `stopAtPos` — phrase tables and matching semantics reproduced literally.

use crate::model::FullResult;

use super::WordPos;

type PhraseMatch<'a> = &'a [&'a [&'a str]];

const START_PHRASES: PhraseMatch = &[&[
    "pradedu",
    "pradėti",
    "pradedame",
    "pradėk",
]];
const START_PHRASES_2: PhraseMatch = &[&[
    "įrašinėti",
    "įrašą",
    "rašinėti",
    "rašyti",
    "rašymą",
    "įrašymą",
]];

const STOP_PHRASES: PhraseMatch = &[&[
    "baigiu",
    "baigiau",
    "baigiame",
    "baigėme",
    "baigti",
    "baik",
    "stabdyk",
    "stabdyti",
]];
const STOP_PHRASES_2: PhraseMatch = &[&[
    "įrašinėti",
    "įrašą",
    "rašinėti",
    "rašyti",
    "rašymą",
    "įrašymą",
]];
const STOP_SINGLE: PhraseMatch = &[&["baikrašyti", "baikrašytė"]];

const COPY_PHRASES: PhraseMatch = &[&["kopijuoti", "kopijuok"]];
const COPY_PHRASES_2: PhraseMatch = &[&["tekstą"]];

const SELECT_ALL_PHRASES: PhraseMatch = &[&["pažymėti", "pažymėk"]];
const SELECT_ALL_PHRASES_2: PhraseMatch = &[&["visus"]];

const STOP_LISTENING_PHRASES: PhraseMatch = &[&["stabdyti", "stabdyk", "baik"]];
const STOP_LISTENING_PHRASES_2: PhraseMatch = &[&["klausymą", "klausyti"]];
const STOP_LISTENING_SINGLE: PhraseMatch = &[&["baiklausyti", "baiklausyte"]];

/// A match is one or more consecutive word-slots, each a list of acceptable
/// tokens (a "match sequence" in the original's `[][][]string`).
type MatchSet<'a> = &'a [&'a [PhraseMatch<'a>]];

fn words_of(input: &FullResult) -> Vec<String> {
    if !input.result.is_final {
        input
            .text()
            .to_lowercase()
            .split(' ')
            .map(|s| s.to_string())
            .collect()
    } else {
        input
            .result
            .hypotheses
            .first()
            .map(|h| {
                h.word_alignment
                    .iter()
                    .map(|w| w.word.to_lowercase())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn matches_token(word: &str, alternatives: PhraseMatch) -> bool {
    alternatives[0].iter().any(|m| *m == word)
}

/// Searches `words[from..]` for the first index at which any of `matches`
/// (each a sequence of per-slot alternative sets) matches consecutively.
fn pos_in_words(words: &[String], from: usize, matches: &[&[PhraseMatch]]) -> i64 {
    let len = words.len();
    for seq in matches {
        let lm = seq.len();
        if lm == 0 || len < lm {
            continue;
        }
        for i in from..=(len - lm) {
            let mut matched = true;
            for (j, alt) in seq.iter().enumerate() {
                if !matches_token(&words[i + j], alt) {
                    matched = false;
                    break;
                }
            }
            if matched {
                return i as i64;
            }
        }
    }
    -1
}

fn pos_at(input: &FullResult, last_command: &WordPos, matches: &[&[PhraseMatch]]) -> i64 {
    if input.result.hypotheses.is_empty() {
        return -1;
    }
    let words = words_of(input);
    let from = if last_command.segment == input.segment {
        last_command.word_index.max(0) as usize
    } else {
        0
    };
    pos_in_words(&words, from, matches)
}

pub fn start_at_pos(input: &FullResult, last_command: &WordPos) -> i64 {
    pos_at(input, last_command, &[&[START_PHRASES, START_PHRASES_2]])
}

pub fn stop_at_pos(input: &FullResult, last_command: &WordPos) -> i64 {
    pos_at(
        input,
        last_command,
        &[&[STOP_PHRASES, STOP_PHRASES_2], &[STOP_SINGLE]],
    )
}

pub fn copy_at_pos(input: &FullResult, last_command: &WordPos) -> i64 {
    pos_at(input, last_command, &[&[COPY_PHRASES, COPY_PHRASES_2]])
}

pub fn select_all_at_pos(input: &FullResult, last_command: &WordPos) -> i64 {
    pos_at(
        input,
        last_command,
        &[&[SELECT_ALL_PHRASES, SELECT_ALL_PHRASES_2]],
    )
}

pub fn stop_listening_at_pos(input: &FullResult, last_command: &WordPos) -> i64 {
    pos_at(
        input,
        last_command,
        &[
            &[STOP_LISTENING_PHRASES, STOP_LISTENING_PHRASES_2],
            &[STOP_LISTENING_SINGLE],
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Hypothesis;

    fn result_with_text(segment: i64, text: &str, is_final: bool) -> FullResult {
        let mut fr = FullResult::default();
        fr.segment = segment;
        fr.result.is_final = is_final;
        fr.result.hypotheses.push(Hypothesis {
            transcript: text.into(),
            ..Default::default()
        });
        fr
    }

    #[test]
    fn finds_start_phrase() {
        let input = result_with_text(0, "pradedu rašyti labas", false);
        let idx = start_at_pos(&input, &WordPos::none());
        assert_eq!(idx, 0);
    }

    #[test]
    fn start_not_found_returns_negative_one() {
        let input = result_with_text(0, "labas rytas", false);
        assert_eq!(start_at_pos(&input, &WordPos::none()), -1);
    }

    #[test]
    fn finds_stop_single_token_variant() {
        let input = result_with_text(0, "gerai baikrašyti dabar", false);
        assert_eq!(stop_at_pos(&input, &WordPos::none()), 1);
    }

    #[test]
    fn respects_from_position_within_same_segment() {
        let input = result_with_text(0, "pradedu rašyti pradedu rašyti", false);
        let last = WordPos { segment: 0, word_index: 1 };
        assert_eq!(start_at_pos(&input, &last), 2);
    }
}
