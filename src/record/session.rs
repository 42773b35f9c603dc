//! `RecordSession`: the voice-command-driven recording state machine.
//! Grounded on `internal/handlers/transcription.go`'s `RecordSession`,
//! reproduced field-for-field and branch-for-branch, including its two
//! documented quirks (see DESIGN.md) which are preserved, not fixed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{error, warn};
use ulid::Ulid;

use super::commands::{copy_at_pos, select_all_at_pos, start_at_pos, stop_at_pos, stop_listening_at_pos};
use super::WordPos;
use crate::audio::AudioKeeper;
use crate::error::Result;
use crate::middleware::MiddlewareChain;
use crate::model::FullResult;
use crate::store::{audio_key, DataStore};

pub const EVENT_START: &str = "START_TRANSCRIPTION";
pub const EVENT_START_AUTO: &str = "START_TRANSCRIPTION_AUTO";
pub const EVENT_STOP: &str = "STOP_TRANSCRIPTION";
pub const EVENT_STOPPING: &str = "STOPPING_TRANSCRIPTION";
pub const EVENT_COPY: &str = "COPY_COMMAND";
pub const EVENT_SELECT_ALL: &str = "SELECT_ALL_COMMAND";
pub const EVENT_STOP_LISTENING: &str = "STOP_LISTENING_COMMAND";

const FINAL_STOP_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Listening,
    Transcribing,
    StoppingTranscription,
}

struct TranscriptionSession {
    id: String,
    start_segment: i64,
    end_segment: i64,
    stopping_at: Option<Instant>,
    start_pos: WordPos,
}

impl TranscriptionSession {
    fn new(segment: i64, word: i64) -> Self {
        Self {
            id: Ulid::new().to_string(),
            start_segment: segment,
            end_segment: -1,
            stopping_at: None,
            start_pos: WordPos {
                segment,
                word_index: word,
            },
        }
    }
}

struct Inner {
    state: RecordState,
    auto: bool,
    segment: i64,
    transcription: Option<TranscriptionSession>,
    last_command: WordPos,
    audio_keeper: Option<AudioKeeper>,

    copy_command_segment: i64,
    select_all_command_segment: i64,
    stop_command_segment: i64,
}

/// Owns the per-connection state machine. Held behind `Arc` so the
/// `FinalStop` timer task can outlive the call that scheduled it.
pub struct RecordSession {
    inner: Mutex<Inner>,
    user: String,
    store: Arc<dyn DataStore>,
    client_tx: tokio::sync::mpsc::UnboundedSender<FullResult>,
}

impl RecordSession {
    pub fn new(
        user: impl Into<String>,
        store: Arc<dyn DataStore>,
        client_tx: tokio::sync::mpsc::UnboundedSender<FullResult>,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                state: RecordState::Listening,
                auto: true,
                segment: 0,
                transcription: None,
                last_command: WordPos::none(),
                audio_keeper: None,
                copy_command_segment: -1,
                select_all_command_segment: -1,
                stop_command_segment: -1,
            }),
            user: user.into(),
            store,
            client_tx,
        })
    }

    /// Explicit client-initiated start (`START_TRANSCRIPTION[_AUTO]`).
    pub async fn start(&self, auto: bool) -> FullResult {
        let mut inner = self.inner.lock().await;
        inner.state = RecordState::Transcribing;
        inner.auto = auto;
        let session = TranscriptionSession::new(inner.segment, 0);
        inner.audio_keeper = Some(AudioKeeper::new(session.id.clone()));
        let id = session.id.clone();
        inner.transcription = Some(session);
        FullResult::event_only(EVENT_START).with_transcription_id(id)
    }

    /// Explicit client-initiated stop (`STOP_TRANSCRIPTION`).
    pub async fn stop(self: &Arc<Self>) {
        let mut inner = self.inner.lock().await;
        self.flush_audio_locked(&mut inner).await;
        if inner.state == RecordState::Transcribing {
            inner.state = RecordState::StoppingTranscription;
            if let Some(session) = inner.transcription.as_mut() {
                session.stopping_at = Some(Instant::now());
                session.end_segment = inner.segment;
                let id = session.id.clone();
                self.spawn_final_stop(id);
            }
        }
    }

    /// Appends a binary audio frame to the active keeper, if any.
    pub async fn keep_audio(&self, chunk: Vec<u8>) {
        let mut inner = self.inner.lock().await;
        if let Some(keeper) = inner.audio_keeper.as_mut() {
            keeper.push(chunk);
        }
    }

    /// Flushes any still-buffered audio. Called once the connection itself
    /// is closing, in case the client dropped without an explicit stop.
    pub async fn finalize(&self) {
        let mut inner = self.inner.lock().await;
        self.flush_audio_locked(&mut inner).await;
    }

    async fn flush_audio_locked(&self, inner: &mut Inner) {
        if let Some(keeper) = inner.audio_keeper.take() {
            if !keeper.is_empty() {
                let key = audio_key(&self.user, &keeper.id);
                if let Err(e) = self.store.save_audio(&key, keeper.chunks()).await {
                    error!("failed to save audio for {key}: {e}");
                }
            }
        }
    }

    fn spawn_final_stop(self: &Arc<Self>, id: String) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(FINAL_STOP_DELAY).await;
            this.final_stop(id).await;
        });
    }

    async fn final_stop(&self, id: String) {
        warn!("final stopping transcription {id}");
        let mut inner = self.inner.lock().await;
        let still_current = inner
            .transcription
            .as_ref()
            .map(|t| t.id == id)
            .unwrap_or(false);
        if !still_current {
            return;
        }
        inner.state = RecordState::Listening;
        if self.client_tx.send(FullResult::event_only(EVENT_STOP)).is_err() {
            error!("can't send stop event, client channel closed");
        }
    }

    /// Per-FullResult backward-path processing. Returns the frames to emit
    /// toward the client, in order.
    pub async fn process(
        self: &Arc<Self>,
        input: FullResult,
        chain: &MiddlewareChain,
    ) -> Result<Vec<FullResult>> {
        let mut inner = self.inner.lock().await;
        inner.segment = input.segment;
        let last_command = inner.last_command;

        if inner.state != RecordState::Transcribing && !inner.auto {
            return Ok(Vec::new());
        }

        let mut res = Vec::new();

        if inner.state == RecordState::Listening && inner.auto {
            let index_start = start_at_pos(&input, &last_command);
            if index_start >= 0 {
                inner.last_command = WordPos {
                    segment: inner.segment,
                    word_index: index_start,
                };
                inner.state = RecordState::Transcribing;
                let session = TranscriptionSession::new(inner.segment, index_start);
                inner.audio_keeper = Some(AudioKeeper::new(session.id.clone()));
                let id = session.id.clone();
                inner.transcription = Some(session);
                res.push(FullResult::event_only(EVENT_START).with_transcription_id(id));
            } else {
                let mut found = false;

                if inner.copy_command_segment < inner.segment {
                    let index = copy_at_pos(&input, &inner.last_command);
                    if index >= 0 {
                        inner.last_command = WordPos {
                            segment: inner.segment,
                            word_index: index,
                        };
                        res.push(FullResult::event_only(EVENT_COPY));
                        inner.copy_command_segment = inner.segment;
                        found = true;
                    }
                }
                if !found && inner.select_all_command_segment < inner.segment {
                    let index = select_all_at_pos(&input, &inner.last_command);
                    if index >= 0 {
                        inner.last_command = WordPos {
                            segment: inner.segment,
                            word_index: index,
                        };
                        res.push(FullResult::event_only(EVENT_SELECT_ALL));
                        inner.select_all_command_segment = inner.segment;
                        found = true;
                    }
                }
                if !found && inner.stop_command_segment < inner.segment {
                    let index = stop_listening_at_pos(&input, &inner.last_command);
                    if index >= 0 {
                        inner.last_command = WordPos {
                            segment: inner.segment,
                            word_index: index,
                        };
                        res.push(FullResult::event_only(EVENT_STOP_LISTENING));
                        // Reuses select_all's guard rather than a dedicated
                        // field, carried over from the source verbatim.
                        inner.select_all_command_segment = inner.segment;
                    }
                }
            }
        } else if inner.state == RecordState::Transcribing && inner.auto {
            let index_stop = stop_at_pos(&input, &last_command);
            if index_stop >= 0 {
                inner.state = RecordState::StoppingTranscription;
                inner.last_command = WordPos {
                    segment: inner.segment,
                    word_index: index_stop,
                };
                self.flush_audio_locked(&mut inner).await;
                if let Some(session) = inner.transcription.as_mut() {
                    session.end_segment = inner.segment;
                    session.stopping_at = Some(Instant::now());
                    let id = session.id.clone();
                    self.spawn_final_stop(id);
                }
                res.push(FullResult::event_only(EVENT_STOPPING));
            }
        }

        let mut next_state = inner.state;
        let within_stopping_window = inner
            .transcription
            .as_ref()
            .and_then(|t| t.stopping_at)
            .map(|at| at + FINAL_STOP_DELAY > Instant::now())
            .unwrap_or(false);
        if inner.state == RecordState::StoppingTranscription
            && (input.result.is_final || within_stopping_window)
        {
            next_state = RecordState::Listening;
            res.push(FullResult::event_only(EVENT_STOP));
        }

        if inner.state == RecordState::Listening
            && (inner.transcription.is_none()
                || inner.transcription.as_ref().unwrap().end_segment < inner.segment)
        {
            return Ok(res);
        }

        let mut processed_input = input;
        if let Some(session) = inner.transcription.as_ref() {
            if session.start_segment == inner.segment && inner.auto {
                let index_start = start_at_pos(&processed_input, &session.start_pos);
                if index_start >= 0 {
                    processed_input = clear_words_from(processed_input, index_start + 2);
                }
            }
        }
        if let Some(session) = inner.transcription.as_ref() {
            if session.end_segment == inner.segment && inner.auto {
                let index_stop = stop_at_pos(&processed_input, &last_command);
                if index_stop >= 0 {
                    processed_input = clear_words_to(processed_input, index_stop);
                }
            }
        }

        let processed = chain.process(processed_input).await?;
        res.push(processed);
        inner.state = next_state;
        Ok(res)
    }
}

fn clear_words_from(mut input: FullResult, from: i64) -> FullResult {
    let from = from.max(0) as usize;
    if let Some(hyp) = input.result.hypotheses.first_mut() {
        if !input.result.is_final {
            let mut words: Vec<&str> = hyp.transcript.split(' ').collect();
            if from <= words.len() {
                words = words[from..].to_vec();
            }
            hyp.transcript = words.join(" ");
        } else {
            if from <= hyp.word_alignment.len() {
                hyp.word_alignment = hyp.word_alignment[from..].to_vec();
            }
            hyp.transcript = hyp
                .word_alignment
                .iter()
                .map(|w| w.word.as_str())
                .collect::<Vec<_>>()
                .join(" ");
        }
    }
    input
}

fn clear_words_to(mut input: FullResult, to: i64) -> FullResult {
    let to = to.max(0) as usize;
    if let Some(hyp) = input.result.hypotheses.first_mut() {
        if !input.result.is_final {
            let mut words: Vec<&str> = hyp.transcript.split(' ').collect();
            if to < words.len() {
                words.truncate(to);
            }
            hyp.transcript = words.join(" ");
        } else {
            if to < hyp.word_alignment.len() {
                hyp.word_alignment.truncate(to);
            }
            hyp.transcript = hyp
                .word_alignment
                .iter()
                .map(|w| w.word.as_str())
                .collect::<Vec<_>>()
                .join(" ");
        }
    }
    input
}
