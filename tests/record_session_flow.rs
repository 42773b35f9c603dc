//! Integration tests for the record session state machine against the
//! public crate surface: `RecordSession` driving a real `MiddlewareChain`
//! and `MemoryStore`, the way `ws::orchestrator` wires them for a live
//! connection.

use std::sync::Arc;

use transcribe_proxy::middleware::{Joiner, MiddlewareChain, PunctuatorClient};
use transcribe_proxy::model::{FullResult, Hypothesis, WordAlignment};
use transcribe_proxy::record::RecordSession;
use transcribe_proxy::store::{audio_key, DataStore, MemoryStore};

const EVENT_START: &str = "START_TRANSCRIPTION";
const EVENT_STOPPING: &str = "STOPPING_TRANSCRIPTION";

// The joiner/punctuator point at nothing reachable, same as the rest of the
// suite: both stages fail fast and the chain falls back to the cleaner's
// output, which is enough to exercise the session's own state transitions.
fn unreachable_chain() -> MiddlewareChain {
    let joiner = Arc::new(Joiner::new("http://127.0.0.1:1/join".into()).unwrap());
    let punctuator = Arc::new(PunctuatorClient::new("http://127.0.0.1:1/punct".into()).unwrap());
    MiddlewareChain::new(joiner, punctuator)
}

fn final_result(segment: i64, words: &[&str]) -> FullResult {
    let mut fr = FullResult::default();
    fr.segment = segment;
    fr.result.is_final = true;
    fr.result.hypotheses.push(Hypothesis {
        transcript: words.join(" "),
        word_alignment: words
            .iter()
            .enumerate()
            .map(|(i, w)| WordAlignment {
                start: i as f64 * 0.1,
                length: 0.1,
                word: w.to_string(),
                confidence: 1.0,
            })
            .collect(),
        ..Default::default()
    });
    fr
}

/// Scenario: client sends an explicit `START_TRANSCRIPTION`, some audio
/// chunks arrive, then an explicit `STOP_TRANSCRIPTION` — the session must
/// flush the buffered audio to the store as a playable WAV file under the
/// session's own key, the way `ws::orchestrator::process_forward` drives it.
#[tokio::test]
async fn explicit_start_then_stop_flushes_audio_to_store() {
    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let session = RecordSession::new("user-flow-1", store.clone(), tx);

    let ack = session.start(false).await;
    assert_eq!(ack.event.as_deref(), Some(EVENT_START));
    let transcription_id = ack.transcription_id.clone().expect("start ack carries an id");

    // Three 20ms-at-16kHz mono frames, matching what `audio::AudioKeeper`
    // expects from the client's binary frames.
    for _ in 0..3 {
        session.keep_audio(vec![0u8; 640]).await;
    }

    session.stop().await;

    let key = audio_key("user-flow-1", &transcription_id);
    let wav = store.get_audio(&key).await.expect("audio was flushed on stop");
    assert_eq!(&wav[0..4], b"RIFF", "save_audio must produce a WAV container");

    // No STOPPING_TRANSCRIPTION/STOP event reaches the client from an
    // explicit stop — those only fire from voice-triggered auto-stop via
    // `process`. The client channel should still be empty.
    assert!(rx.try_recv().is_err());
}

/// Scenario: the backend emits a final segment containing the Lithuanian
/// "start recording" phrase while the session is idle and in auto mode —
/// the session must flip into `Transcribing`, emit a `START_TRANSCRIPTION`
/// event with a fresh id, and strip the command words out of what's handed
/// to the middleware chain before it reaches the client.
#[tokio::test]
async fn voice_triggered_start_strips_command_words_before_the_chain() {
    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let session = RecordSession::new("user-flow-2", store, tx);
    let chain = unreachable_chain();

    let input = final_result(7, &["pradedu", "rašyti", "labas", "rytas"]);
    let outputs = session.process(input, &chain).await.unwrap();

    assert!(outputs
        .iter()
        .any(|f| f.event.as_deref() == Some(EVENT_START)));
    let transcript = outputs.last().unwrap();
    assert_eq!(transcript.text(), "labas rytas");
}

/// Scenario: while transcribing in auto mode, a final segment carrying the
/// "stop recording" phrase arrives — the session must emit
/// `STOPPING_TRANSCRIPTION`, truncate the transcript at the stop phrase, and
/// flush whatever audio had accumulated so far.
#[tokio::test]
async fn voice_triggered_stop_truncates_transcript_and_flushes_audio() {
    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let session = RecordSession::new("user-flow-3", store.clone(), tx);
    let chain = unreachable_chain();

    let start_ack = session.start(true).await;
    let transcription_id = start_ack.transcription_id.clone().unwrap();
    session.keep_audio(vec![0u8; 640]).await;

    let input = final_result(2, &["labas", "baigiu", "rašyti"]);
    let outputs = session.process(input, &chain).await.unwrap();

    assert!(outputs
        .iter()
        .any(|f| f.event.as_deref() == Some(EVENT_STOPPING)));

    let key = audio_key("user-flow-3", &transcription_id);
    assert!(store.get_audio(&key).await.is_ok(), "stop-by-voice flushes audio too");
}

/// A non-auto session that's still `Listening` (e.g. the client only ever
/// used `START_TRANSCRIPTION` and hasn't called it yet) must suppress
/// backend chatter entirely rather than forward raw segments to the client.
#[tokio::test]
async fn listening_non_auto_session_drops_backend_segments() {
    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let session = RecordSession::new("user-flow-4", store, tx);
    let chain = unreachable_chain();

    // start(false) puts the session in Transcribing/auto=false; stop it
    // immediately and let it settle back to Listening to reach the state
    // under test without waiting out the real FinalStop delay.
    session.start(false).await;
    session.stop().await;

    let input = final_result(0, &["kažkas", "visiškai", "nesusijusio"]);
    // state is StoppingTranscription (not Transcribing) and auto is false,
    // so the leading guard in `process` returns before any further work.
    let outputs = session.process(input, &chain).await.unwrap();
    assert!(outputs.is_empty());
}
