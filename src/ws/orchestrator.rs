//! C8: wires one client connection to its transcription backend. Grounded on
//! `ws_transcription.go`'s `WSTranscriptionHandler.HandleConnection` - dial
//! the backend, run the forward (client -> backend) and backward
//! (backend -> client) pumps under one cancellation scope, and flush any
//! remaining audio once both finish.

use std::sync::Arc;

use axum::extract::ws::WebSocket;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::frame::Frame;
use super::{pump, reader};
use crate::error::{ProxyError, Result};
use crate::middleware::{Joiner, MiddlewareChain, PunctuatorClient};
use crate::model;
use crate::record::RecordSession;
use crate::store::DataStore;

const START: &str = "START_TRANSCRIPTION";
const START_AUTO: &str = "START_TRANSCRIPTION_AUTO";
const STOP: &str = "STOP_TRANSCRIPTION";

pub async fn handle_connection(
    socket: WebSocket,
    backend_url: &str,
    query: Option<&str>,
    user_id: String,
    store: Arc<dyn DataStore>,
    joiner: Arc<Joiner>,
    punctuator_client: Arc<PunctuatorClient>,
) -> Result<()> {
    // Fresh chain per connection: the joiner/punctuator HTTP transports are
    // shared process-wide, but the punctuator's segment ledger must not be
    // (SPEC_FULL.md §3, §5).
    let chain = Arc::new(MiddlewareChain::new(joiner, punctuator_client));
    let url = match query {
        Some(q) if !q.is_empty() => format!("{backend_url}?{q}"),
        _ => backend_url.to_string(),
    };
    info!(%url, "dialing transcription backend");

    let (backend_ws, _resp) = tokio_tungstenite::connect_async(&url)
        .await
        .map_err(|e| ProxyError::BackendDial(e.to_string()))?;

    let (client_sink, client_stream) = socket.split();
    let (backend_sink, backend_stream) = backend_ws.split();

    let cancel = CancellationToken::new();

    let client_reader = reader::spawn(client_stream, cancel.clone());
    let backend_reader = reader::spawn(backend_stream, cancel.clone());

    let (client_write_tx, mut client_write_rx) = mpsc::channel::<Frame>(16);
    let (backend_write_tx, mut backend_write_rx) = mpsc::channel::<Frame>(16);

    let client_writer = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut sink = client_sink;
            while let Some(frame) = client_write_rx.recv().await {
                if let Err(e) = sink.send(frame.into()).await {
                    error!("{}", ProxyError::PeerWrite(e.to_string()));
                    cancel.cancel();
                    break;
                }
            }
        })
    };
    let backend_writer = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut sink = backend_sink;
            while let Some(frame) = backend_write_rx.recv().await {
                if let Err(e) = sink.send(frame.into()).await {
                    error!("{}", ProxyError::PeerWrite(e.to_string()));
                    cancel.cancel();
                    break;
                }
            }
        })
    };

    let (session_event_tx, mut session_event_rx) = mpsc::unbounded_channel::<model::FullResult>();
    let session = RecordSession::new(user_id, store, session_event_tx);

    let bridge_tx = client_write_tx.clone();
    let event_bridge = tokio::spawn(async move {
        while let Some(ev) = session_event_rx.recv().await {
            match model::encode(&ev) {
                Ok(s) => {
                    if bridge_tx.send(Frame::Text(s)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("encode err: {e}"),
            }
        }
    });

    let forward = {
        let session = session.clone();
        let backend_write_tx = backend_write_tx.clone();
        let client_write_tx = client_write_tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            pump::run(
                client_reader,
                backend_write_tx,
                client_write_tx,
                cancel,
                move |frame| {
                    let session = session.clone();
                    async move { process_forward(&session, frame).await }
                },
            )
            .await;
        })
    };

    let backward = {
        let session = session.clone();
        let chain = chain.clone();
        let client_write_tx = client_write_tx.clone();
        let backend_write_tx = backend_write_tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            pump::run(
                backend_reader,
                client_write_tx,
                backend_write_tx,
                cancel,
                move |frame| {
                    let session = session.clone();
                    let chain = chain.clone();
                    async move { process_backward(&session, &chain, frame).await }
                },
            )
            .await;
        })
    };

    let _ = forward.await;
    let _ = backward.await;
    drop(client_write_tx);
    drop(backend_write_tx);
    let _ = client_writer.await;
    let _ = backend_writer.await;
    event_bridge.abort();

    session.finalize().await;
    info!("handleConnection finish");
    Ok(())
}

/// `/client/ws/status`: both directions pass frames through unaltered.
/// Grounded on `ws.go`'s plain `NewWSHandler`, which has no `Middleware`.
pub async fn handle_passthrough(socket: WebSocket, backend_url: &str, query: Option<&str>) -> Result<()> {
    let url = match query {
        Some(q) if !q.is_empty() => format!("{backend_url}?{q}"),
        _ => backend_url.to_string(),
    };
    info!(%url, "dialing status backend");

    let (backend_ws, _resp) = tokio_tungstenite::connect_async(&url)
        .await
        .map_err(|e| ProxyError::BackendDial(e.to_string()))?;

    let (client_sink, client_stream) = socket.split();
    let (backend_sink, backend_stream) = backend_ws.split();

    let cancel = CancellationToken::new();
    let client_reader = reader::spawn(client_stream, cancel.clone());
    let backend_reader = reader::spawn(backend_stream, cancel.clone());

    let (client_write_tx, mut client_write_rx) = mpsc::channel::<Frame>(16);
    let (backend_write_tx, mut backend_write_rx) = mpsc::channel::<Frame>(16);

    let client_writer = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut sink = client_sink;
            while let Some(frame) = client_write_rx.recv().await {
                if let Err(e) = sink.send(frame.into()).await {
                    error!("{}", ProxyError::PeerWrite(e.to_string()));
                    cancel.cancel();
                    break;
                }
            }
        })
    };
    let backend_writer = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let mut sink = backend_sink;
            while let Some(frame) = backend_write_rx.recv().await {
                if let Err(e) = sink.send(frame.into()).await {
                    error!("{}", ProxyError::PeerWrite(e.to_string()));
                    cancel.cancel();
                    break;
                }
            }
        })
    };

    let forward = tokio::spawn(pump::run(
        client_reader,
        backend_write_tx.clone(),
        client_write_tx.clone(),
        cancel.clone(),
        |frame| async move { Ok((vec![frame], vec![])) },
    ));
    let backward = tokio::spawn(pump::run(
        backend_reader,
        client_write_tx.clone(),
        backend_write_tx.clone(),
        cancel,
        |frame| async move { Ok((vec![frame], vec![])) },
    ));

    let _ = forward.await;
    let _ = backward.await;
    drop(client_write_tx);
    drop(backend_write_tx);
    let _ = client_writer.await;
    let _ = backend_writer.await;
    info!("status passthrough finished");
    Ok(())
}

async fn process_forward(session: &Arc<RecordSession>, frame: Frame) -> Result<(Vec<Frame>, Vec<Frame>)> {
    match frame {
        Frame::Binary(b) => {
            session.keep_audio(b.clone()).await;
            Ok((vec![Frame::Binary(b)], vec![]))
        }
        Frame::Text(t) => {
            if t == START || t == START_AUTO {
                let ack = session.start(t == START_AUTO).await;
                let encoded = model::encode(&ack).map_err(ProxyError::InputDecode)?;
                Ok((vec![], vec![Frame::Text(encoded)]))
            } else if t == STOP {
                session.stop().await;
                Ok((vec![], vec![]))
            } else {
                Ok((vec![Frame::Text(t)], vec![]))
            }
        }
        other => Ok((vec![other], vec![])),
    }
}

async fn process_backward(
    session: &Arc<RecordSession>,
    chain: &MiddlewareChain,
    frame: Frame,
) -> Result<(Vec<Frame>, Vec<Frame>)> {
    match frame {
        Frame::Text(t) => {
            let decoded = match model::decode(&t) {
                Ok(d) => d,
                Err(e) => {
                    error!("decode err: {e}");
                    return Ok((vec![Frame::Text(t)], vec![]));
                }
            };
            match session.process(decoded, chain).await {
                Ok(results) => {
                    let mut outs = Vec::with_capacity(results.len());
                    for r in results {
                        match model::encode(&r) {
                            Ok(s) => outs.push(Frame::Text(s)),
                            Err(e) => error!("encode err: {e}"),
                        }
                    }
                    Ok((outs, vec![]))
                }
                Err(e) => {
                    error!("session err: {e}");
                    Ok((vec![Frame::Text(t)], vec![]))
                }
            }
        }
        other => Ok((vec![other], vec![])),
    }
}
