//! C2: the generic proxy loop. Grounded on `ws.go`'s `proxyFunc` - reads
//! frames from one side, runs them through `process`, and routes the two
//! resulting frame lists: `out` onward to the peer, `in` back to the side
//! being read from (used for connection-local acks that never reach the
//! peer, e.g. a synthesized `START_TRANSCRIPTION` ack).

use std::future::Future;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::frame::Frame;
use crate::error::Result;

pub async fn run<F, Fut>(
    mut reader: mpsc::Receiver<Frame>,
    out_tx: mpsc::Sender<Frame>,
    in_tx: mpsc::Sender<Frame>,
    cancel: CancellationToken,
    mut process: F,
) where
    F: FnMut(Frame) -> Fut,
    Fut: Future<Output = Result<(Vec<Frame>, Vec<Frame>)>>,
{
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => {
                info!("context canceled");
                break;
            }
            frame = reader.recv() => match frame {
                None => {
                    info!("channel closed");
                    break;
                }
                Some(frame) => frame,
            },
        };

        let is_close = frame.is_close();
        match process(frame).await {
            Ok((outs, ins)) => {
                for out in outs {
                    if out_tx.send(out).await.is_err() {
                        error!("write error: peer channel closed");
                        cancel.cancel();
                        return;
                    }
                }
                for inp in ins {
                    if in_tx.send(inp).await.is_err() {
                        error!("write error: local channel closed");
                        cancel.cancel();
                        return;
                    }
                }
            }
            Err(e) => {
                error!("process error: {e}");
                break;
            }
        }
        if is_close {
            break;
        }
    }
    cancel.cancel();
}
