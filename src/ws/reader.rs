//! C1: frame reader. Grounded on `ws.go`'s `readWebSocket` - a spawned task
//! that pushes frames onto a channel and pauses 20ms after each successful
//! send, so a slow consumer applies backpressure to the socket read loop
//! rather than buffering unboundedly.

use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::frame::Frame;

const PACE: Duration = Duration::from_millis(20);

pub fn spawn<S, M, E>(mut stream: S, cancel: CancellationToken) -> mpsc::Receiver<Frame>
where
    S: Stream<Item = Result<M, E>> + Unpin + Send + 'static,
    Frame: From<M>,
    M: Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => break,
                item = stream.next() => item,
            };
            let frame = match next {
                None => {
                    debug!("read stream ended");
                    break;
                }
                Some(Err(e)) => {
                    error!("read error: {e}");
                    break;
                }
                Some(Ok(msg)) => Frame::from(msg),
            };
            let is_close = frame.is_close();
            if tx.send(frame).await.is_err() {
                break;
            }
            if is_close {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(PACE) => {}
                _ = cancel.cancelled() => break,
            }
        }
        debug!("read routine ended");
    });
    rx
}
