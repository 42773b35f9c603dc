//! Transport-agnostic frame, bridging the client-side socket (axum) and the
//! backend-side socket (tokio-tungstenite). Mirrors `ws.go`'s `data{t, msg}`.

use axum::extract::ws::Message as ClientMessage;
use tokio_tungstenite::tungstenite::Message as BackendMessage;

#[derive(Debug, Clone)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

impl From<ClientMessage> for Frame {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Text(t) => Frame::Text(t),
            ClientMessage::Binary(b) => Frame::Binary(b),
            ClientMessage::Ping(b) => Frame::Ping(b),
            ClientMessage::Pong(b) => Frame::Pong(b),
            ClientMessage::Close(_) => Frame::Close,
        }
    }
}

impl From<Frame> for ClientMessage {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(t) => ClientMessage::Text(t),
            Frame::Binary(b) => ClientMessage::Binary(b),
            Frame::Ping(b) => ClientMessage::Ping(b),
            Frame::Pong(b) => ClientMessage::Pong(b),
            Frame::Close => ClientMessage::Close(None),
        }
    }
}

impl From<BackendMessage> for Frame {
    fn from(msg: BackendMessage) -> Self {
        match msg {
            BackendMessage::Text(t) => Frame::Text(t),
            BackendMessage::Binary(b) => Frame::Binary(b),
            BackendMessage::Ping(b) => Frame::Ping(b),
            BackendMessage::Pong(b) => Frame::Pong(b),
            BackendMessage::Close(_) => Frame::Close,
            BackendMessage::Frame(_) => Frame::Close,
        }
    }
}

impl From<Frame> for BackendMessage {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(t) => BackendMessage::Text(t),
            Frame::Binary(b) => BackendMessage::Binary(b),
            Frame::Ping(b) => BackendMessage::Ping(b),
            Frame::Pong(b) => BackendMessage::Pong(b),
            Frame::Close => BackendMessage::Close(None),
        }
    }
}

impl Frame {
    pub fn is_close(&self) -> bool {
        matches!(self, Frame::Close)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Frame::Text(_))
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Frame::Binary(_))
    }
}
