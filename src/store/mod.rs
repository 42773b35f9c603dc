//! C9: opaque key/value facade for audio, per-user config and text snippets.

mod encrypted;
mod memory;
mod redis;

pub use encrypted::{EncryptedStore, RawKv};
pub use memory::MemoryStore;
pub use redis::RedisKv;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The `/client/config` payload. Zero-valued when the user has none stored.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default, rename = "skipTour")]
    pub skip_tour: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Part {
    pub id: String,
    pub text: String,
}

/// The `/client/text` payload. Empty when the user has none stored.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Texts {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// TTL applied to audio and text entries. Config entries never expire.
pub const ENTRY_TTL: std::time::Duration = std::time::Duration::from_secs(6 * 60 * 60);

#[async_trait]
pub trait DataStore: Send + Sync {
    async fn save_audio(&self, key: &str, chunks: &[Vec<u8>]) -> Result<()>;
    /// Missing audio is an error, unlike config/texts.
    async fn get_audio(&self, key: &str) -> Result<Vec<u8>>;

    async fn get_config(&self, user_id: &str) -> Result<User>;
    async fn save_config(&self, user: &User) -> Result<()>;

    async fn get_texts(&self, user_id: &str) -> Result<Texts>;
    async fn save_texts(&self, user_id: &str, texts: &Texts) -> Result<()>;
}

/// Storage key for a transcription session's captured audio.
pub fn audio_key(user_id: &str, session_id: &str) -> String {
    format!("audio-{user_id}-{session_id}")
}
