//! In-memory `DataStore`, the default when no persistent backend is configured.

use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{DataStore, Texts, User, ENTRY_TTL};
use crate::error::{ProxyError, Result};

struct Expiring<T> {
    value: T,
    expires_at: Instant,
}

/// Concurrent-safe store backed by `dashmap`, mirroring the teacher's use of
/// `DashMap` for its call registry (`voice/call_server.rs`'s `CallManager`
/// uses `RwLock<HashMap>` instead, but the pack's other workers lean on
/// `DashMap` for lock-free per-key access, which fits a K/V facade better).
#[derive(Default)]
pub struct MemoryStore {
    audio: DashMap<String, Expiring<Vec<u8>>>,
    configs: DashMap<String, User>,
    texts: DashMap<String, Expiring<Texts>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn save_audio(&self, key: &str, chunks: &[Vec<u8>]) -> Result<()> {
        let bytes = crate::audio::encode_wav(chunks)?;
        self.audio.insert(
            key.to_string(),
            Expiring {
                value: bytes,
                expires_at: Instant::now() + ENTRY_TTL,
            },
        );
        Ok(())
    }

    async fn get_audio(&self, key: &str) -> Result<Vec<u8>> {
        match self.audio.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(entry.value.clone()),
            Some(_) => {
                self.audio.remove(key);
                Err(ProxyError::Store(format!("not found: {key}")))
            }
            None => Err(ProxyError::Store(format!("not found: {key}"))),
        }
    }

    async fn get_config(&self, user_id: &str) -> Result<User> {
        Ok(self.configs.get(user_id).map(|u| u.clone()).unwrap_or(User {
            id: user_id.to_string(),
            skip_tour: false,
        }))
    }

    async fn save_config(&self, user: &User) -> Result<()> {
        self.configs.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_texts(&self, user_id: &str) -> Result<Texts> {
        match self.texts.get(user_id) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(entry.value.clone()),
            _ => Ok(Texts::default()),
        }
    }

    async fn save_texts(&self, user_id: &str, texts: &Texts) -> Result<()> {
        self.texts.insert(
            user_id.to_string(),
            Expiring {
                value: texts.clone(),
                expires_at: Instant::now() + ENTRY_TTL,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Part;

    #[tokio::test]
    async fn missing_config_is_zero_valued() {
        let store = MemoryStore::new();
        let user = store.get_config("alice").await.unwrap();
        assert_eq!(user.id, "alice");
        assert!(!user.skip_tour);
    }

    #[tokio::test]
    async fn missing_audio_is_an_error() {
        let store = MemoryStore::new();
        assert!(store.get_audio("audio-alice-01ABC").await.is_err());
    }

    #[tokio::test]
    async fn texts_round_trip() {
        let store = MemoryStore::new();
        let texts = Texts {
            parts: vec![Part {
                id: "1".into(),
                text: "hello".into(),
            }],
        };
        store.save_texts("alice", &texts).await.unwrap();
        let back = store.get_texts("alice").await.unwrap();
        assert_eq!(back, texts);
    }

    #[tokio::test]
    async fn audio_round_trip_produces_wav() {
        let store = MemoryStore::new();
        let chunk = vec![0u8; 640];
        store.save_audio("audio-alice-01ABC", &[chunk]).await.unwrap();
        let wav = store.get_audio("audio-alice-01ABC").await.unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
    }
}
