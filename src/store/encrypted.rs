//! At-rest encryption wrapper for a persistent `DataStore` backend.
//!
//! The spec scopes the concrete persistent K/V backend (Redis etc.) out as
//! an external collaborator, so this module ships the encryption layer and
//! a small `RawKv` trait any such backend would implement, rather than
//! fabricating a client for one.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use rand::RngCore;

use super::{DataStore, Texts, User};
use crate::error::{ProxyError, Result};

/// Minimal raw byte K/V operations a persistent backend must provide.
/// `EncryptedStore` layers AES-256-GCM on top of this.
#[async_trait]
pub trait RawKv: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<std::time::Duration>) -> Result<()>;
}

/// Wraps a `RawKv` backend with nonce-prepended AES-256-GCM encryption,
/// matching `internal/secure/crypto.go`'s `Crypter` exactly: key must be at
/// least 32 bytes (only the first 32 are used), nonce is generated per call
/// and prepended to the ciphertext on write.
pub struct EncryptedStore<K> {
    backend: K,
    cipher: Aes256Gcm,
}

impl<K: RawKv> EncryptedStore<K> {
    pub fn new(backend: K, key: &[u8]) -> Result<Self> {
        if key.len() < 32 {
            return Err(ProxyError::Store(format!(
                "key length must be >= 32 bytes, got {}",
                key.len()
            )));
        }
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..32]));
        Ok(Self { backend, cipher })
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let mut ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| ProxyError::Store(format!("encrypt failed: {e}")))?;
        let mut out = nonce_bytes.to_vec();
        out.append(&mut ciphertext);
        Ok(out)
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < 12 {
            return Err(ProxyError::Store("ciphertext too short".into()));
        }
        let (nonce_bytes, ciphertext) = data.split_at(12);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| ProxyError::Store(format!("decrypt failed: {e}")))
    }
}

#[async_trait]
impl<K: RawKv> DataStore for EncryptedStore<K> {
    async fn save_audio(&self, key: &str, chunks: &[Vec<u8>]) -> Result<()> {
        let wav = crate::audio::encode_wav(chunks)?;
        let ciphertext = self.encrypt(&wav)?;
        self.backend.set(key, ciphertext, Some(super::ENTRY_TTL)).await
    }

    async fn get_audio(&self, key: &str) -> Result<Vec<u8>> {
        match self.backend.get(key).await? {
            Some(data) => self.decrypt(&data),
            None => Err(ProxyError::Store(format!("not found: {key}"))),
        }
    }

    async fn get_config(&self, user_id: &str) -> Result<User> {
        let key = format!("config-{user_id}");
        match self.backend.get(&key).await? {
            Some(data) => {
                let plain = self.decrypt(&data)?;
                serde_json::from_slice(&plain).map_err(|e| ProxyError::Store(e.to_string()))
            }
            None => Ok(User {
                id: user_id.to_string(),
                skip_tour: false,
            }),
        }
    }

    async fn save_config(&self, user: &User) -> Result<()> {
        let key = format!("config-{}", user.id);
        let plain = serde_json::to_vec(user).map_err(|e| ProxyError::Store(e.to_string()))?;
        let ciphertext = self.encrypt(&plain)?;
        self.backend.set(&key, ciphertext, None).await
    }

    async fn get_texts(&self, user_id: &str) -> Result<Texts> {
        let key = format!("texts-{user_id}");
        match self.backend.get(&key).await? {
            Some(data) => {
                let plain = self.decrypt(&data)?;
                serde_json::from_slice(&plain).map_err(|e| ProxyError::Store(e.to_string()))
            }
            None => Ok(Texts::default()),
        }
    }

    async fn save_texts(&self, user_id: &str, texts: &Texts) -> Result<()> {
        let key = format!("texts-{user_id}");
        let plain = serde_json::to_vec(texts).map_err(|e| ProxyError::Store(e.to_string()))?;
        let ciphertext = self.encrypt(&plain)?;
        self.backend.set(&key, ciphertext, Some(super::ENTRY_TTL)).await
    }
}
