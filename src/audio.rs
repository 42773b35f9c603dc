//! C6: audio keeper and PCM16LE mono 16kHz → WAV encoding.

use std::io::Cursor;

use crate::error::{ProxyError, Result};

pub const SAMPLE_RATE: u32 = 16_000;
pub const BITS_PER_SAMPLE: u16 = 16;
pub const CHANNELS: u16 = 1;

/// Buffers binary frames for one active `TranscriptionSession`, in arrival
/// order, pending a WAV encode on stop. Grounded on `internal/db/
/// in_memory.go`'s `to_wav`, which concatenates chunks the same way before
/// handing them to the WAV encoder.
#[derive(Debug, Default)]
pub struct AudioKeeper {
    pub id: String,
    chunks: Vec<Vec<u8>>,
}

impl AudioKeeper {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            chunks: Vec::new(),
        }
    }

    pub fn push(&mut self, chunk: Vec<u8>) {
        self.chunks.push(chunk);
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }
}

/// Concatenates PCM16LE mono 16kHz chunks and wraps them in a RIFF/WAVE
/// container.
pub fn encode_wav(chunks: &[Vec<u8>]) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| ProxyError::Store(format!("wav init: {e}")))?;
        for chunk in chunks {
            for frame in chunk.chunks_exact(2) {
                let sample = i16::from_le_bytes([frame[0], frame[1]]);
                writer
                    .write_sample(sample)
                    .map_err(|e| ProxyError::Store(format!("wav write: {e}")))?;
            }
        }
        writer
            .finalize()
            .map_err(|e| ProxyError::Store(format!("wav finalize: {e}")))?;
    }
    Ok(cursor.into_inner())
}
