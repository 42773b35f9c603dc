//! Wire types shared by the codec, middleware chain and record session.

use serde::{Deserialize, Serialize};

/// One word's timing/confidence from the backend's forced alignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordAlignment {
    pub start: f64,
    pub length: f64,
    pub word: String,
    #[serde(default)]
    pub confidence: f64,
}

/// One candidate transcription. Hypothesis 0 is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Hypothesis {
    pub transcript: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub word_alignment: Vec<WordAlignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TranscriptResult {
    #[serde(default)]
    pub hypotheses: Vec<Hypothesis>,
    #[serde(rename = "final", default)]
    pub is_final: bool,
}

/// A correction to an already-emitted, previously final segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OldUpdate {
    pub segment: i64,
    pub transcript: String,
    #[serde(rename = "final")]
    pub is_final: bool,
}

/// The backend's per-utterance envelope, extended with this proxy's own
/// control/correction fields on emit.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FullResult {
    #[serde(default)]
    pub status: i32,
    #[serde(rename = "segment-start", default)]
    pub segment_start: f64,
    #[serde(rename = "segment-length", default)]
    pub segment_length: f64,
    #[serde(rename = "total-length", default)]
    pub total_length: f64,
    #[serde(default, skip_serializing_if = "is_default_result")]
    pub result: TranscriptResult,
    #[serde(default)]
    pub segment: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(rename = "transcription-id", default, skip_serializing_if = "Option::is_none")]
    pub transcription_id: Option<String>,
    #[serde(rename = "old-updates", default, skip_serializing_if = "Vec::is_empty")]
    pub old_updates: Vec<OldUpdate>,
}

fn is_default_result(r: &TranscriptResult) -> bool {
    r.hypotheses.is_empty() && !r.is_final
}

impl FullResult {
    /// A bare control-event frame, e.g. `{event: "START_TRANSCRIPTION"}`.
    pub fn event_only(event: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            ..Default::default()
        }
    }

    pub fn with_transcription_id(mut self, id: impl Into<String>) -> Self {
        self.transcription_id = Some(id.into());
        self
    }

    pub fn text(&self) -> &str {
        self.result
            .hypotheses
            .first()
            .map(|h| h.transcript.as_str())
            .unwrap_or("")
    }
}

/// Decodes a text frame payload into a `FullResult`.
pub fn decode(payload: &str) -> Result<FullResult, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Encodes a `FullResult` back into a text frame payload.
pub fn encode(value: &FullResult) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_minimal_result() {
        let input = r#"{"status":0,"segment-start":0.0,"segment-length":1.2,"total-length":1.2,"segment":3,"result":{"hypotheses":[{"transcript":"labas"}],"final":true}}"#;
        let decoded = decode(input).unwrap();
        assert_eq!(decoded.text(), "labas");
        assert!(decoded.result.is_final);
        assert_eq!(decoded.segment, 3);
    }

    #[test]
    fn event_only_frame_omits_result() {
        let ev = FullResult::event_only("START_TRANSCRIPTION").with_transcription_id("01ABC");
        let encoded = encode(&ev).unwrap();
        assert!(encoded.contains("\"event\":\"START_TRANSCRIPTION\""));
        assert!(!encoded.contains("\"result\""));
    }

    #[test]
    fn old_updates_round_trip() {
        let mut fr = FullResult::default();
        fr.old_updates.push(OldUpdate {
            segment: 0,
            transcript: "Labas,".into(),
            is_final: true,
        });
        let encoded = encode(&fr).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.old_updates.len(), 1);
        assert_eq!(decoded.old_updates[0].segment, 0);
    }
}
