//! C4c: punctuation restoration with cross-segment memory. HTTP shape
//! grounded on `internal/handlers/punctuator.go`; the ledger/`old-updates`
//! merge algorithm is specified in full by SPEC_FULL.md §4.6.
//!
//! Split into a process-wide `PunctuatorClient` (the pooled HTTP transport,
//! shared across connections per SPEC_FULL.md §5) and a per-connection
//! `Punctuator` that owns its own `SegmentLedger` - the ledger is explicitly
//! *not* shared across connections (§3, §5), so it lives on the connection's
//! own `Punctuator`, constructed fresh by `MiddlewareChain::new` for every
//! WebSocket session.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ledger::SegmentLedger;
use crate::error::{ProxyError, Result};
use crate::model::{FullResult, OldUpdate};

const TIMEOUT: Duration = Duration::from_secs(10);
const MAX_CONTEXT_WORDS: usize = 15;

#[derive(Serialize)]
struct Request<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct Response {
    #[serde(rename = "punctuatedText")]
    #[allow(dead_code)]
    punctuated_text: String,
    original: Vec<String>,
    punctuated: Vec<String>,
}

/// The pooled HTTP transport to the remote punctuator. One instance is
/// shared process-wide (constructed once in `main`), matching
/// `asrHTTPClient()`'s shared `*http.Client` in the source.
pub struct PunctuatorClient {
    client: reqwest::Client,
    url: String,
}

impl PunctuatorClient {
    pub fn new(url: String) -> Result<Self> {
        if url.is_empty() {
            return Err(ProxyError::RemoteEnrichment("no punctuator url".into()));
        }
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| ProxyError::RemoteEnrichment(e.to_string()))?;
        Ok(Self { client, url })
    }

    async fn call_remote(&self, text: &str) -> Result<Response> {
        let resp = self
            .client
            .post(&self.url)
            .json(&Request { text })
            .send()
            .await
            .map_err(|e| ProxyError::RemoteEnrichment(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProxyError::RemoteEnrichment(format!(
                "punctuator returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| ProxyError::RemoteEnrichment(e.to_string()))
    }
}

/// Per-connection punctuator stage: a shared HTTP transport plus this
/// connection's own segment ledger.
pub struct Punctuator {
    client: Arc<PunctuatorClient>,
    ledger: parking_lot::Mutex<SegmentLedger>,
}

impl Punctuator {
    pub fn new(client: Arc<PunctuatorClient>) -> Self {
        Self {
            client,
            ledger: parking_lot::Mutex::new(SegmentLedger::new()),
        }
    }

    pub async fn process(&self, input: FullResult) -> Result<FullResult> {
        let current_text = input.text().trim().to_string();
        if current_text.is_empty() {
            return Ok(input);
        }

        let (context_words, from) = {
            let ledger = self.ledger.lock();
            ledger.collect_context(MAX_CONTEXT_WORDS)
        };

        let mut submitted = context_words.join(" ");
        if !submitted.is_empty() {
            submitted.push(' ');
        }
        submitted.push_str(&current_text);

        let resp = self.client.call_remote(&submitted).await?;

        if resp.original.len() != resp.punctuated.len() {
            return Err(ProxyError::AlignmentMismatch(format!(
                "len(original)={} != len(punctuated)={}",
                resp.original.len(),
                resp.punctuated.len()
            )));
        }

        let mut ledger = self.ledger.lock();
        let changed = ledger
            .merge(
                input.segment,
                input.result.is_final,
                from,
                &resp.original,
                &resp.punctuated,
            )
            .map_err(ProxyError::AlignmentMismatch)?;

        let mut output = input;
        let current_seg = ledger.get(output.segment);
        if let Some(seg) = current_seg {
            if let Some(hyp) = output.result.hypotheses.first_mut() {
                hyp.transcript = seg.joined_punctuated();
            }
        }

        for seg_id in changed {
            if let Some(seg) = ledger.get(seg_id) {
                output.old_updates.push(OldUpdate {
                    segment: seg_id,
                    transcript: seg.joined_punctuated(),
                    is_final: seg.is_final,
                });
            }
        }

        Ok(output)
    }
}
