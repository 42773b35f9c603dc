//! C4b: number-phrase joiner. Grounded on `internal/handlers/num_joiner.go`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::{ProxyError, Result};
use crate::model::FullResult;

const TIMEOUT: Duration = Duration::from_secs(3);
const MAX_CONNS_PER_HOST: usize = 5;

#[derive(Serialize)]
struct Request<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct Response {
    result: String,
}

pub struct Joiner {
    client: reqwest::Client,
    url: String,
    /// Caps concurrent in-flight requests the way `newTransport()`'s
    /// `MaxConnsPerHost = 5` caps connections; `pool_max_idle_per_host`
    /// alone only bounds idle connections, not active ones.
    inflight: Arc<Semaphore>,
}

impl Joiner {
    /// Pool tuning matches `newTransport()` in `num_joiner.go`: 5 max
    /// connections per host, 2 idle overall, 2 idle per host, 90s idle
    /// timeout.
    pub fn new(url: String) -> Result<Self> {
        if url.is_empty() {
            return Err(ProxyError::RemoteEnrichment("no joiner url".into()));
        }
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| ProxyError::RemoteEnrichment(e.to_string()))?;
        Ok(Self {
            client,
            url,
            inflight: Arc::new(Semaphore::new(MAX_CONNS_PER_HOST)),
        })
    }

    pub async fn process(&self, mut input: FullResult) -> Result<FullResult> {
        if let Some(hyp) = input.result.hypotheses.first().cloned() {
            let joined = self.transform(&hyp.transcript).await?;
            input.result.hypotheses[0].transcript = joined;
        }
        Ok(input)
    }

    async fn transform(&self, text: &str) -> Result<String> {
        let _permit = self.inflight.acquire().await.expect("semaphore never closed");
        let resp = self
            .client
            .post(&self.url)
            .json(&Request { text })
            .send()
            .await
            .map_err(|e| ProxyError::RemoteEnrichment(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProxyError::RemoteEnrichment(format!(
                "joiner returned {}",
                resp.status()
            )));
        }

        let parsed: Response = resp
            .json()
            .await
            .map_err(|e| ProxyError::RemoteEnrichment(e.to_string()))?;
        Ok(parsed.result)
    }
}
