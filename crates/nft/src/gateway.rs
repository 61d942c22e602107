use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use tracing::debug;

pub(crate) const LOG_TARGET: &str = "tzdapp::nft::gateway";

/// Content gateway collaborator: resolves a content-addressed identifier into
/// the JSON document it points to.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// GET `{base}/{id}` and parse the response body as JSON.
    async fn fetch_json(&self, base: &str, id: &str) -> Result<serde_json::Value>;
}

#[async_trait]
impl<G> ContentGateway for Arc<G>
where
    G: ContentGateway + ?Sized,
{
    async fn fetch_json(&self, base: &str, id: &str) -> Result<serde_json::Value> {
        (**self).fetch_json(base, id).await
    }
}

/// HTTP implementation of [`ContentGateway`].
///
/// No request deadline is applied by default; pass a preconfigured client
/// through [`HttpGateway::with_client`] to set one.
#[derive(Debug, Clone, Default)]
pub struct HttpGateway {
    client: Client,
}

impl HttpGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentGateway for HttpGateway {
    async fn fetch_json(&self, base: &str, id: &str) -> Result<serde_json::Value> {
        let url = format!("{}/{}", base.trim_end_matches('/'), id);
        debug!(target: LOG_TARGET, url = %url, "Fetching metadata document.");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch metadata from gateway")?;
        if !response.status().is_success() {
            anyhow::bail!("Gateway request failed with status: {}", response.status());
        }

        let bytes = response.bytes().await.context("Failed to read response bytes")?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse metadata JSON from response: {bytes:?}"))
    }
}

/// Mock implementation of [`ContentGateway`] to be used for tests only.
/// Documents are declared up front keyed by content identifier, and every
/// requested URL is recorded.
#[derive(Debug, Default)]
pub struct MockGateway {
    documents: HashMap<String, serde_json::Value>,
    requests: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn with_document(mut self, id: &str, document: serde_json::Value) -> Self {
        self.documents.insert(id.to_string(), document);
        self
    }

    /// URLs requested so far, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ContentGateway for MockGateway {
    async fn fetch_json(&self, base: &str, id: &str) -> Result<serde_json::Value> {
        self.requests.lock().push(format!("{base}/{id}"));
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No document found for identifier: {id}"))
    }
}
