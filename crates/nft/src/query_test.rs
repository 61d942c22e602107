use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use assert_matches::assert_matches;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Semaphore;

use crate::error::Error;
use crate::gateway::{ContentGateway, MockGateway};
use crate::options::FetchOptions;
use crate::query::AssetQuery;
use crate::toolkit::{AssetId, MockToolkit, TokenEntry, ToolkitFactory};
use crate::NftFetcher;

const CONTRACT: &str = "KT1RJ6PbjHpwc3M5rw5s2Nbmefwbuwbdxton";

fn pointer_entry(uri: &str) -> TokenEntry {
    TokenEntry::default().with_info("", hex::encode(uri))
}

fn two_token_toolkit() -> MockToolkit {
    MockToolkit::default()
        .with_entry(CONTRACT, "token_metadata", "270248", pointer_entry("ipfs://bafyone"))
        .with_entry(CONTRACT, "token_metadata", "270560", pointer_entry("ipfs://bafytwo"))
}

fn two_token_gateway() -> MockGateway {
    MockGateway::default()
        .with_document("bafyone", json!({ "name": "Token 270248" }))
        .with_document("bafytwo", json!({ "name": "Token 270560" }))
}

#[derive(Clone)]
struct MockFactory {
    toolkit: Arc<MockToolkit>,
    created: Arc<AtomicUsize>,
}

impl MockFactory {
    fn new(toolkit: MockToolkit) -> Self {
        Self { toolkit: Arc::new(toolkit), created: Arc::new(AtomicUsize::new(0)) }
    }

    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ToolkitFactory for MockFactory {
    type Toolkit = Arc<MockToolkit>;

    fn create(&self, _endpoint: &str) -> Arc<MockToolkit> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.toolkit.clone()
    }
}

/// Gateway whose fetches block until the test releases the gate.
#[derive(Clone)]
struct GatedGateway {
    inner: Arc<MockGateway>,
    gate: Arc<Semaphore>,
}

impl GatedGateway {
    fn new(inner: MockGateway) -> Self {
        Self { inner: Arc::new(inner), gate: Arc::new(Semaphore::new(0)) }
    }

    fn release(&self, fetches: usize) {
        self.gate.add_permits(fetches);
    }
}

#[async_trait]
impl ContentGateway for GatedGateway {
    async fn fetch_json(&self, base: &str, id: &str) -> Result<serde_json::Value> {
        self.gate.acquire().await.expect("gate closed").forget();
        self.inner.fetch_json(base, id).await
    }
}

#[tokio::test]
async fn test_fetches_scanned_entries_in_order() {
    let gateway = Arc::new(two_token_gateway());
    let fetcher = NftFetcher::new(two_token_toolkit(), gateway.clone());

    let assets = [AssetId::from("270248"), AssetId::from("270560")];
    let documents = fetcher.fetch_raw(CONTRACT, &assets).await.unwrap();

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0], json!({ "name": "Token 270248" }));
    assert_eq!(documents[1], json!({ "name": "Token 270560" }));
    assert_eq!(
        gateway.requests(),
        vec![
            "https://cloudflare-ipfs.com/ipfs/bafyone".to_string(),
            "https://cloudflare-ipfs.com/ipfs/bafytwo".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_skips_assets_without_metadata_entry() {
    let fetcher = NftFetcher::new(two_token_toolkit(), Arc::new(two_token_gateway()));

    let assets =
        [AssetId::from("270248"), AssetId::from("no-such-token"), AssetId::from("270560")];
    let documents = fetcher.fetch_raw(CONTRACT, &assets).await.unwrap();

    // Skipped identifiers leave no holes.
    assert_eq!(documents.len(), 2);
}

#[tokio::test]
async fn test_fetch_assets_decodes_documents() {
    #[derive(Debug, Deserialize)]
    struct Metadata {
        name: String,
    }

    let fetcher = NftFetcher::new(two_token_toolkit(), Arc::new(two_token_gateway()));

    let documents: Vec<Metadata> =
        fetcher.fetch_assets(CONTRACT, &[AssetId::from("270248")]).await.unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].name, "Token 270248");
}

#[tokio::test]
async fn test_unreachable_contract_is_a_toolkit_error() {
    let fetcher = NftFetcher::new(two_token_toolkit(), Arc::new(two_token_gateway()));

    let result = fetcher.fetch_raw("KT1Unknown", &[AssetId::from("270248")]).await;

    assert_matches!(result, Err(Error::Toolkit(_)));
}

#[tokio::test]
async fn test_query_is_loading_until_settlement() {
    let gateway = GatedGateway::new(two_token_gateway());
    let query =
        Arc::new(AssetQuery::new(MockFactory::new(two_token_toolkit()), gateway.clone()));

    let pending = {
        let query = query.clone();
        tokio::spawn(async move {
            query.fetch(CONTRACT, &[AssetId::from("270248")], FetchOptions::default()).await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let state = query.state();
    assert!(state.loading);
    assert!(state.data.is_none());
    assert!(state.error.is_none());

    gateway.release(1);
    let resolution = pending.await.unwrap();
    assert!(resolution.is_settled());
    assert_eq!(resolution.data.unwrap().len(), 1);
    assert!(resolution.error.is_none());
    assert!(query.state().is_settled());
}

#[tokio::test]
async fn test_query_settles_with_error_on_failed_fetch() {
    // No document behind the pointer: the gateway fetch rejects.
    let gateway = Arc::new(MockGateway::default());
    let query = AssetQuery::new(MockFactory::new(two_token_toolkit()), gateway);

    let resolution =
        query.fetch(CONTRACT, &[AssetId::from("270248")], FetchOptions::default()).await;

    assert!(!resolution.loading);
    assert!(resolution.data.is_none());
    assert_matches!(resolution.error.as_deref(), Some(Error::Gateway(_)));
}

#[tokio::test]
async fn test_unchanged_inputs_do_not_rerun() {
    let factory = MockFactory::new(two_token_toolkit());
    let query = AssetQuery::new(factory.clone(), Arc::new(two_token_gateway()));
    let assets = [AssetId::from("270248")];

    query.fetch(CONTRACT, &assets, FetchOptions::default()).await;
    query.fetch(CONTRACT, &assets, FetchOptions::default()).await;

    assert_eq!(factory.created(), 1);
    assert_eq!(factory.toolkit.contract_at_calls(), 1);
}

#[tokio::test]
async fn test_changed_inputs_rerun_pipeline() {
    let factory = MockFactory::new(two_token_toolkit());
    let query = AssetQuery::new(factory.clone(), Arc::new(two_token_gateway()));

    query.fetch(CONTRACT, &[AssetId::from("270248")], FetchOptions::default()).await;
    // Element-wise change of the identifier list.
    query
        .fetch(CONTRACT, &[AssetId::from("270248"), AssetId::from("270560")], FetchOptions::default())
        .await;

    assert_eq!(factory.toolkit.contract_at_calls(), 2);
    // Same endpoint: the toolkit client is kept.
    assert_eq!(factory.created(), 1);

    // An endpoint change rebinds the toolkit client.
    let options = FetchOptions { rpc_url: "https://ghostnet.smartpy.io".to_string(), ..Default::default() };
    query.fetch(CONTRACT, &[AssetId::from("270248")], options).await;
    assert_eq!(factory.created(), 2);
}

#[tokio::test]
async fn test_stale_fetch_does_not_clobber_newer_resolution() {
    let toolkit = MockToolkit::default()
        .with_entry(CONTRACT, "token_metadata", "slow", pointer_entry("ipfs://bafyslow"))
        // No pointer: resolving this identifier performs no gateway fetch.
        .with_entry(CONTRACT, "token_metadata", "empty", TokenEntry::default());
    let gateway =
        GatedGateway::new(MockGateway::default().with_document("bafyslow", json!({ "id": 1 })));
    let query = Arc::new(AssetQuery::new(MockFactory::new(toolkit), gateway.clone()));

    let stale = {
        let query = query.clone();
        tokio::spawn(async move {
            query.fetch(CONTRACT, &[AssetId::from("slow")], FetchOptions::default()).await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // A newer fetch for different inputs settles while the first is in flight.
    let newer = query.fetch(CONTRACT, &[AssetId::from("empty")], FetchOptions::default()).await;
    assert_eq!(newer.data.as_ref().unwrap().len(), 0);

    gateway.release(1);
    let stale = stale.await.unwrap();

    // The stale invocation still observes its own result...
    assert_eq!(stale.data.as_ref().unwrap().len(), 1);
    // ...but the published state belongs to the newer fetch.
    let state = query.state();
    assert!(state.is_settled());
    assert_eq!(state.data.unwrap().len(), 0);
}
