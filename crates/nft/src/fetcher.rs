use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Error;
use crate::gateway::ContentGateway;
use crate::options::FetchOptions;
use crate::resolver::{extract_pointers, resolve_documents};
use crate::toolkit::{AssetId, ChainToolkit, ContractStorage};

pub(crate) const LOG_TARGET: &str = "tzdapp::nft::fetcher";

/// Run the full resolution pipeline once: resolve the contract's storage
/// handle, read the metadata sub-map at each identifier, decode the embedded
/// pointers and fetch the pointed-to documents.
pub(crate) async fn run_pipeline<T, G>(
    toolkit: &T,
    gateway: &G,
    contract: &str,
    assets: &[AssetId],
    options: &FetchOptions,
) -> Result<Vec<serde_json::Value>, Error>
where
    T: ChainToolkit,
    G: ContentGateway,
{
    debug!(
        target: LOG_TARGET,
        contract = %contract,
        assets = assets.len(),
        location = %options.location,
        "Fetching asset metadata."
    );

    let storage = toolkit.contract_at(contract).await.map_err(Error::Toolkit)?;
    let entries =
        storage.get_multiple_values(&options.location, assets).await.map_err(Error::Toolkit)?;
    let pointers = extract_pointers(&entries, &options.uri_prefix)?;
    resolve_documents(gateway, &options.gateway, &pointers).await
}

/// One-shot asset metadata fetcher over a bound toolkit client.
#[derive(Debug)]
pub struct NftFetcher<T, G> {
    toolkit: T,
    gateway: G,
    options: FetchOptions,
}

impl<T, G> NftFetcher<T, G>
where
    T: ChainToolkit,
    G: ContentGateway,
{
    pub fn new(toolkit: T, gateway: G) -> Self {
        Self::with_options(toolkit, gateway, FetchOptions::default())
    }

    pub fn with_options(toolkit: T, gateway: G, options: FetchOptions) -> Self {
        Self { toolkit, gateway, options }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch the metadata documents of `assets`, in the order their storage
    /// entries were scanned. Identifiers without a metadata entry are skipped.
    pub async fn fetch_assets<D: DeserializeOwned>(
        &self,
        contract: &str,
        assets: &[AssetId],
    ) -> Result<Vec<D>, Error> {
        let documents = self.fetch_raw(contract, assets).await?;
        documents
            .into_iter()
            .map(|document| serde_json::from_value(document).map_err(Error::Json))
            .collect()
    }

    /// [`Self::fetch_assets`] without the typed decoding step.
    pub async fn fetch_raw(
        &self,
        contract: &str,
        assets: &[AssetId],
    ) -> Result<Vec<serde_json::Value>, Error> {
        run_pipeline(&self.toolkit, &self.gateway, contract, assets, &self.options).await
    }
}
