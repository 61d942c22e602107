use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifier of one asset inside a contract's metadata storage.
///
/// Storage maps are keyed either by token index or by name, so both shapes are
/// accepted and carried through to the toolkit collaborator untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetId {
    Index(u64),
    Name(String),
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Index(index) => write!(f, "{index}"),
            AssetId::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<u64> for AssetId {
    fn from(index: u64) -> Self {
        AssetId::Index(index)
    }
}

impl From<&str> for AssetId {
    fn from(name: &str) -> Self {
        AssetId::Name(name.to_string())
    }
}

impl From<String> for AssetId {
    fn from(name: String) -> Self {
        AssetId::Name(name)
    }
}

/// Raw storage entry of one token: the on-chain metadata sub-map, with values
/// hex-encoded as stored. The empty key holds the content-addressed pointer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub token_info: HashMap<String, String>,
}

impl TokenEntry {
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.token_info.insert(key.into(), value.into());
        self
    }
}

/// Blockchain toolkit collaborator: resolves contract handles on the node the
/// client is bound to. The transport lives entirely behind this trait.
#[async_trait]
pub trait ChainToolkit: Send + Sync {
    type Storage: ContractStorage + Send + Sync;

    /// Resolve the storage handle of the contract deployed at `address`.
    async fn contract_at(&self, address: &str) -> Result<Self::Storage>;
}

/// Accessor over a contract's on-chain key-value storage.
#[async_trait]
pub trait ContractStorage: Send + Sync {
    /// Read the `location` sub-map at each of `assets`, in request order.
    /// Identifiers with no entry map to `None`.
    async fn get_multiple_values(
        &self,
        location: &str,
        assets: &[AssetId],
    ) -> Result<Vec<Option<TokenEntry>>>;
}

#[async_trait]
impl<T> ChainToolkit for Arc<T>
where
    T: ChainToolkit + ?Sized,
{
    type Storage = T::Storage;

    async fn contract_at(&self, address: &str) -> Result<Self::Storage> {
        (**self).contract_at(address).await
    }
}

/// Constructs toolkit clients bound to an RPC endpoint. [`crate::AssetQuery`]
/// uses this to rebind the client when the endpoint options change.
pub trait ToolkitFactory: Send + Sync {
    type Toolkit: ChainToolkit;

    fn create(&self, endpoint: &str) -> Self::Toolkit;
}

/// Mock implementation of [`ChainToolkit`] to be used for tests only.
/// Contracts and their storage entries are declared up front with
/// [`MockToolkit::with_entry`].
#[derive(Debug, Default)]
pub struct MockToolkit {
    contracts: HashMap<String, MockStorage>,
    contract_at_calls: AtomicUsize,
}

impl MockToolkit {
    pub fn with_entry(
        mut self,
        contract: &str,
        location: &str,
        asset: impl Into<AssetId>,
        entry: TokenEntry,
    ) -> Self {
        self.contracts
            .entry(contract.to_string())
            .or_default()
            .locations
            .entry(location.to_string())
            .or_default()
            .insert(asset.into(), entry);
        self
    }

    pub fn contract_at_calls(&self) -> usize {
        self.contract_at_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainToolkit for MockToolkit {
    type Storage = MockStorage;

    async fn contract_at(&self, address: &str) -> Result<MockStorage> {
        self.contract_at_calls.fetch_add(1, Ordering::SeqCst);
        self.contracts
            .get(address)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No contract deployed at {address}"))
    }
}

/// Storage handle returned by [`MockToolkit`].
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    locations: HashMap<String, HashMap<AssetId, TokenEntry>>,
}

#[async_trait]
impl ContractStorage for MockStorage {
    async fn get_multiple_values(
        &self,
        location: &str,
        assets: &[AssetId],
    ) -> Result<Vec<Option<TokenEntry>>> {
        let entries = self
            .locations
            .get(location)
            .ok_or_else(|| anyhow::anyhow!("Unknown storage location `{location}`"))?;
        Ok(assets.iter().map(|asset| entries.get(asset).cloned()).collect())
    }
}
