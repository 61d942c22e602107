//! Asset metadata resolution for contract-held NFTs.
//!
//! Given a contract address and a list of asset identifiers, this crate reads
//! the contract's on-chain metadata storage through a [`ChainToolkit`]
//! collaborator, decodes the content-addressed pointer embedded in each entry,
//! and resolves the pointed-to JSON documents through a [`ContentGateway`].
//!
//! [`NftFetcher`] is the one-shot pipeline; [`AssetQuery`] tracks request
//! inputs and exposes a `{loading, data, error}` resolution state for UI
//! layers, re-running the pipeline whenever an input changes.

pub mod error;
pub mod fetcher;
pub mod gateway;
pub mod options;
pub mod query;
pub mod resolver;
pub mod toolkit;

#[cfg(test)]
mod query_test;

pub use error::Error;
pub use fetcher::NftFetcher;
pub use gateway::{ContentGateway, HttpGateway, MockGateway};
pub use options::FetchOptions;
pub use query::{AssetQuery, Resolution};
pub use toolkit::{
    AssetId, ChainToolkit, ContractStorage, MockStorage, MockToolkit, TokenEntry, ToolkitFactory,
};
