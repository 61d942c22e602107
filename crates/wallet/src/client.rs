use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::account::AccountInfo;
use crate::network::{Network, NetworkType};

/// Options a wallet-connection client is constructed with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Application name shown in the wallet pairing dialog.
    pub app_name: String,
    pub preferred_network: Option<NetworkType>,
}

impl ClientOptions {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self { app_name: app_name.into(), preferred_network: None }
    }

    pub fn with_preferred_network(mut self, network: NetworkType) -> Self {
        self.preferred_network = Some(network);
        self
    }
}

/// Wallet-connection client collaborator. The pairing transport lives
/// entirely behind this trait.
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Network the client was constructed to prefer, if any.
    fn preferred_network(&self) -> Option<NetworkType>;

    /// The account currently authorized for this client, if any.
    async fn get_active_account(&self) -> Result<Option<AccountInfo>>;

    /// Ask the wallet to grant permissions on `network`. Denials reject.
    async fn request_permissions(&self, network: &Network) -> Result<()>;

    /// Tear the client down. The client is unusable afterwards; a session
    /// constructs a fresh one on next use.
    async fn destroy(&self) -> Result<()>;
}

#[async_trait]
impl<C> WalletClient for Arc<C>
where
    C: WalletClient + ?Sized,
{
    fn preferred_network(&self) -> Option<NetworkType> {
        (**self).preferred_network()
    }

    async fn get_active_account(&self) -> Result<Option<AccountInfo>> {
        (**self).get_active_account().await
    }

    async fn request_permissions(&self, network: &Network) -> Result<()> {
        (**self).request_permissions(network).await
    }

    async fn destroy(&self) -> Result<()> {
        (**self).destroy().await
    }
}

/// Constructs wallet-connection clients. A session creates its client once,
/// destroys it on disconnect and asks the factory again on next use.
pub trait ClientFactory: Send + Sync {
    type Client: WalletClient;

    fn create(&self, options: &ClientOptions) -> Self::Client;
}

/// Mock implementation of [`WalletClient`] to be used for tests only.
/// Records every call and simulates permission grants by swapping the active
/// account for the configured granted one.
#[derive(Debug, Default)]
pub struct MockWalletClient {
    preferred: Option<NetworkType>,
    active: Mutex<Option<AccountInfo>>,
    granted: Option<AccountInfo>,
    deny: bool,
    get_active_calls: AtomicUsize,
    request_calls: AtomicUsize,
    destroy_calls: AtomicUsize,
    last_request: Mutex<Option<Network>>,
}

impl MockWalletClient {
    /// Account reported as active before any permission request.
    pub fn with_active_account(self, account: AccountInfo) -> Self {
        *self.active.lock() = Some(account);
        self
    }

    /// Account that becomes active once permissions are granted.
    pub fn with_granted_account(mut self, account: AccountInfo) -> Self {
        self.granted = Some(account);
        self
    }

    pub fn with_preferred_network(mut self, network: NetworkType) -> Self {
        self.preferred = Some(network);
        self
    }

    /// Make permission requests reject.
    pub fn denying_permissions(mut self) -> Self {
        self.deny = true;
        self
    }

    pub fn get_active_calls(&self) -> usize {
        self.get_active_calls.load(Ordering::SeqCst)
    }

    pub fn request_calls(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }

    /// Network of the most recent permission request.
    pub fn last_requested_network(&self) -> Option<Network> {
        self.last_request.lock().clone()
    }
}

#[async_trait]
impl WalletClient for MockWalletClient {
    fn preferred_network(&self) -> Option<NetworkType> {
        self.preferred
    }

    async fn get_active_account(&self) -> Result<Option<AccountInfo>> {
        self.get_active_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.active.lock().clone())
    }

    async fn request_permissions(&self, network: &Network) -> Result<()> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(network.clone());
        if self.deny {
            anyhow::bail!("Permission request denied");
        }
        *self.active.lock() = self.granted.clone();
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
