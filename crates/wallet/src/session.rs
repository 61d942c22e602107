use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::account::{AccountInfo, PermissionScope};
use crate::client::{ClientFactory, ClientOptions, WalletClient};
use crate::error::Error;
use crate::network::{Network, NetworkType};
use crate::store::{SessionStore, WALLET_CONNECTED_KEY};
use crate::variant::{ClientKind, SessionClient, ToolkitWallet};

pub(crate) const LOG_TARGET: &str = "tzdapp::wallet::session";

/// Scopes a session must hold to be considered connected.
const REQUIRED_SCOPES: [PermissionScope; 2] =
    [PermissionScope::OperationRequest, PermissionScope::Sign];

/// Connect to the wallet.
///
/// Queries the client for its active account unless `known_account` is
/// supplied. When the account is absent or lacks a required scope, a
/// permission request is issued against `network` (falling back to the
/// client's preferred network, then mainnet) and the active account is
/// re-queried, since the grant may have switched it. On success the connected
/// flag is persisted in `store`.
///
/// Returns the resolved account, or `None` when no account could be resolved.
pub async fn connect_wallet<C, S>(
    client: &C,
    store: &S,
    network: Option<&Network>,
    known_account: Option<AccountInfo>,
) -> Result<Option<AccountInfo>, Error>
where
    C: WalletClient,
    S: SessionStore + ?Sized,
{
    let mut account = match known_account {
        Some(account) => Some(account),
        None => client.get_active_account().await?,
    };

    let satisfied = account
        .as_ref()
        .map(|account| REQUIRED_SCOPES.iter().all(|scope| account.has_scope(*scope)))
        .unwrap_or(false);
    if !satisfied {
        let target = resolve_network(network, client.preferred_network());
        debug!(
            target: LOG_TARGET,
            network = %target.network_type.unwrap_or_default(),
            "Requesting wallet permissions."
        );
        client.request_permissions(&target).await?;
        account = client.get_active_account().await?;
    }

    if let Some(account) = &account {
        store.set(WALLET_CONNECTED_KEY, "true");
        info!(target: LOG_TARGET, address = %account.address, "Wallet connected.");
    }

    Ok(account)
}

/// Disconnect from the wallet: clear the persisted flag and tear the client
/// down. Teardown failures are logged, never surfaced.
pub async fn disconnect_wallet<C, S>(client: &C, store: &S)
where
    C: WalletClient,
    S: SessionStore + ?Sized,
{
    store.remove(WALLET_CONNECTED_KEY);
    match client.destroy().await {
        Ok(()) => debug!(target: LOG_TARGET, "Wallet disconnected."),
        Err(error) => {
            warn!(target: LOG_TARGET, error = %error, "Wallet client teardown failed.")
        }
    }
}

fn resolve_network(requested: Option<&Network>, preferred: Option<NetworkType>) -> Network {
    let network_type = requested
        .and_then(|network| network.network_type)
        .or(preferred)
        .unwrap_or_default();
    Network {
        network_type: Some(network_type),
        name: requested.and_then(|network| network.name.clone()),
        rpc_url: requested.and_then(|network| network.rpc_url.clone()),
    }
}

/// Configuration a wallet session is constructed with. Fixed for the
/// session's lifetime.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub client: ClientOptions,
    pub kind: ClientKind,
    /// Network targeted by permission requests, overriding the client's
    /// preference.
    pub network: Option<Network>,
}

struct SessionInner<F: ClientFactory, S> {
    factory: F,
    config: SessionConfig,
    store: S,
    client: RwLock<Option<Arc<SessionClient<F::Client>>>>,
    account: RwLock<Option<AccountInfo>>,
}

/// A wallet session: owns the client lifecycle, the cached account and the
/// persisted connection intent.
pub struct WalletSession<F: ClientFactory, S> {
    inner: Arc<SessionInner<F, S>>,
}

impl<F: ClientFactory, S> Clone for WalletSession<F, S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<F, S> WalletSession<F, S>
where
    F: ClientFactory,
    S: SessionStore,
{
    pub fn new(factory: F, store: S, config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                factory,
                config,
                store,
                client: RwLock::new(None),
                account: RwLock::new(None),
            }),
        }
    }

    /// The session client, created lazily and recreated after a teardown.
    pub fn client(&self) -> Arc<SessionClient<F::Client>> {
        if let Some(client) = self.inner.client.read().as_ref() {
            return client.clone();
        }

        let mut slot = self.inner.client.write();
        if let Some(client) = slot.as_ref() {
            return client.clone();
        }

        debug!(target: LOG_TARGET, kind = %self.inner.config.kind, "Creating wallet client.");
        let client = self.inner.factory.create(&self.inner.config.client);
        let client = Arc::new(match self.inner.config.kind {
            ClientKind::Dapp => SessionClient::Dapp(client),
            ClientKind::Toolkit => SessionClient::Toolkit(ToolkitWallet::new(client)),
        });
        *slot = Some(client.clone());
        client
    }

    pub fn client_kind(&self) -> ClientKind {
        self.inner.config.kind
    }

    /// Whether the session should be considered connected. Read from the
    /// persisted flag, not from the in-memory client slot, so it survives a
    /// reload until reconciled through [`Self::restore`].
    pub fn connected(&self) -> bool {
        self.inner.store.get(WALLET_CONNECTED_KEY).as_deref() == Some("true")
    }

    pub fn active_account(&self) -> Option<AccountInfo> {
        self.inner.account.read().clone()
    }

    /// Connect using the session's configuration and whatever account is
    /// locally cached.
    pub async fn connect(&self) -> Result<Option<AccountInfo>, Error> {
        let client = self.client();
        let cached = self.inner.account.read().clone();
        let account = connect_wallet(
            client.dapp_client(),
            &self.inner.store,
            self.inner.config.network.as_ref(),
            cached,
        )
        .await?;
        *self.inner.account.write() = account.clone();
        Ok(account)
    }

    /// Disconnect and tear the client down. A fresh client is constructed on
    /// next use.
    pub async fn disconnect(&self) {
        let client = self.client();
        disconnect_wallet(client.dapp_client(), &self.inner.store).await;
        *self.inner.client.write() = None;
        *self.inner.account.write() = None;
    }

    /// Restore a persisted session: when the connected flag is set, connect
    /// with the locally cached account; otherwise do nothing.
    pub async fn restore(&self) -> Result<Option<AccountInfo>, Error> {
        if !self.connected() {
            return Ok(None);
        }
        debug!(target: LOG_TARGET, "Restoring persisted wallet session.");
        self.connect().await
    }

    /// A cloneable accessor for UI layers. Handles do not keep the session
    /// alive.
    pub fn handle(&self) -> SessionHandle<F, S> {
        SessionHandle { inner: Arc::downgrade(&self.inner) }
    }
}

/// Weak session accessor handed to UI components. Every operation fails with
/// [`Error::SessionClosed`] once the session itself is dropped.
pub struct SessionHandle<F: ClientFactory, S> {
    inner: Weak<SessionInner<F, S>>,
}

impl<F: ClientFactory, S> Clone for SessionHandle<F, S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<F, S> SessionHandle<F, S>
where
    F: ClientFactory,
    S: SessionStore,
{
    fn session(&self) -> Result<WalletSession<F, S>, Error> {
        self.inner.upgrade().map(|inner| WalletSession { inner }).ok_or(Error::SessionClosed)
    }

    pub fn connected(&self) -> Result<bool, Error> {
        Ok(self.session()?.connected())
    }

    pub fn active_account(&self) -> Result<Option<AccountInfo>, Error> {
        Ok(self.session()?.active_account())
    }

    pub fn client(&self) -> Result<Arc<SessionClient<F::Client>>, Error> {
        Ok(self.session()?.client())
    }

    pub async fn connect(&self) -> Result<Option<AccountInfo>, Error> {
        self.session()?.connect().await
    }

    pub async fn disconnect(&self) -> Result<(), Error> {
        self.session()?.disconnect().await;
        Ok(())
    }
}
