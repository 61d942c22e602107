use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::WalletClient;
use crate::error::Error;

/// Which underlying client implementation a session drives. Fixed for the
/// lifetime of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// The wallet-connection client used directly.
    #[default]
    Dapp,
    /// The toolkit wallet adapter around the wallet-connection client.
    Toolkit,
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientKind::Dapp => write!(f, "dapp"),
            ClientKind::Toolkit => write!(f, "toolkit"),
        }
    }
}

/// Adapter handing the wallet-connection client to a contract toolkit.
#[derive(Debug)]
pub struct ToolkitWallet<C> {
    client: C,
}

impl<C: WalletClient> ToolkitWallet<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The wallet-connection client performing the actual wallet operations.
    pub fn client(&self) -> &C {
        &self.client
    }
}

/// The client a session was constructed with: either the wallet-connection
/// client itself or the toolkit wallet adapter around one.
#[derive(Debug)]
pub enum SessionClient<C> {
    Dapp(C),
    Toolkit(ToolkitWallet<C>),
}

impl<C: WalletClient> SessionClient<C> {
    pub fn kind(&self) -> ClientKind {
        match self {
            SessionClient::Dapp(_) => ClientKind::Dapp,
            SessionClient::Toolkit(_) => ClientKind::Toolkit,
        }
    }

    /// Unwrap to the client actually performing wallet operations, whichever
    /// variant the session was constructed for.
    pub fn dapp_client(&self) -> &C {
        match self {
            SessionClient::Dapp(client) => client,
            SessionClient::Toolkit(wallet) => wallet.client(),
        }
    }

    /// The toolkit wallet adapter. Fails when the session was constructed for
    /// direct client use.
    pub fn toolkit_wallet(&self) -> Result<&ToolkitWallet<C>, Error> {
        match self {
            SessionClient::Toolkit(wallet) => Ok(wallet),
            SessionClient::Dapp(_) => Err(Error::ClientVariant {
                configured: ClientKind::Dapp,
                requested: ClientKind::Toolkit,
            }),
        }
    }
}
