//! Wallet session management over a wallet-connection client.
//!
//! [`WalletSession`] mediates between a UI layer and a [`WalletClient`]
//! collaborator: it decides when a permission request is necessary, persists
//! the connection intent in an injected [`SessionStore`], and tears the client
//! down on disconnect, recreating it lazily on next use. UI layers hold a
//! cloneable [`SessionHandle`]; operations on a handle whose session is gone
//! fail with a typed error instead of panicking.

pub mod account;
pub mod client;
pub mod error;
pub mod network;
pub mod session;
pub mod store;
pub mod variant;


pub use account::{AccountInfo, PermissionScope};
pub use client::{ClientFactory, ClientOptions, MockWalletClient, WalletClient};
pub use error::Error;
pub use network::{Network, NetworkType};
pub use session::{
    connect_wallet, disconnect_wallet, SessionConfig, SessionHandle, WalletSession,
};
pub use store::{FileStore, MemoryStore, SessionStore, WALLET_CONNECTED_KEY};
pub use variant::{ClientKind, SessionClient, ToolkitWallet};
