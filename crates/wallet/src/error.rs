use crate::variant::ClientKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The session backing this handle was dropped.
    #[error("Wallet session is closed.")]
    SessionClosed,
    /// A client of a different kind than the session was constructed for was
    /// requested.
    #[error("Session was initialized with client kind `{configured}`; requested `{requested}`.")]
    ClientVariant { configured: ClientKind, requested: ClientKind },
    /// The wallet-connection client rejected an operation, including denied
    /// permission requests. Never retried here.
    #[error(transparent)]
    Wallet(#[from] anyhow::Error),
}
