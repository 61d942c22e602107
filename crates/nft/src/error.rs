#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The chain toolkit collaborator failed: unreachable contract, unknown
    /// storage location or a node-side error.
    #[error("Chain toolkit error: {0}")]
    Toolkit(#[source] anyhow::Error),
    /// The content gateway fetch failed or returned a non-success status.
    #[error("Gateway fetch failed: {0}")]
    Gateway(#[source] anyhow::Error),
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
    #[error("Decoded pointer is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
