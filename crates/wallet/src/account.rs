use serde::{Deserialize, Serialize};

/// Capability granted to a wallet account session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    OperationRequest,
    Sign,
    Encrypt,
    Threshold,
}

/// The account a wallet-connection client has authorized, with the scopes its
/// session was granted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: String,
    pub scopes: Vec<PermissionScope>,
}

impl AccountInfo {
    pub fn new(address: impl Into<String>, scopes: Vec<PermissionScope>) -> Self {
        Self { address: address.into(), scopes }
    }

    pub fn has_scope(&self, scope: PermissionScope) -> bool {
        self.scopes.contains(&scope)
    }
}
