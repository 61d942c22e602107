use serde::{Deserialize, Serialize};

pub const DEFAULT_RPC_URL: &str = "https://mainnet.smartpy.io";
pub const DEFAULT_RPC_PORT: u16 = 443;
pub const DEFAULT_LOCATION: &str = "token_metadata";
pub const DEFAULT_GATEWAY: &str = "https://cloudflare-ipfs.com/ipfs";
pub const DEFAULT_URI_PREFIX: &str = "ipfs://";

/// Resolution options of one asset metadata request. Immutable per request;
/// changing any field re-runs the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// RPC URL the toolkit client is bound to.
    pub rpc_url: String,
    /// RPC port the toolkit client is bound to.
    pub rpc_port: u16,
    /// Storage location (big map key) holding token metadata.
    pub location: String,
    /// Gateway base URL used to resolve content-addressed pointers.
    pub gateway: String,
    /// Scheme prefix stripped from decoded pointers when present.
    pub uri_prefix: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            rpc_port: DEFAULT_RPC_PORT,
            location: DEFAULT_LOCATION.to_string(),
            gateway: DEFAULT_GATEWAY.to_string(),
            uri_prefix: DEFAULT_URI_PREFIX.to_string(),
        }
    }
}

impl FetchOptions {
    /// The RPC endpoint the toolkit client must be bound to.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.rpc_url, self.rpc_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let options = FetchOptions::default();
        assert_eq!(options.endpoint(), "https://mainnet.smartpy.io:443");
        assert_eq!(options.location, "token_metadata");
        assert_eq!(options.uri_prefix, "ipfs://");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: FetchOptions =
            serde_json::from_str(r#"{"gateway": "https://ipfs.io/ipfs"}"#).unwrap();
        assert_eq!(options.gateway, "https://ipfs.io/ipfs");
        assert_eq!(options.rpc_port, DEFAULT_RPC_PORT);
    }
}
