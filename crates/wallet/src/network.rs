use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Networks a wallet client can be scoped to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    #[default]
    Mainnet,
    Ghostnet,
    Custom,
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkType::Mainnet => write!(f, "mainnet"),
            NetworkType::Ghostnet => write!(f, "ghostnet"),
            NetworkType::Custom => write!(f, "custom"),
        }
    }
}

/// Network record sent along a permission request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    #[serde(rename = "type")]
    pub network_type: Option<NetworkType>,
    pub name: Option<String>,
    pub rpc_url: Option<Url>,
}

impl Network {
    pub fn of(network_type: NetworkType) -> Self {
        Self { network_type: Some(network_type), ..Default::default() }
    }
}
