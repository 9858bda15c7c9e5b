use {
    serde::{Deserialize, Serialize},
    url::Url,
};

/// Identifier of a chain within the Abacus protocol.
pub type Domain = u32;

/// A chain onto which the core contracts are deployed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub name: String,
    pub domain: Domain,
    pub rpc_url: Url,
}
