use {
    abacus_types::Domain,
    alloy::{primitives::Address, transports::TransportError},
    thiserror::Error,
};

/// A failure to read the on-chain state a check depends on.
///
/// These abort the run. A deployment that reads fine but is wrong shows up as
/// a violation in the report instead.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("no provider configured for domain {0}")]
    NoProvider(Domain),

    /// The address has no code, so a call returned no data.
    #[error("no contract at {address} on domain {domain}")]
    NoContract { domain: Domain, address: Address },

    #[error("call to `{method}` on {address} (domain {domain}) failed: {source}")]
    Contract {
        domain: Domain,
        address: Address,
        method: &'static str,
        #[source]
        source: alloy::contract::Error,
    },

    #[error("transport error on domain {domain}: {source}")]
    Transport {
        domain: Domain,
        #[source]
        source: TransportError,
    },
}

pub type CheckResult<T> = core::result::Result<T, CheckError>;
