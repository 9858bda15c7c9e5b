use {
    crate::{
        CheckError, CheckResult, ContractReader,
        contract_bindings::{GovernanceRouter, Home, Ownable, ValidatorManager, XAppConnectionManager},
    },
    abacus_types::{CoreDeploy, Domain},
    alloy::{
        primitives::{Address, B256, U256},
        providers::{DynProvider, Provider, ProviderBuilder},
    },
    async_trait::async_trait,
    std::collections::BTreeMap,
    url::Url,
};

/// [`ContractReader`] that talks to each domain's chain over JSON-RPC.
#[derive(Clone, Default)]
pub struct AlloyReader {
    providers: BTreeMap<Domain, DynProvider>,
}

impl AlloyReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, domain: Domain, provider: DynProvider) -> Self {
        self.providers.insert(domain, provider);
        self
    }

    /// Connects to the RPC endpoint recorded for every deployment. An entry in
    /// `overrides`, keyed by chain name, replaces the recorded endpoint.
    pub fn connect_http(deploys: &[CoreDeploy], overrides: &BTreeMap<String, Url>) -> Self {
        deploys.iter().fold(Self::new(), |reader, deploy| {
            let url = overrides
                .get(&deploy.chain.name)
                .unwrap_or(&deploy.chain.rpc_url)
                .clone();

            tracing::debug!(
                chain = %deploy.chain.name,
                domain = deploy.domain(),
                %url,
                "Connecting to chain"
            );

            let provider = ProviderBuilder::new().connect_http(url).erased();

            reader.with_provider(deploy.domain(), provider)
        })
    }

    fn provider(&self, domain: Domain) -> CheckResult<&DynProvider> {
        self.providers
            .get(&domain)
            .ok_or(CheckError::NoProvider(domain))
    }
}

/// A call that returns no data at all hit an address without code.
fn contract_error(
    domain: Domain,
    address: Address,
    method: &'static str,
) -> impl FnOnce(alloy::contract::Error) -> CheckError {
    move |source| match source {
        alloy::contract::Error::ZeroData(..) => CheckError::NoContract { domain, address },
        source => CheckError::Contract {
            domain,
            address,
            method,
            source,
        },
    }
}

#[async_trait]
impl ContractReader for AlloyReader {
    async fn owner(&self, domain: Domain, contract: Address) -> CheckResult<Address> {
        tracing::trace!(domain, %contract, "owner()");

        Ownable::new(contract, self.provider(domain)?)
            .owner()
            .call()
            .await
            .map_err(contract_error(domain, contract, "owner"))
    }

    async fn validator_manager(&self, domain: Domain, home: Address) -> CheckResult<Address> {
        tracing::trace!(domain, %home, "validatorManager()");

        Home::new(home, self.provider(domain)?)
            .validatorManager()
            .call()
            .await
            .map_err(contract_error(domain, home, "validatorManager"))
    }

    async fn local_domain(&self, domain: Domain, home: Address) -> CheckResult<Domain> {
        tracing::trace!(domain, %home, "localDomain()");

        Home::new(home, self.provider(domain)?)
            .localDomain()
            .call()
            .await
            .map_err(contract_error(domain, home, "localDomain"))
    }

    async fn validators(
        &self,
        domain: Domain,
        validator_manager: Address,
        remote: Domain,
    ) -> CheckResult<Address> {
        tracing::trace!(domain, %validator_manager, remote, "validators()");

        ValidatorManager::new(validator_manager, self.provider(domain)?)
            .validators(remote)
            .call()
            .await
            .map_err(contract_error(domain, validator_manager, "validators"))
    }

    async fn routers(
        &self,
        domain: Domain,
        governance_router: Address,
        remote: Domain,
    ) -> CheckResult<B256> {
        tracing::trace!(domain, %governance_router, remote, "routers()");

        GovernanceRouter::new(governance_router, self.provider(domain)?)
            .routers(remote)
            .call()
            .await
            .map_err(contract_error(domain, governance_router, "routers"))
    }

    async fn governor_domain(
        &self,
        domain: Domain,
        governance_router: Address,
    ) -> CheckResult<Domain> {
        tracing::trace!(domain, %governance_router, "governorDomain()");

        GovernanceRouter::new(governance_router, self.provider(domain)?)
            .governorDomain()
            .call()
            .await
            .map_err(contract_error(domain, governance_router, "governorDomain"))
    }

    async fn governor(&self, domain: Domain, governance_router: Address) -> CheckResult<Address> {
        tracing::trace!(domain, %governance_router, "governor()");

        GovernanceRouter::new(governance_router, self.provider(domain)?)
            .governor()
            .call()
            .await
            .map_err(contract_error(domain, governance_router, "governor"))
    }

    async fn domain_to_replica(
        &self,
        domain: Domain,
        x_app_connection_manager: Address,
        remote: Domain,
    ) -> CheckResult<Address> {
        tracing::trace!(domain, %x_app_connection_manager, remote, "domainToReplica()");

        XAppConnectionManager::new(x_app_connection_manager, self.provider(domain)?)
            .domainToReplica(remote)
            .call()
            .await
            .map_err(contract_error(
                domain,
                x_app_connection_manager,
                "domainToReplica",
            ))
    }

    async fn home(&self, domain: Domain, x_app_connection_manager: Address) -> CheckResult<Address> {
        tracing::trace!(domain, %x_app_connection_manager, "home()");

        XAppConnectionManager::new(x_app_connection_manager, self.provider(domain)?)
            .home()
            .call()
            .await
            .map_err(contract_error(domain, x_app_connection_manager, "home"))
    }

    async fn beacon_implementation(&self, domain: Domain, beacon: Address) -> CheckResult<Address> {
        tracing::trace!(domain, %beacon, "getStorageAt(0)");

        let slot = self
            .provider(domain)?
            .get_storage_at(beacon, U256::ZERO)
            .await
            .map_err(|source| CheckError::Transport { domain, source })?;

        // The implementation address is right-aligned in the slot.
        Ok(Address::from_word(B256::from(slot.to_be_bytes::<32>())))
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::{Bytes, address},
            transports::mock::Asserter,
        },
    };

    const BEACON: Address = address!("b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0");

    fn mocked(domain: Domain) -> (AlloyReader, Asserter) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .connect_mocked_client(asserter.clone())
            .erased();

        (AlloyReader::new().with_provider(domain, provider), asserter)
    }

    #[tokio::test]
    async fn beacon_implementation_is_right_aligned_in_slot_zero() {
        let implementation = address!("1234567890abcdef1234567890abcdef12345678");
        let (reader, asserter) = mocked(1000);
        asserter.push_success(&U256::from_be_slice(implementation.as_slice()));

        let actual = reader.beacon_implementation(1000, BEACON).await.unwrap();

        assert_eq!(actual, implementation);
    }

    #[tokio::test]
    async fn empty_slot_reads_as_zero_address() {
        let (reader, asserter) = mocked(1000);
        asserter.push_success(&U256::ZERO);

        let actual = reader.beacon_implementation(1000, BEACON).await.unwrap();

        assert_eq!(actual, Address::ZERO);
    }

    #[tokio::test]
    async fn decoding_owner() {
        let owner = address!("00000000000000000000000000000000000000aa");
        let (reader, asserter) = mocked(1000);
        asserter.push_success(&Bytes::from(owner.into_word().to_vec()));

        assert_eq!(reader.owner(1000, BEACON).await.unwrap(), owner);
    }

    #[tokio::test]
    async fn empty_call_result_means_no_contract() {
        let (reader, asserter) = mocked(1000);
        asserter.push_success(&Bytes::new());

        let err = reader.owner(1000, BEACON).await.unwrap_err();

        assert!(matches!(
            err,
            CheckError::NoContract { domain: 1000, address } if address == BEACON
        ));
    }

    #[tokio::test]
    async fn rpc_failure_is_a_transport_error() {
        let (reader, asserter) = mocked(1000);
        asserter.push_failure_msg("node unavailable");

        let err = reader.beacon_implementation(1000, BEACON).await.unwrap_err();

        assert!(matches!(err, CheckError::Transport { domain: 1000, .. }));
    }

    #[tokio::test]
    async fn unknown_domain_has_no_provider() {
        let (reader, _asserter) = mocked(1000);

        let err = reader.beacon_implementation(2000, BEACON).await.unwrap_err();

        assert!(matches!(err, CheckError::NoProvider(2000)));
    }
}
