use {
    abacus_checker::{CheckError, CheckResult, ContractReader},
    abacus_types::Domain,
    alloy::{
        primitives::{Address, B256},
        transports::TransportErrorKind,
    },
    async_trait::async_trait,
    std::collections::{BTreeMap, BTreeSet},
};

/// The on-chain state of one mock contract.
///
/// A single shape covers every core contract; a getter reads whichever field
/// corresponds to it and ignores the rest. Unset mapping keys read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockContract {
    pub owner: Address,
    // Home
    pub local_domain: Domain,
    pub validator_manager: Address,
    // ValidatorManager
    pub validators: BTreeMap<Domain, Address>,
    // GovernanceRouter
    pub routers: BTreeMap<Domain, B256>,
    pub governor_domain: Domain,
    pub governor: Address,
    // XAppConnectionManager
    pub domain_to_replica: BTreeMap<Domain, Address>,
    pub home: Address,
    // UpgradeBeacon
    pub implementation: Address,
}

/// A [`ContractReader`] over in-memory chains.
#[derive(Debug, Clone, Default)]
pub struct MockReader {
    contracts: BTreeMap<(Domain, Address), MockContract>,
    offline: BTreeSet<Domain>,
}

impl MockReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// The contract at `address` on `domain`, created empty if absent.
    pub fn contract_mut(&mut self, domain: Domain, address: Address) -> &mut MockContract {
        self.contracts.entry((domain, address)).or_default()
    }

    /// Removes the code at `address` on `domain`; reads then fail with
    /// [`CheckError::NoContract`].
    pub fn remove_contract(&mut self, domain: Domain, address: Address) -> Option<MockContract> {
        self.contracts.remove(&(domain, address))
    }

    /// Makes every subsequent read on `domain` fail at the transport level.
    pub fn take_offline(&mut self, domain: Domain) {
        self.offline.insert(domain);
    }

    fn contract(&self, domain: Domain, address: Address) -> CheckResult<&MockContract> {
        if self.offline.contains(&domain) {
            return Err(CheckError::Transport {
                domain,
                source: TransportErrorKind::custom_str("connection refused"),
            });
        }

        self.contracts
            .get(&(domain, address))
            .ok_or(CheckError::NoContract { domain, address })
    }
}

#[async_trait]
impl ContractReader for MockReader {
    async fn owner(&self, domain: Domain, contract: Address) -> CheckResult<Address> {
        Ok(self.contract(domain, contract)?.owner)
    }

    async fn validator_manager(&self, domain: Domain, home: Address) -> CheckResult<Address> {
        Ok(self.contract(domain, home)?.validator_manager)
    }

    async fn local_domain(&self, domain: Domain, home: Address) -> CheckResult<Domain> {
        Ok(self.contract(domain, home)?.local_domain)
    }

    async fn validators(
        &self,
        domain: Domain,
        validator_manager: Address,
        remote: Domain,
    ) -> CheckResult<Address> {
        let manager = self.contract(domain, validator_manager)?;

        Ok(manager.validators.get(&remote).copied().unwrap_or_default())
    }

    async fn routers(
        &self,
        domain: Domain,
        governance_router: Address,
        remote: Domain,
    ) -> CheckResult<B256> {
        let router = self.contract(domain, governance_router)?;

        Ok(router.routers.get(&remote).copied().unwrap_or_default())
    }

    async fn governor_domain(
        &self,
        domain: Domain,
        governance_router: Address,
    ) -> CheckResult<Domain> {
        Ok(self.contract(domain, governance_router)?.governor_domain)
    }

    async fn governor(&self, domain: Domain, governance_router: Address) -> CheckResult<Address> {
        Ok(self.contract(domain, governance_router)?.governor)
    }

    async fn domain_to_replica(
        &self,
        domain: Domain,
        x_app_connection_manager: Address,
        remote: Domain,
    ) -> CheckResult<Address> {
        let manager = self.contract(domain, x_app_connection_manager)?;

        Ok(manager
            .domain_to_replica
            .get(&remote)
            .copied()
            .unwrap_or_default())
    }

    async fn home(&self, domain: Domain, x_app_connection_manager: Address) -> CheckResult<Address> {
        Ok(self.contract(domain, x_app_connection_manager)?.home)
    }

    async fn beacon_implementation(&self, domain: Domain, beacon: Address) -> CheckResult<Address> {
        Ok(self.contract(domain, beacon)?.implementation)
    }
}
