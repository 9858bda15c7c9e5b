use {
    crate::CheckResult,
    abacus_types::Domain,
    alloy::primitives::{Address, B256},
    async_trait::async_trait,
};

/// Read-only access to the deployed core contracts.
///
/// Every method takes the domain whose chain is to be queried, followed by the
/// address of the contract on that chain. Mapping getters return the zero value
/// for keys that were never set, as the contracts themselves do.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// `Ownable.owner()`
    async fn owner(&self, domain: Domain, contract: Address) -> CheckResult<Address>;

    /// `Home.validatorManager()`
    async fn validator_manager(&self, domain: Domain, home: Address) -> CheckResult<Address>;

    /// `Home.localDomain()`
    async fn local_domain(&self, domain: Domain, home: Address) -> CheckResult<Domain>;

    /// `ValidatorManager.validators(remote)`
    async fn validators(
        &self,
        domain: Domain,
        validator_manager: Address,
        remote: Domain,
    ) -> CheckResult<Address>;

    /// `GovernanceRouter.routers(remote)`, a left-padded 32-byte router address.
    async fn routers(
        &self,
        domain: Domain,
        governance_router: Address,
        remote: Domain,
    ) -> CheckResult<B256>;

    /// `GovernanceRouter.governorDomain()`
    async fn governor_domain(&self, domain: Domain, governance_router: Address)
    -> CheckResult<Domain>;

    /// `GovernanceRouter.governor()`
    async fn governor(&self, domain: Domain, governance_router: Address) -> CheckResult<Address>;

    /// `XAppConnectionManager.domainToReplica(remote)`
    async fn domain_to_replica(
        &self,
        domain: Domain,
        x_app_connection_manager: Address,
        remote: Domain,
    ) -> CheckResult<Address>;

    /// `XAppConnectionManager.home()`
    async fn home(&self, domain: Domain, x_app_connection_manager: Address)
    -> CheckResult<Address>;

    /// The implementation an `UpgradeBeacon` points at, kept in its first
    /// storage slot.
    async fn beacon_implementation(&self, domain: Domain, beacon: Address)
    -> CheckResult<Address>;
}
