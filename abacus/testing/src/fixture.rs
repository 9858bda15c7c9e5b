use {
    crate::MockReader,
    abacus_checker::CoreInvariantChecker,
    abacus_types::{BeaconProxy, Chain, CoreContracts, CoreDeploy, DeployedContracts, Domain},
    alloy::primitives::Address,
    std::collections::BTreeMap,
    url::Url,
};

/// The address that deployed every contract, before ownership was handed over.
pub const DEPLOYER: Address = Address::new([0xde; 20]);

/// Tags distinguishing the contracts of a fixture deployment.
mod tag {
    pub const HOME_IMPLEMENTATION: u8 = 0x01;
    pub const HOME_BEACON: u8 = 0x02;
    pub const HOME_PROXY: u8 = 0x03;
    pub const REPLICA_IMPLEMENTATION: u8 = 0x04;
    pub const REPLICA_BEACON: u8 = 0x05;
    pub const REPLICA_PROXY: u8 = 0x06;
    pub const GOVERNANCE_IMPLEMENTATION: u8 = 0x07;
    pub const GOVERNANCE_BEACON: u8 = 0x08;
    pub const GOVERNANCE_PROXY: u8 = 0x09;
    pub const VALIDATOR_MANAGER: u8 = 0x0a;
    pub const X_APP_CONNECTION_MANAGER: u8 = 0x0b;
    pub const UPGRADE_BEACON_CONTROLLER: u8 = 0x0c;
    pub const VALIDATOR: u8 = 0x0d;
    pub const GOVERNOR: u8 = 0x0e;
}

/// A deterministic, non-zero address, unique per `(domain, tag, index)`.
pub fn mock_address(domain: Domain, tag: u8, index: u32) -> Address {
    let mut bytes = [0; 20];
    bytes[0] = 0xab;
    bytes[1] = tag;
    bytes[8..12].copy_from_slice(&index.to_be_bytes());
    bytes[16..].copy_from_slice(&domain.to_be_bytes());
    Address::new(bytes)
}

/// The validator a fixture deployment declares for `domain`.
pub fn mock_validator(domain: Domain) -> Address {
    mock_address(domain, tag::VALIDATOR, 0)
}

/// The governor a fixture deployment installs on the governor domain.
pub fn mock_governor(domain: Domain) -> Address {
    mock_address(domain, tag::GOVERNOR, 0)
}

/// Deployment records of a set of domains, together with chains whose state
/// matches them.
pub struct Fixture {
    pub deploys: Vec<CoreDeploy>,
    pub reader: MockReader,
}

impl Fixture {
    /// A deployment onto `domains`, in that order, satisfying every invariant,
    /// with `governor_domain` holding the governor.
    pub fn consistent(domains: &[Domain], governor_domain: Domain) -> Self {
        let deploys = domains
            .iter()
            .map(|domain| mock_deploy(*domain, domains))
            .collect::<Vec<_>>();

        let mut reader = MockReader::new();

        for deploy in &deploys {
            let domain = deploy.domain();
            let Ok(contracts) = deploy.contracts.resolve() else {
                unreachable!("fixture deployments are complete");
            };

            let router = contracts.governance_router.proxy;

            // Beacons point at their implementations.
            for proxy in [&contracts.home, &contracts.governance_router]
                .into_iter()
                .chain(contracts.replicas.values())
            {
                reader.contract_mut(domain, proxy.beacon).implementation = proxy.implementation;
            }

            let home = reader.contract_mut(domain, contracts.home.proxy);
            home.owner = router;
            home.local_domain = domain;
            home.validator_manager = contracts.validator_manager;

            let manager = reader.contract_mut(domain, contracts.validator_manager);
            manager.owner = router;
            manager.validators = domains
                .iter()
                .map(|remote| (*remote, mock_validator(*remote)))
                .collect();

            let governance = reader.contract_mut(domain, router);
            governance.owner = DEPLOYER;
            governance.governor_domain = governor_domain;
            governance.governor = if domain == governor_domain {
                mock_governor(domain)
            } else {
                Address::ZERO
            };
            governance.routers = contracts
                .replicas
                .keys()
                .map(|remote| {
                    let remote_router = mock_address(*remote, tag::GOVERNANCE_PROXY, 0);
                    (*remote, remote_router.into_word())
                })
                .collect();

            let connection_manager = reader.contract_mut(domain, contracts.x_app_connection_manager);
            connection_manager.owner = router;
            connection_manager.home = contracts.home.proxy;
            connection_manager.domain_to_replica = contracts
                .replicas
                .iter()
                .map(|(remote, replica)| (*remote, replica.proxy))
                .collect();

            reader
                .contract_mut(domain, contracts.upgrade_beacon_controller)
                .owner = router;

            for replica in contracts.replicas.values() {
                reader.contract_mut(domain, replica.proxy).owner = router;
            }
        }

        Self { deploys, reader }
    }

    pub fn deploy(&self, domain: Domain) -> &CoreDeploy {
        self.deploys
            .iter()
            .find(|deploy| deploy.domain() == domain)
            .unwrap_or_else(|| panic!("no deployment for domain {domain}"))
    }

    pub fn deploy_mut(&mut self, domain: Domain) -> &mut CoreDeploy {
        self.deploys
            .iter_mut()
            .find(|deploy| deploy.domain() == domain)
            .unwrap_or_else(|| panic!("no deployment for domain {domain}"))
    }

    /// The resolved contracts of `domain`. Panics if any were removed.
    pub fn contracts(&self, domain: Domain) -> CoreContracts {
        self.deploy(domain)
            .contracts
            .resolve()
            .unwrap_or_else(|err| panic!("deployment for domain {domain}: {err}"))
    }

    pub fn into_checker(self) -> CoreInvariantChecker<MockReader> {
        CoreInvariantChecker::core(self.reader, self.deploys)
    }
}

fn mock_deploy(domain: Domain, domains: &[Domain]) -> CoreDeploy {
    let replicas = domains
        .iter()
        .filter(|remote| **remote != domain)
        .map(|remote| {
            let replica = BeaconProxy::new(
                mock_address(domain, tag::REPLICA_IMPLEMENTATION, 0),
                mock_address(domain, tag::REPLICA_BEACON, 0),
                mock_address(domain, tag::REPLICA_PROXY, *remote),
            );
            (*remote, Some(replica))
        })
        .collect::<BTreeMap<_, _>>();

    CoreDeploy {
        chain: Chain {
            name: format!("chain-{domain}"),
            domain,
            rpc_url: Url::parse(&format!("http://chain-{domain}.test:8545"))
                .unwrap_or_else(|err| panic!("invalid mock rpc url: {err}")),
        },
        validator: mock_validator(domain),
        contracts: DeployedContracts {
            home: Some(BeaconProxy::new(
                mock_address(domain, tag::HOME_IMPLEMENTATION, 0),
                mock_address(domain, tag::HOME_BEACON, 0),
                mock_address(domain, tag::HOME_PROXY, 0),
            )),
            replicas,
            governance_router: Some(BeaconProxy::new(
                mock_address(domain, tag::GOVERNANCE_IMPLEMENTATION, 0),
                mock_address(domain, tag::GOVERNANCE_BEACON, 0),
                mock_address(domain, tag::GOVERNANCE_PROXY, 0),
            )),
            validator_manager: Some(mock_address(domain, tag::VALIDATOR_MANAGER, 0)),
            x_app_connection_manager: Some(mock_address(
                domain,
                tag::X_APP_CONNECTION_MANAGER,
                0,
            )),
            upgrade_beacon_controller: Some(mock_address(
                domain,
                tag::UPGRADE_BEACON_CONTROLLER,
                0,
            )),
        },
    }
}
