use {
    crate::{
        CheckResult, ContractReader, GovernorExpectation, InvariantChecker,
        InvariantSuite, OwnedContract, ProxyField, UpgradeableContract, VerificationInput,
        Violation, ViolationSink, verification_inputs,
    },
    abacus_types::{BeaconProxy, CoreContracts, CoreDeploy, Domain, MissingContracts},
    async_trait::async_trait,
    futures::{future::try_join_all, try_join},
};

/// An [`InvariantChecker`] for the Abacus core contracts.
pub type CoreInvariantChecker<R> = InvariantChecker<CoreInvariants<R>>;

impl<R> CoreInvariantChecker<R>
where
    R: ContractReader,
{
    pub fn core(reader: R, deploys: Vec<CoreDeploy>) -> Self {
        Self::new(CoreInvariants::new(reader), deploys)
    }

    /// The contracts of `deploy` to be submitted for source verification.
    pub fn verification_inputs(
        &self,
        deploy: &CoreDeploy,
    ) -> Result<Vec<VerificationInput>, MissingContracts> {
        deploy
            .contracts
            .resolve()
            .map(|contracts| verification_inputs(&contracts))
    }
}

/// What the governance routers of a deployment agree on, read once per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GovernanceContext {
    /// The governor domain reported by most routers. `None` if no deployment
    /// has all its contracts.
    pub governor_domain: Option<Domain>,
}

/// The invariants of the Abacus core contracts, read through `R`.
///
/// Each check can be run on its own; [`InvariantSuite::check_deploy`] runs
/// them all in a fixed order.
pub struct CoreInvariants<R> {
    reader: R,
}

impl<R> CoreInvariants<R>
where
    R: ContractReader,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Every contract of the deployment has been recorded. The other checks
    /// take the contracts this returns.
    pub fn check_contracts_defined(deploy: &CoreDeploy) -> Result<CoreContracts, Violation> {
        deploy
            .contracts
            .resolve()
            .map_err(|MissingContracts(missing)| Violation::ContractsNotDefined {
                domain: deploy.domain(),
                missing,
            })
    }

    /// Every beacon proxy is well formed, and its beacon points at the
    /// recorded implementation.
    pub async fn check_beacon_proxies(
        &self,
        domain: Domain,
        contracts: &CoreContracts,
    ) -> CheckResult<Vec<Violation>> {
        tracing::debug!(domain, "Checking beacon proxies");

        let proxies = [
            (UpgradeableContract::Home, contracts.home),
            (UpgradeableContract::GovernanceRouter, contracts.governance_router),
        ]
        .into_iter()
        .chain(
            contracts
                .replicas
                .iter()
                .map(|(remote, replica)| (UpgradeableContract::Replica(*remote), *replica)),
        );

        let violations = try_join_all(proxies.map(|(contract, proxy)| {
            self.check_beacon_proxy(domain, contract, proxy)
        }))
        .await?;

        Ok(violations.into_iter().flatten().collect())
    }

    async fn check_beacon_proxy(
        &self,
        domain: Domain,
        contract: UpgradeableContract,
        proxy: BeaconProxy,
    ) -> CheckResult<Option<Violation>> {
        if !proxy.is_well_formed() {
            return Ok(Some(Violation::MalformedBeaconProxy { domain, contract }));
        }

        let actual = self
            .reader
            .beacon_implementation(domain, proxy.beacon)
            .await?;

        if actual != proxy.implementation {
            return Ok(Some(Violation::UpgradeBeaconMismatch {
                domain,
                contract,
                expected: proxy.implementation,
                actual,
            }));
        }

        Ok(None)
    }

    /// Home uses the domain's validator manager.
    pub async fn check_home(
        &self,
        domain: Domain,
        contracts: &CoreContracts,
    ) -> CheckResult<Vec<Violation>> {
        tracing::debug!(domain, "Checking home");

        let actual = self
            .reader
            .validator_manager(domain, contracts.home.proxy)
            .await?;
        let expected = contracts.validator_manager;

        if actual != expected {
            return Ok(vec![Violation::ValidatorManagerMismatch {
                domain,
                expected,
                actual,
            }]);
        }

        Ok(vec![])
    }

    /// The validator manager of `domain` knows the validator of every
    /// deployment, its own included, as that deployment declares it.
    pub async fn check_validator_manager(
        &self,
        deploys: &[CoreDeploy],
        domain: Domain,
        contracts: &CoreContracts,
    ) -> CheckResult<Vec<Violation>> {
        tracing::debug!(domain, "Checking validator manager");

        let actuals = try_join_all(deploys.iter().map(|remote| {
            self.reader
                .validators(domain, contracts.validator_manager, remote.domain())
        }))
        .await?;

        Ok(deploys
            .iter()
            .zip(actuals)
            .filter(|(remote, actual)| remote.validator != *actual)
            .map(|(remote, actual)| Violation::ValidatorMismatch {
                local_domain: domain,
                remote_domain: remote.domain(),
                expected: remote.validator,
                actual,
            })
            .collect())
    }

    /// All replicas of `domain` share one implementation and one beacon.
    /// Skipped when `domain` is the only deployment.
    pub fn check_replicas(
        deploys: &[CoreDeploy],
        domain: Domain,
        contracts: &CoreContracts,
    ) -> Vec<Violation> {
        if deploys.iter().all(|deploy| deploy.domain() == domain) {
            return vec![];
        }

        tracing::debug!(domain, "Checking replicas");

        let remotes = contracts.replicas.keys().copied().collect::<Vec<_>>();
        let implementations = contracts.replicas.values().map(|r| r.implementation);
        let beacons = contracts.replicas.values().map(|r| r.beacon);

        [
            (ProxyField::Implementation, first_divergence(implementations)),
            (ProxyField::Beacon, first_divergence(beacons)),
        ]
        .into_iter()
        .filter_map(|(field, divergence)| {
            divergence.map(|index| Violation::ReplicaSetInconsistent {
                domain,
                field,
                divergent_replica: remotes[index],
            })
        })
        .collect()
    }

    /// The governor domain that most governance routers report, among the
    /// deployments whose contracts are all defined.
    pub async fn agreed_governor_domain(
        &self,
        deploys: &[CoreDeploy],
    ) -> CheckResult<Option<Domain>> {
        let routers = deploys
            .iter()
            .filter_map(|deploy| {
                let contracts = deploy.contracts.resolve().ok()?;
                Some((deploy.domain(), contracts.governance_router.proxy))
            })
            .collect::<Vec<_>>();

        let reported = try_join_all(
            routers
                .iter()
                .map(|(domain, router)| self.reader.governor_domain(*domain, *router)),
        )
        .await?;

        Ok(majority_governor_domain(
            routers.iter().map(|(domain, _)| *domain).zip(reported),
        ))
    }

    /// The governance router knows the router of every remote domain, only
    /// the governor domain has a governor, every domain names the governor
    /// domain in `agreed_governor_domain`, that domain is one of `deploys`,
    /// and the governance router owns every other contract.
    pub async fn check_governance(
        &self,
        deploys: &[CoreDeploy],
        agreed_governor_domain: Option<Domain>,
        domain: Domain,
        contracts: &CoreContracts,
    ) -> CheckResult<Vec<Violation>> {
        tracing::debug!(domain, "Checking governance");

        let router = contracts.governance_router.proxy;
        let mut violations = Vec::new();

        // A router is registered for every remote domain.
        let remotes = contracts.replicas.keys().copied().collect::<Vec<_>>();
        let routers = try_join_all(
            remotes
                .iter()
                .map(|remote| self.reader.routers(domain, router, *remote)),
        )
        .await?;

        for (remote, registered) in remotes.iter().zip(routers) {
            if registered.is_zero() {
                violations.push(Violation::GovernanceRouterUnregistered {
                    domain,
                    remote_domain: *remote,
                });
            }
        }

        // Only the governor domain has a governor.
        let (governor_domain, governor, local_domain) = try_join!(
            self.reader.governor_domain(domain, router),
            self.reader.governor(domain, router),
            self.reader.local_domain(domain, contracts.home.proxy),
        )?;

        let expected = if governor_domain == local_domain {
            GovernorExpectation::NonZero
        } else {
            GovernorExpectation::Zero
        };

        let violated = match expected {
            GovernorExpectation::NonZero => governor.is_zero(),
            GovernorExpectation::Zero => !governor.is_zero(),
        };

        if violated {
            violations.push(Violation::GovernorAddressInvariantViolated {
                domain,
                expected,
                actual: governor,
            });
        }

        // Every domain names the same governor domain, and it is deployed.
        if let Some(agreed) = agreed_governor_domain {
            if agreed != governor_domain {
                violations.push(Violation::GovernorDomainMismatch {
                    domain,
                    expected: agreed,
                    actual: governor_domain,
                });
            }
        }

        if deploys.iter().all(|deploy| deploy.domain() != governor_domain) {
            violations.push(Violation::GovernorDomainUnknown {
                domain,
                governor_domain,
            });
        }

        // Ownership has been handed to the governance router.
        let owned = [
            (OwnedContract::ValidatorManager, contracts.validator_manager),
            (
                OwnedContract::XAppConnectionManager,
                contracts.x_app_connection_manager,
            ),
            (
                OwnedContract::UpgradeBeaconController,
                contracts.upgrade_beacon_controller,
            ),
            (OwnedContract::Home, contracts.home.proxy),
        ]
        .into_iter()
        .chain(
            contracts
                .replicas
                .iter()
                .map(|(remote, replica)| (OwnedContract::Replica(*remote), replica.proxy)),
        )
        .collect::<Vec<_>>();

        let owners = try_join_all(
            owned
                .iter()
                .map(|(_, address)| self.reader.owner(domain, *address)),
        )
        .await?;

        for ((contract, _), actual) in owned.into_iter().zip(owners) {
            if actual != router {
                violations.push(Violation::OwnershipNotTransferred {
                    domain,
                    contract,
                    expected: router,
                    actual,
                });
            }
        }

        Ok(violations)
    }

    /// Every remote domain has a replica enrolled with the connection manager,
    /// and the connection manager points at the domain's Home.
    pub async fn check_x_app_connection_manager(
        &self,
        domain: Domain,
        contracts: &CoreContracts,
    ) -> CheckResult<Vec<Violation>> {
        tracing::debug!(domain, "Checking xApp connection manager");

        let manager = contracts.x_app_connection_manager;
        let remotes = contracts.replicas.keys().copied().collect::<Vec<_>>();

        let enrolled = try_join_all(
            remotes
                .iter()
                .map(|remote| self.reader.domain_to_replica(domain, manager, *remote)),
        )
        .await?;

        let mut violations = remotes
            .into_iter()
            .zip(enrolled)
            .filter(|(_, replica)| replica.is_zero())
            .map(|(remote, _)| Violation::ReplicaNotEnrolled {
                domain,
                remote_domain: remote,
            })
            .collect::<Vec<_>>();

        let actual = self.reader.home(domain, manager).await?;
        let expected = contracts.home.proxy;

        if actual != expected {
            violations.push(Violation::HomeMismatchOnConnectionManager {
                domain,
                expected,
                actual,
            });
        }

        Ok(violations)
    }
}

#[async_trait]
impl<R> InvariantSuite for CoreInvariants<R>
where
    R: ContractReader,
{
    type Context = GovernanceContext;
    type Deploy = CoreDeploy;
    type Violation = Violation;

    async fn prepare(&self, deploys: &[CoreDeploy]) -> CheckResult<GovernanceContext> {
        let governor_domain = self.agreed_governor_domain(deploys).await?;

        tracing::debug!(?governor_domain, "Agreed on governor domain");

        Ok(GovernanceContext { governor_domain })
    }

    async fn check_deploy(
        &self,
        deploys: &[CoreDeploy],
        context: &GovernanceContext,
        deploy: &CoreDeploy,
        sink: &ViolationSink<Violation>,
    ) -> CheckResult<()> {
        let domain = deploy.domain();

        // Nothing else can be checked without the contracts.
        let contracts = match Self::check_contracts_defined(deploy) {
            Ok(contracts) => contracts,
            Err(violation) => {
                sink.add(violation);
                return Ok(());
            },
        };

        sink.extend(self.check_beacon_proxies(domain, &contracts).await?);
        sink.extend(self.check_home(domain, &contracts).await?);
        sink.extend(Self::check_replicas(deploys, domain, &contracts));
        sink.extend(
            self.check_governance(deploys, context.governor_domain, domain, &contracts)
                .await?,
        );
        sink.extend(self.check_x_app_connection_manager(domain, &contracts).await?);
        sink.extend(self.check_validator_manager(deploys, domain, &contracts).await?);

        Ok(())
    }
}

/// Index of the first item that differs from the first item, or `None` if all
/// items are equal.
pub fn first_divergence<I, T>(items: I) -> Option<usize>
where
    I: IntoIterator<Item = T>,
    T: PartialEq,
{
    let mut items = items.into_iter();
    let first = items.next()?;

    items
        .position(|item| item != first)
        .map(|position| position + 1)
}

/// The governor domain named by the most `(reporter, reported)` pairs. A tie
/// goes to a domain that names itself, then to the one named first.
pub fn majority_governor_domain<I>(reports: I) -> Option<Domain>
where
    I: IntoIterator<Item = (Domain, Domain)>,
{
    let reports = reports.into_iter().collect::<Vec<_>>();
    let mut best: Option<(Domain, usize, bool)> = None;

    for (_, candidate) in &reports {
        let votes = reports
            .iter()
            .filter(|(_, reported)| reported == candidate)
            .count();
        let names_itself = reports.contains(&(*candidate, *candidate));

        let ahead = match best {
            Some((_, best_votes, best_names_itself)) => {
                (votes, names_itself) > (best_votes, best_names_itself)
            },
            None => true,
        };

        if ahead {
            best = Some((*candidate, votes, names_itself));
        }
    }

    best.map(|(domain, ..)| domain)
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::primitives::{Address, address},
        test_case::test_case,
    };

    const I: Address = address!("1111111111111111111111111111111111111111");
    const J: Address = address!("2222222222222222222222222222222222222222");

    #[test_case(&[] => None; "no replicas")]
    #[test_case(&[I] => None; "single replica")]
    #[test_case(&[I, I, I] => None; "all equal")]
    #[test_case(&[I, I, J] => Some(2); "last differs")]
    #[test_case(&[I, J, I] => Some(1); "middle differs")]
    #[test_case(&[J, I, I] => Some(1); "first differs")]
    fn divergence(items: &[Address]) -> Option<usize> {
        first_divergence(items)
    }

    #[test_case(&[] => None; "no routers")]
    #[test_case(&[(1000, 1000), (2000, 1000), (3000, 1000)] => Some(1000); "unanimous")]
    #[test_case(&[(1000, 2000), (2000, 1000), (3000, 1000)] => Some(1000); "first dissents")]
    #[test_case(&[(1000, 9999), (2000, 9999)] => Some(9999); "undeployed domain")]
    #[test_case(&[(1000, 1000), (2000, 2000)] => Some(1000); "tie goes to first")]
    #[test_case(
        &[(1000, 2000), (2000, 2000), (3000, 1000), (4000, 1000)] => Some(2000);
        "tie goes to self named"
    )]
    fn majority(reports: &[(Domain, Domain)]) -> Option<Domain> {
        majority_governor_domain(reports.iter().copied())
    }
}
