use {
    abacus_types::Domain,
    alloy::primitives::Address,
    serde::Serialize,
    std::fmt,
};

/// A contract deployed behind a beacon proxy.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeableContract {
    Home,
    GovernanceRouter,
    /// The replica mirroring the given remote domain.
    Replica(Domain),
}

impl UpgradeableContract {
    /// The name the contract is known by in verification inputs.
    pub fn label(&self) -> &'static str {
        match self {
            UpgradeableContract::Home => "Home",
            UpgradeableContract::GovernanceRouter => "Governance",
            UpgradeableContract::Replica(_) => "Replica",
        }
    }
}

impl fmt::Display for UpgradeableContract {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UpgradeableContract::Replica(remote) => write!(f, "Replica[{remote}]"),
            other => f.write_str(other.label()),
        }
    }
}

/// A contract whose ownership must end up with the governance router.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OwnedContract {
    ValidatorManager,
    XAppConnectionManager,
    UpgradeBeaconController,
    Home,
    Replica(Domain),
}

impl fmt::Display for OwnedContract {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OwnedContract::ValidatorManager => f.write_str("ValidatorManager"),
            OwnedContract::XAppConnectionManager => f.write_str("XAppConnectionManager"),
            OwnedContract::UpgradeBeaconController => f.write_str("UpgradeBeaconController"),
            OwnedContract::Home => f.write_str("Home"),
            OwnedContract::Replica(remote) => write!(f, "Replica[{remote}]"),
        }
    }
}

/// The half of a beacon proxy that replicas on one domain must share.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProxyField {
    Implementation,
    Beacon,
}

impl fmt::Display for ProxyField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProxyField::Implementation => f.write_str("implementation"),
            ProxyField::Beacon => f.write_str("beacon"),
        }
    }
}

/// What the governor address of a domain should look like.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GovernorExpectation {
    /// The domain is the governor domain.
    NonZero,
    /// Any other domain.
    Zero,
}

impl fmt::Display for GovernorExpectation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GovernorExpectation::NonZero => f.write_str("a non-zero address"),
            GovernorExpectation::Zero => f.write_str("the zero address"),
        }
    }
}

/// An invariant of the deployment that does not hold.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Violation {
    ContractsNotDefined {
        domain: Domain,
        missing: Vec<String>,
    },
    MalformedBeaconProxy {
        domain: Domain,
        contract: UpgradeableContract,
    },
    UpgradeBeaconMismatch {
        domain: Domain,
        contract: UpgradeableContract,
        expected: Address,
        actual: Address,
    },
    ValidatorManagerMismatch {
        domain: Domain,
        expected: Address,
        actual: Address,
    },
    ValidatorMismatch {
        local_domain: Domain,
        remote_domain: Domain,
        expected: Address,
        actual: Address,
    },
    ReplicaSetInconsistent {
        domain: Domain,
        field: ProxyField,
        /// The first replica, in remote domain order, that differs from the
        /// first replica.
        divergent_replica: Domain,
    },
    GovernanceRouterUnregistered {
        domain: Domain,
        remote_domain: Domain,
    },
    GovernorDomainMismatch {
        domain: Domain,
        expected: Domain,
        actual: Domain,
    },
    /// The governor domain is not one of the deployed domains, so no
    /// deployment can hold the governor.
    GovernorDomainUnknown {
        domain: Domain,
        governor_domain: Domain,
    },
    GovernorAddressInvariantViolated {
        domain: Domain,
        expected: GovernorExpectation,
        actual: Address,
    },
    OwnershipNotTransferred {
        domain: Domain,
        contract: OwnedContract,
        expected: Address,
        actual: Address,
    },
    ReplicaNotEnrolled {
        domain: Domain,
        remote_domain: Domain,
    },
    HomeMismatchOnConnectionManager {
        domain: Domain,
        expected: Address,
        actual: Address,
    },
}

impl Violation {
    /// The domain whose contracts are at fault.
    pub fn domain(&self) -> Domain {
        match self {
            Violation::ContractsNotDefined { domain, .. }
            | Violation::MalformedBeaconProxy { domain, .. }
            | Violation::UpgradeBeaconMismatch { domain, .. }
            | Violation::ValidatorManagerMismatch { domain, .. }
            | Violation::ReplicaSetInconsistent { domain, .. }
            | Violation::GovernanceRouterUnregistered { domain, .. }
            | Violation::GovernorDomainMismatch { domain, .. }
            | Violation::GovernorDomainUnknown { domain, .. }
            | Violation::GovernorAddressInvariantViolated { domain, .. }
            | Violation::OwnershipNotTransferred { domain, .. }
            | Violation::ReplicaNotEnrolled { domain, .. }
            | Violation::HomeMismatchOnConnectionManager { domain, .. } => *domain,
            Violation::ValidatorMismatch { local_domain, .. } => *local_domain,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Violation::ContractsNotDefined { domain, missing } => {
                write!(f, "[{domain}] contracts not defined: {}", missing.join(", "))
            },
            Violation::MalformedBeaconProxy { domain, contract } => {
                write!(
                    f,
                    "[{domain}] {contract} beacon proxy has a zero or repeated address"
                )
            },
            Violation::UpgradeBeaconMismatch {
                domain,
                contract,
                expected,
                actual,
            } => write!(
                f,
                "[{domain}] {contract} beacon points at implementation {actual}, expected {expected}"
            ),
            Violation::ValidatorManagerMismatch {
                domain,
                expected,
                actual,
            } => write!(
                f,
                "[{domain}] home validator manager is {actual}, expected {expected}"
            ),
            Violation::ValidatorMismatch {
                local_domain,
                remote_domain,
                expected,
                actual,
            } => write!(
                f,
                "[{local_domain}] validator for domain {remote_domain} is {actual}, expected {expected}"
            ),
            Violation::ReplicaSetInconsistent {
                domain,
                field,
                divergent_replica,
            } => write!(
                f,
                "[{domain}] replicas do not share one {field}, first divergence at replica for domain {divergent_replica}"
            ),
            Violation::GovernanceRouterUnregistered {
                domain,
                remote_domain,
            } => write!(
                f,
                "[{domain}] no governance router registered for domain {remote_domain}"
            ),
            Violation::GovernorDomainMismatch {
                domain,
                expected,
                actual,
            } => write!(
                f,
                "[{domain}] governor domain is {actual}, expected {expected}"
            ),
            Violation::GovernorDomainUnknown {
                domain,
                governor_domain,
            } => write!(
                f,
                "[{domain}] governor domain {governor_domain} is not part of the deployment"
            ),
            Violation::GovernorAddressInvariantViolated {
                domain,
                expected,
                actual,
            } => write!(f, "[{domain}] governor is {actual}, expected {expected}"),
            Violation::OwnershipNotTransferred {
                domain,
                contract,
                expected,
                actual,
            } => write!(
                f,
                "[{domain}] {contract} is owned by {actual}, expected governance router {expected}"
            ),
            Violation::ReplicaNotEnrolled {
                domain,
                remote_domain,
            } => write!(
                f,
                "[{domain}] no replica enrolled for domain {remote_domain}"
            ),
            Violation::HomeMismatchOnConnectionManager {
                domain,
                expected,
                actual,
            } => write!(
                f,
                "[{domain}] connection manager home is {actual}, expected {expected}"
            ),
        }
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address};

    #[test]
    fn validator_mismatch_belongs_to_local_domain() {
        let expected = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let actual = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let violation = Violation::ValidatorMismatch {
            local_domain: 1000,
            remote_domain: 2000,
            expected,
            actual,
        };

        assert_eq!(violation.domain(), 1000);
        assert_eq!(
            violation.to_string(),
            format!("[1000] validator for domain 2000 is {actual}, expected {expected}")
        );
    }

    #[test]
    fn serializing_violation() {
        let violation = Violation::ReplicaSetInconsistent {
            domain: 1000,
            field: ProxyField::Implementation,
            divergent_replica: 3000,
        };

        assert_eq!(
            serde_json::to_value(&violation).unwrap(),
            serde_json::json!({
                "type": "replica_set_inconsistent",
                "domain": 1000,
                "field": "implementation",
                "divergent_replica": 3000,
            })
        );
    }

    #[test]
    fn unknown_governor_domain() {
        let violation = Violation::GovernorDomainUnknown {
            domain: 2000,
            governor_domain: 9999,
        };

        assert_eq!(violation.domain(), 2000);
        assert_eq!(
            violation.to_string(),
            "[2000] governor domain 9999 is not part of the deployment"
        );
    }

    #[test]
    fn naming_replicas() {
        assert_eq!(UpgradeableContract::Replica(2000).to_string(), "Replica[2000]");
        assert_eq!(UpgradeableContract::Replica(2000).label(), "Replica");
        assert_eq!(OwnedContract::Replica(3000).to_string(), "Replica[3000]");
    }
}
