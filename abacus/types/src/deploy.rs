use {
    crate::{BeaconProxy, Chain, Domain},
    alloy::primitives::Address,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
    thiserror::Error,
};

/// The core contracts of one domain as recorded in the deployment artifacts.
///
/// A field is `None` when the deploy pipeline never got to that contract. Use
/// [`DeployedContracts::resolve`] to obtain a [`CoreContracts`] in which every
/// contract is known to exist.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployedContracts {
    pub home: Option<BeaconProxy>,
    /// Keyed by the remote domain whose Home the replica mirrors.
    #[serde(default)]
    pub replicas: BTreeMap<Domain, Option<BeaconProxy>>,
    pub governance_router: Option<BeaconProxy>,
    pub validator_manager: Option<Address>,
    pub x_app_connection_manager: Option<Address>,
    pub upgrade_beacon_controller: Option<Address>,
}

/// The core contracts of one domain, all of them present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreContracts {
    pub home: BeaconProxy,
    pub replicas: BTreeMap<Domain, BeaconProxy>,
    pub governance_router: BeaconProxy,
    pub validator_manager: Address,
    pub x_app_connection_manager: Address,
    pub upgrade_beacon_controller: Address,
}

/// Names of the contracts absent from a deployment, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("contracts not defined: {}", .0.join(", "))]
pub struct MissingContracts(pub Vec<String>);

impl DeployedContracts {
    pub fn resolve(&self) -> Result<CoreContracts, MissingContracts> {
        let mut missing = Vec::new();

        let home = present(self.home, "home", &mut missing);
        let governance_router = present(self.governance_router, "governance_router", &mut missing);
        let upgrade_beacon_controller = present(
            self.upgrade_beacon_controller,
            "upgrade_beacon_controller",
            &mut missing,
        );
        let x_app_connection_manager = present(
            self.x_app_connection_manager,
            "x_app_connection_manager",
            &mut missing,
        );
        let validator_manager = present(self.validator_manager, "validator_manager", &mut missing);

        let mut replicas = BTreeMap::new();
        for (domain, replica) in &self.replicas {
            match replica {
                Some(replica) => {
                    replicas.insert(*domain, *replica);
                },
                None => missing.push(format!("replicas[{domain}]")),
            }
        }

        match (
            home,
            governance_router,
            upgrade_beacon_controller,
            x_app_connection_manager,
            validator_manager,
        ) {
            (
                Some(home),
                Some(governance_router),
                Some(upgrade_beacon_controller),
                Some(x_app_connection_manager),
                Some(validator_manager),
            ) if missing.is_empty() => Ok(CoreContracts {
                home,
                replicas,
                governance_router,
                validator_manager,
                x_app_connection_manager,
                upgrade_beacon_controller,
            }),
            _ => Err(MissingContracts(missing)),
        }
    }
}

fn present<T>(field: Option<T>, name: &str, missing: &mut Vec<String>) -> Option<T> {
    if field.is_none() {
        missing.push(name.to_string());
    }

    field
}

/// Everything the deploy pipeline produced for one domain, plus the validator
/// that is expected to sign for it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CoreDeploy {
    pub chain: Chain,
    pub validator: Address,
    pub contracts: DeployedContracts,
}

impl CoreDeploy {
    pub fn domain(&self) -> Domain {
        self.chain.domain
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address};

    fn proxy(seed: u8) -> BeaconProxy {
        BeaconProxy::new(
            Address::repeat_byte(seed),
            Address::repeat_byte(seed + 1),
            Address::repeat_byte(seed + 2),
        )
    }

    fn complete() -> DeployedContracts {
        DeployedContracts {
            home: Some(proxy(0x10)),
            replicas: BTreeMap::from([(2000, Some(proxy(0x20))), (3000, Some(proxy(0x30)))]),
            governance_router: Some(proxy(0x40)),
            validator_manager: Some(Address::repeat_byte(0x50)),
            x_app_connection_manager: Some(Address::repeat_byte(0x51)),
            upgrade_beacon_controller: Some(Address::repeat_byte(0x52)),
        }
    }

    #[test]
    fn resolving_complete_deployment() {
        let contracts = complete().resolve().unwrap();

        assert_eq!(contracts.home, proxy(0x10));
        assert_eq!(contracts.replicas.keys().copied().collect::<Vec<_>>(), [
            2000, 3000
        ]);
        assert_eq!(contracts.validator_manager, Address::repeat_byte(0x50));
    }

    #[test]
    fn resolving_reports_every_missing_field() {
        let mut contracts = complete();
        contracts.home = None;
        contracts.validator_manager = None;
        contracts.replicas.insert(3000, None);

        let err = contracts.resolve().unwrap_err();

        assert_eq!(err.0, ["home", "validator_manager", "replicas[3000]"]);
        assert_eq!(
            err.to_string(),
            "contracts not defined: home, validator_manager, replicas[3000]"
        );
    }

    #[test]
    fn deserializing_partial_artifact() {
        let deploy: CoreDeploy = serde_json::from_str(
            r#"{
                "chain": {
                    "name": "alfajores",
                    "domain": 1000,
                    "rpc_url": "https://alfajores-forno.celo-testnet.org"
                },
                "validator": "0x00000000000000000000000000000000000000aa",
                "contracts": {
                    "validator_manager": "0x0000000000000000000000000000000000000001",
                    "replicas": {
                        "2000": null
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(deploy.domain(), 1000);
        assert_eq!(
            deploy.validator,
            address!("00000000000000000000000000000000000000aa")
        );
        assert_eq!(deploy.contracts.home, None);
        assert_eq!(deploy.contracts.replicas.get(&2000), Some(&None));
        assert!(deploy.contracts.resolve().is_err());
    }
}
