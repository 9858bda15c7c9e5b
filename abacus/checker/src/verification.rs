use {
    crate::UpgradeableContract,
    abacus_types::{BeaconProxy, CoreContracts},
    alloy::primitives::Address,
    serde::{Deserialize, Serialize},
};

/// A contract to be submitted to a block explorer for source verification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationInput {
    pub label: String,
    pub address: Address,
}

impl VerificationInput {
    fn new(label: impl Into<String>, address: Address) -> Self {
        Self {
            label: label.into(),
            address,
        }
    }
}

/// Lists every contract of a domain for source verification: the singletons
/// first, then the implementation, beacon and proxy of Home, the governance
/// router and each replica in remote domain order.
pub fn verification_inputs(contracts: &CoreContracts) -> Vec<VerificationInput> {
    let mut inputs = vec![
        VerificationInput::new("UpgradeBeaconController", contracts.upgrade_beacon_controller),
        VerificationInput::new("XAppConnectionManager", contracts.x_app_connection_manager),
        VerificationInput::new("ValidatorManager", contracts.validator_manager),
    ];

    let upgradeable = [
        (UpgradeableContract::Home, &contracts.home),
        (UpgradeableContract::GovernanceRouter, &contracts.governance_router),
    ]
    .into_iter()
    .chain(
        contracts
            .replicas
            .iter()
            .map(|(remote, replica)| (UpgradeableContract::Replica(*remote), replica)),
    );

    for (contract, proxy) in upgradeable {
        push_beacon_proxy(&mut inputs, contract.label(), proxy);
    }

    inputs
}

fn push_beacon_proxy(inputs: &mut Vec<VerificationInput>, name: &str, proxy: &BeaconProxy) {
    inputs.push(VerificationInput::new(
        format!("{name} Implementation"),
        proxy.implementation,
    ));
    inputs.push(VerificationInput::new(
        format!("{name} UpgradeBeacon"),
        proxy.beacon,
    ));
    inputs.push(VerificationInput::new(format!("{name} Proxy"), proxy.proxy));
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, std::collections::BTreeMap};

    fn proxy(seed: u8) -> BeaconProxy {
        BeaconProxy::new(
            Address::repeat_byte(seed),
            Address::repeat_byte(seed + 1),
            Address::repeat_byte(seed + 2),
        )
    }

    fn contracts() -> CoreContracts {
        CoreContracts {
            home: proxy(0x10),
            replicas: BTreeMap::from([(3000, proxy(0x30)), (2000, proxy(0x20))]),
            governance_router: proxy(0x40),
            validator_manager: Address::repeat_byte(0x50),
            x_app_connection_manager: Address::repeat_byte(0x51),
            upgrade_beacon_controller: Address::repeat_byte(0x52),
        }
    }

    #[test]
    fn labels_in_declaration_order() {
        let labels = verification_inputs(&contracts())
            .into_iter()
            .map(|input| input.label)
            .collect::<Vec<_>>();

        assert_eq!(labels, [
            "UpgradeBeaconController",
            "XAppConnectionManager",
            "ValidatorManager",
            "Home Implementation",
            "Home UpgradeBeacon",
            "Home Proxy",
            "Governance Implementation",
            "Governance UpgradeBeacon",
            "Governance Proxy",
            "Replica Implementation",
            "Replica UpgradeBeacon",
            "Replica Proxy",
            "Replica Implementation",
            "Replica UpgradeBeacon",
            "Replica Proxy",
        ]);
    }

    #[test]
    fn replicas_in_remote_domain_order() {
        let inputs = verification_inputs(&contracts());

        // Domain 2000 sorts before 3000 regardless of insertion order.
        assert_eq!(inputs[9].address, Address::repeat_byte(0x20));
        assert_eq!(inputs[12].address, Address::repeat_byte(0x30));
    }

    #[test]
    fn repeated_calls_agree() {
        let contracts = contracts();

        assert_eq!(
            verification_inputs(&contracts),
            verification_inputs(&contracts)
        );
    }
}
