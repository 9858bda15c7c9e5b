use {
    alloy::primitives::Address,
    serde::{Deserialize, Serialize},
};

/// An upgradeable contract: clients call `proxy`, which delegates through
/// `beacon` to whichever `implementation` the beacon currently points at.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconProxy {
    pub implementation: Address,
    pub beacon: Address,
    pub proxy: Address,
}

impl BeaconProxy {
    pub const fn new(implementation: Address, beacon: Address, proxy: Address) -> Self {
        Self {
            implementation,
            beacon,
            proxy,
        }
    }

    /// All three addresses are set and no two of them coincide.
    pub fn is_well_formed(&self) -> bool {
        let addrs = [self.implementation, self.beacon, self.proxy];

        addrs.iter().all(|addr| !addr.is_zero())
            && self.implementation != self.beacon
            && self.implementation != self.proxy
            && self.beacon != self.proxy
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address};

    const IMPL: Address = address!("00000000000000000000000000000000000000a1");
    const BEACON: Address = address!("00000000000000000000000000000000000000b1");
    const PROXY: Address = address!("00000000000000000000000000000000000000c1");

    #[test]
    fn well_formed_triple() {
        assert!(BeaconProxy::new(IMPL, BEACON, PROXY).is_well_formed());
    }

    #[test]
    fn zero_address_is_malformed() {
        assert!(!BeaconProxy::new(IMPL, Address::ZERO, PROXY).is_well_formed());
    }

    #[test]
    fn reused_address_is_malformed() {
        assert!(!BeaconProxy::new(IMPL, BEACON, IMPL).is_well_formed());
        assert!(!BeaconProxy::new(IMPL, BEACON, BEACON).is_well_formed());
    }
}
