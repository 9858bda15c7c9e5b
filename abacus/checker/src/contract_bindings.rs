//! Bindings for the read-only surface of the core contracts.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface Ownable {
        function owner() external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    interface Home {
        function localDomain() external view returns (uint32);
        function validatorManager() external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    interface ValidatorManager {
        function validators(uint32 domain) external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    interface GovernanceRouter {
        function routers(uint32 domain) external view returns (bytes32);
        function governorDomain() external view returns (uint32);
        function governor() external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    interface XAppConnectionManager {
        function domainToReplica(uint32 domain) external view returns (address);
        function home() external view returns (address);
    }
}
