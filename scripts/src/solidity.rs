//! Definitions of the privileged Solidity functions called by the operations scripts

use alloy::sol;

sol! {
    /// Implemented by every contract that accepts meta-transactions
    #[sol(rpc)]
    interface ITrustedForwarderRecipient {
        function addTrustedForwarder(address forwarder) external;
        function removeTrustedForwarder(address forwarder) external;
    }
}

sol! {
    #[sol(rpc)]
    interface ITalentLayerPlatformID {
        function mintForAddress(string memory platformName, address platformAddress) external payable;
        function addArbitrator(address arbitrator, bool isInternal) external;
        function removeArbitrator(address arbitrator) external;
        function updateMinArbitrationFeeTimeout(uint256 minArbitrationFeeTimeout) external;
    }
}

sol! {
    #[sol(rpc)]
    interface ITalentLayerID {
        function freeMint(uint256 platformId, address userAddress, string calldata handle) external;
    }
}

sol! {
    #[sol(rpc)]
    interface IServiceRegistry {
        function updateAllowedTokenList(address tokenAddress, bool isWhitelisted) external;
    }
}

sol! {
    /// The OpenZeppelin (v4) admin of the transparent upgradeable proxies
    #[sol(rpc)]
    interface IProxyAdmin {
        function upgrade(address proxy, address implementation) external;
        function upgradeAndCall(address proxy, address implementation, bytes memory data) external payable;
        function transferOwnership(address newOwner) external;
    }
}
