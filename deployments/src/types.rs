//! Type definitions for networks, logical contract names and recorded deployments

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    str::FromStr,
};

use alloy_primitives::Address;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::DeploymentsError;

/// The recorded deployments of a single network, keyed by logical contract name
pub type NetworkDeployments = BTreeMap<ContractName, DeploymentEntry>;

// ------------
// | Networks |
// ------------

/// The networks the protocol is deployed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// A local development node
    Localhost,
    /// Ethereum mainnet
    Mainnet,
    /// Avalanche C-Chain
    Avalanche,
    /// Avalanche Fuji testnet
    Fuji,
    /// Polygon PoS
    Polygon,
    /// Polygon Mumbai testnet
    Mumbai,
}

impl Network {
    /// Every known network
    pub const ALL: [Network; 6] = [
        Network::Localhost,
        Network::Mainnet,
        Network::Avalanche,
        Network::Fuji,
        Network::Polygon,
        Network::Mumbai,
    ];

    /// The name of the network, as used in file names and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Localhost => "localhost",
            Network::Mainnet => "mainnet",
            Network::Avalanche => "avalanche",
            Network::Fuji => "fuji",
            Network::Polygon => "polygon",
            Network::Mumbai => "mumbai",
        }
    }

    /// The chain ID a node for this network must report.
    ///
    /// `None` for local nodes, whose chain ID depends on the node software.
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            Network::Localhost => None,
            Network::Mainnet => Some(1),
            Network::Avalanche => Some(43114),
            Network::Fuji => Some(43113),
            Network::Polygon => Some(137),
            Network::Mumbai => Some(80001),
        }
    }

    /// Whether this network is a testnet or local node
    pub fn is_test_network(&self) -> bool {
        matches!(self, Network::Localhost | Network::Fuji | Network::Mumbai)
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = DeploymentsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|network| network.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DeploymentsError::UnknownNetwork {
                given: s.to_string(),
                known: Network::ALL.iter().join(", "),
            })
    }
}

// ------------------
// | Contract Names |
// ------------------

/// The logical names of the protocol's contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractName {
    /// The user identity contract
    #[serde(rename = "TalentLayerID")]
    TalentLayerId,
    /// The platform identity contract
    #[serde(rename = "TalentLayerPlatformID")]
    TalentLayerPlatformId,
    /// The service registry
    ServiceRegistry,
    /// The review contract
    TalentLayerReview,
    /// The escrow contract
    TalentLayerEscrow,
    /// The protocol's own arbitrator
    TalentLayerArbitrator,
    /// A test ERC20 token
    #[serde(rename = "SimpleERC20")]
    SimpleErc20,
    /// The admin contract of the upgradeable proxies
    ProxyAdmin,
}

impl ContractName {
    /// Every known logical contract name
    pub const ALL: [ContractName; 8] = [
        ContractName::TalentLayerId,
        ContractName::TalentLayerPlatformId,
        ContractName::ServiceRegistry,
        ContractName::TalentLayerReview,
        ContractName::TalentLayerEscrow,
        ContractName::TalentLayerArbitrator,
        ContractName::SimpleErc20,
        ContractName::ProxyAdmin,
    ];

    /// The contracts that accept meta-transactions through a trusted forwarder,
    /// in the order forwarder changes are applied to them
    pub const FORWARDER_RECIPIENTS: [ContractName; 4] = [
        ContractName::TalentLayerId,
        ContractName::ServiceRegistry,
        ContractName::TalentLayerReview,
        ContractName::TalentLayerEscrow,
    ];

    /// Whether the contract is deployed behind a transparent upgradeable proxy
    pub fn is_upgradeable(&self) -> bool {
        matches!(
            self,
            ContractName::TalentLayerId
                | ContractName::TalentLayerPlatformId
                | ContractName::ServiceRegistry
                | ContractName::TalentLayerReview
                | ContractName::TalentLayerEscrow
        )
    }

    /// The logical name of the contract, as stored in the deployments files
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractName::TalentLayerId => "TalentLayerID",
            ContractName::TalentLayerPlatformId => "TalentLayerPlatformID",
            ContractName::ServiceRegistry => "ServiceRegistry",
            ContractName::TalentLayerReview => "TalentLayerReview",
            ContractName::TalentLayerEscrow => "TalentLayerEscrow",
            ContractName::TalentLayerArbitrator => "TalentLayerArbitrator",
            ContractName::SimpleErc20 => "SimpleERC20",
            ContractName::ProxyAdmin => "ProxyAdmin",
        }
    }
}

impl Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractName {
    type Err = DeploymentsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DeploymentsError::UnknownContract {
                given: s.to_string(),
                known: ContractName::ALL.iter().join(", "),
            })
    }
}

// ---------------
// | Deployments |
// ---------------

/// A single recorded deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentEntry {
    /// The address callers interact with; the proxy for upgradeable contracts
    pub address: Address,
    /// The implementation currently behind the proxy, if the contract is upgradeable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<Address>,
}

impl DeploymentEntry {
    /// An entry for a contract deployed without a proxy
    pub fn new(address: Address) -> Self {
        Self {
            address,
            implementation: None,
        }
    }

    /// Whether the entry records the zero address for the contract or its implementation
    pub fn has_zero_address(&self) -> bool {
        self.address.is_zero() || self.implementation.is_some_and(|addr| addr.is_zero())
    }
}
