//! A per-network registry of deployed TalentLayer contract addresses.
//!
//! Deployment and administration run as separate invocations, often days apart,
//! so every address a script needs is looked up here rather than passed around
//! by hand. Each network is stored in its own JSON file under the registry root.

#![deny(missing_docs)]

pub mod errors;
pub mod fs;
pub mod registry;
pub mod types;

pub use errors::DeploymentsError;
pub use registry::DeploymentRegistry;
pub use types::{ContractName, DeploymentEntry, Network, NetworkDeployments};
