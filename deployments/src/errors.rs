//! Errors that can occur while reading or writing the deployment registry

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ContractName, Network};

/// Errors that can occur while reading or writing the deployment registry
#[derive(Debug, Error)]
pub enum DeploymentsError {
    /// No address has been recorded for the contract on the network
    #[error("no deployment of {name} recorded for network {network}")]
    NotFound {
        /// The network that was queried
        network: Network,
        /// The contract that was queried
        name: ContractName,
    },
    /// A network name did not match any known network
    #[error("unknown network `{given}`, expected one of: {known}")]
    UnknownNetwork {
        /// The name that failed to parse
        given: String,
        /// The known network names
        known: String,
    },
    /// A contract name did not match any known logical contract name
    #[error("unknown contract `{given}`, expected one of: {known}")]
    UnknownContract {
        /// The name that failed to parse
        given: String,
        /// The known contract names
        known: String,
    },
    /// The zero address was given for, or found recorded for, a contract
    #[error("the zero address is not a valid deployment of {name} on {network}")]
    ZeroAddress {
        /// The network of the entry
        network: Network,
        /// The contract of the entry
        name: ContractName,
    },
    /// Error reading a deployments file
    #[error("error reading {}: {source}", .path.display())]
    Read {
        /// The file that could not be read
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },
    /// Error parsing a deployments file
    #[error("error parsing {}: {source}", .path.display())]
    Parse {
        /// The file that could not be parsed
        path: PathBuf,
        /// The underlying JSON error
        source: serde_json::Error,
    },
    /// Error writing a deployments file
    #[error("error writing {}: {reason}", .path.display())]
    Write {
        /// The file that could not be written
        path: PathBuf,
        /// A description of the failure
        reason: String,
    },
}

impl DeploymentsError {
    /// Whether this error reports a missing entry, as opposed to a storage failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, DeploymentsError::NotFound { .. })
    }
}
