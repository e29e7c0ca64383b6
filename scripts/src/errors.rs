//! Definitions of errors that can occur during the execution of the operations scripts

use talentlayer_deployments::DeploymentsError;
use thiserror::Error;

/// Errors that can occur during the execution of the operations scripts
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Required configuration is missing or invalid
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Error reading or writing the deployment registry, or a missing entry
    #[error(transparent)]
    Deployments(#[from] DeploymentsError),
    /// Error initializing the RPC client
    #[error("error initializing client: {0}")]
    ClientInitialization(String),
    /// Error parsing a compilation artifact
    #[error("error parsing artifact: {0}")]
    ArtifactParsing(String),
    /// Error constructing calldata for a contract method
    #[error("error constructing calldata: {0}")]
    CalldataConstruction(String),
    /// Error deploying a contract
    #[error("error deploying contract: {0}")]
    ContractDeployment(String),
    /// A transaction failed to send, reverted, or never confirmed
    #[error("transaction failed: {0}")]
    Transaction(String),
    /// A step of a multi-step operation failed; later steps were not attempted
    #[error("step {step} of {total} ({description}) failed after {completed} completed step(s): {source}")]
    StepFailed {
        /// The 1-based index of the failed step
        step: usize,
        /// The number of steps in the operation
        total: usize,
        /// A description of the failed step
        description: String,
        /// The number of steps that completed in this invocation
        completed: usize,
        /// The error the step failed with
        source: Box<ScriptError>,
    },
}
