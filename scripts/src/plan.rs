//! Ordered, fail-fast execution of privileged contract calls.
//!
//! An administrative operation is a [`Plan`]: a list of [`Step`]s, each a
//! single privileged call bound to an address resolved from the registry.
//! Steps run strictly in order, each waiting for its transaction to confirm,
//! and execution stops at the first failure. Every call is safe to repeat, so
//! an operator recovers from a partial failure by resuming at the failed step.

use std::fmt::{self, Display};

use alloy::primitives::{Address, Bytes, TxHash, U256};
use talentlayer_deployments::ContractName;
use tracing::{info, warn};

use crate::{errors::ScriptError, transactor::Transactor};

/// A privileged contract call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCall {
    /// Authorize a meta-transaction forwarder
    AddTrustedForwarder {
        /// The forwarder address
        forwarder: Address,
    },
    /// Revoke a meta-transaction forwarder
    RemoveTrustedForwarder {
        /// The forwarder address
        forwarder: Address,
    },
    /// Mint a platform ID to an address
    MintPlatformId {
        /// The platform name
        name: String,
        /// The address receiving the ID
        recipient: Address,
    },
    /// Mint a TalentLayer ID to an address without payment
    MintTalentLayerId {
        /// The platform the user is onboarded through
        platform_id: U256,
        /// The address receiving the ID
        recipient: Address,
        /// The user handle
        handle: String,
    },
    /// Register an arbitrator platforms may select
    AddArbitrator {
        /// The arbitrator contract address
        arbitrator: Address,
        /// Whether the arbitrator is operated by the protocol
        is_internal: bool,
    },
    /// Deregister an arbitrator
    RemoveArbitrator {
        /// The arbitrator contract address
        arbitrator: Address,
    },
    /// Update the minimum arbitration fee timeout, in seconds
    UpdateMinArbitrationFeeTimeout {
        /// The new timeout
        timeout: U256,
    },
    /// Add or remove a token from the list of tokens services may be paid in
    UpdateAllowedToken {
        /// The token address
        token: Address,
        /// Whether the token is allowed
        allowed: bool,
    },
    /// Point a proxy at a new implementation, optionally calling it
    UpgradeProxy {
        /// The proxy address
        proxy: Address,
        /// The new implementation address
        implementation: Address,
        /// Calldata to call the implementation with; empty for a plain upgrade
        calldata: Bytes,
    },
    /// Transfer ownership of the contract
    TransferOwnership {
        /// The new owner
        new_owner: Address,
    },
}

impl AdminCall {
    /// The name of the Solidity function this call invokes
    pub fn function_name(&self) -> &'static str {
        match self {
            AdminCall::AddTrustedForwarder { .. } => "addTrustedForwarder",
            AdminCall::RemoveTrustedForwarder { .. } => "removeTrustedForwarder",
            AdminCall::MintPlatformId { .. } => "mintForAddress",
            AdminCall::MintTalentLayerId { .. } => "freeMint",
            AdminCall::AddArbitrator { .. } => "addArbitrator",
            AdminCall::RemoveArbitrator { .. } => "removeArbitrator",
            AdminCall::UpdateMinArbitrationFeeTimeout { .. } => "updateMinArbitrationFeeTimeout",
            AdminCall::UpdateAllowedToken { .. } => "updateAllowedTokenList",
            AdminCall::UpgradeProxy { calldata, .. } if calldata.is_empty() => "upgrade",
            AdminCall::UpgradeProxy { .. } => "upgradeAndCall",
            AdminCall::TransferOwnership { .. } => "transferOwnership",
        }
    }
}

/// A privileged call bound to a deployed contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The logical name of the target contract
    pub contract: ContractName,
    /// The address of the target contract
    pub address: Address,
    /// The call to make
    pub call: AdminCall,
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} at {}",
            self.contract,
            self.call.function_name(),
            self.address
        )
    }
}

/// The confirmation of a completed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReceipt {
    /// The 1-based index of the step
    pub step: usize,
    /// The step that completed
    pub description: String,
    /// The hash of the confirmed transaction
    pub tx_hash: TxHash,
}

/// An ordered list of privileged calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// The steps, in execution order
    steps: Vec<Step>,
}

impl Plan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step to the plan
    pub fn push(&mut self, contract: ContractName, address: Address, call: AdminCall) {
        self.steps.push(Step {
            contract,
            address,
            call,
        });
    }

    /// Append a step to the plan, builder-style
    pub fn with_step(mut self, contract: ContractName, address: Address, call: AdminCall) -> Self {
        self.push(contract, address, call);
        self
    }

    /// The steps of the plan, in execution order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The number of steps in the plan
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Execute every step of the plan in order
    pub async fn execute<T: Transactor + ?Sized>(
        &self,
        transactor: &T,
    ) -> Result<Vec<StepReceipt>, ScriptError> {
        self.execute_from(transactor, 1).await
    }

    /// Execute the plan starting at the given 1-based step.
    ///
    /// Each step's transaction is confirmed before the next is submitted. The
    /// first failure aborts the plan; later steps are never attempted.
    pub async fn execute_from<T: Transactor + ?Sized>(
        &self,
        transactor: &T,
        first_step: usize,
    ) -> Result<Vec<StepReceipt>, ScriptError> {
        let total = self.steps.len();
        if first_step == 0 || first_step > total {
            return Err(ScriptError::Configuration(format!(
                "cannot resume from step {first_step}, the operation has {total} step(s)"
            )));
        }
        if first_step > 1 {
            warn!(skipped = first_step - 1, "resuming operation, skipping completed steps");
        }

        let mut receipts = Vec::with_capacity(total - first_step + 1);
        for (idx, step) in self.steps.iter().enumerate().skip(first_step - 1) {
            let step_num = idx + 1;
            info!(step = step_num, total, "submitting {step}");

            let tx_hash = transactor.submit(step).await.map_err(|e| ScriptError::StepFailed {
                step: step_num,
                total,
                description: step.to_string(),
                completed: receipts.len(),
                source: Box::new(e),
            })?;

            info!(step = step_num, total, %tx_hash, "confirmed {step}");
            receipts.push(StepReceipt {
                step: step_num,
                description: step.to_string(),
                tx_hash,
            });
        }

        Ok(receipts)
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, step) in self.steps.iter().enumerate() {
            writeln!(f, "{}. {step}", idx + 1)?;
        }
        Ok(())
    }
}
