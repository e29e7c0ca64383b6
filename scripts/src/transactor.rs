//! Submission of transactions to the chain.
//!
//! Commands only talk to the chain through [`Transactor`], which submits one
//! transaction at a time and returns once it is confirmed.

use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    errors::ScriptError,
    plan::{AdminCall, Step},
    solidity::{
        IProxyAdmin, IServiceRegistry, ITalentLayerID, ITalentLayerPlatformID,
        ITrustedForwarderRecipient,
    },
};

/// The provider type used to talk to the chain
pub type Client = DynProvider<Ethereum>;

/// The address and transaction of a newly deployed contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployedContract {
    /// The address of the deployed contract
    pub address: Address,
    /// The hash of the deployment transaction
    pub tx_hash: TxHash,
}

/// Submits transactions and waits for them to confirm
#[async_trait]
pub trait Transactor: Send + Sync {
    /// Submit the call described by a step and wait for it to confirm.
    ///
    /// A reverted transaction is an error.
    async fn submit(&self, step: &Step) -> Result<TxHash, ScriptError>;

    /// Deploy contract creation bytecode and wait for the deployment to confirm
    async fn deploy(&self, bytecode: Bytes) -> Result<DeployedContract, ScriptError>;
}

/// A [`Transactor`] backed by a signing RPC client
#[derive(Clone)]
pub struct AlloyTransactor {
    /// The signing client
    client: Client,
}

impl AlloyTransactor {
    /// Create a transactor around a signing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transactor for AlloyTransactor {
    async fn submit(&self, step: &Step) -> Result<TxHash, ScriptError> {
        let client = self.client.clone();
        let address = step.address;

        match &step.call {
            AdminCall::AddTrustedForwarder { forwarder } => {
                let contract = ITrustedForwarderRecipient::new(address, client);
                send_tx(contract.addTrustedForwarder(*forwarder)).await
            }
            AdminCall::RemoveTrustedForwarder { forwarder } => {
                let contract = ITrustedForwarderRecipient::new(address, client);
                send_tx(contract.removeTrustedForwarder(*forwarder)).await
            }
            AdminCall::MintPlatformId { name, recipient } => {
                let contract = ITalentLayerPlatformID::new(address, client);
                send_tx(contract.mintForAddress(name.clone(), *recipient)).await
            }
            AdminCall::MintTalentLayerId {
                platform_id,
                recipient,
                handle,
            } => {
                let contract = ITalentLayerID::new(address, client);
                send_tx(contract.freeMint(*platform_id, *recipient, handle.clone())).await
            }
            AdminCall::AddArbitrator {
                arbitrator,
                is_internal,
            } => {
                let contract = ITalentLayerPlatformID::new(address, client);
                send_tx(contract.addArbitrator(*arbitrator, *is_internal)).await
            }
            AdminCall::RemoveArbitrator { arbitrator } => {
                let contract = ITalentLayerPlatformID::new(address, client);
                send_tx(contract.removeArbitrator(*arbitrator)).await
            }
            AdminCall::UpdateMinArbitrationFeeTimeout { timeout } => {
                let contract = ITalentLayerPlatformID::new(address, client);
                send_tx(contract.updateMinArbitrationFeeTimeout(*timeout)).await
            }
            AdminCall::UpdateAllowedToken { token, allowed } => {
                let contract = IServiceRegistry::new(address, client);
                send_tx(contract.updateAllowedTokenList(*token, *allowed)).await
            }
            AdminCall::UpgradeProxy {
                proxy,
                implementation,
                calldata,
            } => {
                let contract = IProxyAdmin::new(address, client);
                // The v4 `upgradeAndCall` always calls the implementation, which
                // fails for empty calldata without a fallback
                if calldata.is_empty() {
                    send_tx(contract.upgrade(*proxy, *implementation)).await
                } else {
                    send_tx(contract.upgradeAndCall(*proxy, *implementation, calldata.clone()))
                        .await
                }
            }
            AdminCall::TransferOwnership { new_owner } => {
                let contract = IProxyAdmin::new(address, client);
                send_tx(contract.transferOwnership(*new_owner)).await
            }
        }
    }

    async fn deploy(&self, bytecode: Bytes) -> Result<DeployedContract, ScriptError> {
        let tx = TransactionRequest::default().with_deploy_code(bytecode);

        let receipt = self
            .client
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        ensure_success(&receipt).map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "receipt for {:#x} has no contract address",
                receipt.transaction_hash
            ))
        })?;

        Ok(DeployedContract {
            address,
            tx_hash: receipt.transaction_hash,
        })
    }
}

// -----------
// | Helpers |
// -----------

/// Send a transaction and wait for it to confirm successfully
async fn send_tx<C: CallDecoder>(
    tx: CallBuilder<&Client, C, Ethereum>,
) -> Result<TxHash, ScriptError> {
    let pending_tx = tx
        .send()
        .await
        .map_err(|e| ScriptError::Transaction(e.to_string()))?;
    debug!(tx_hash = %pending_tx.tx_hash(), "transaction sent, awaiting receipt");

    let receipt = pending_tx
        .get_receipt()
        .await
        .map_err(|e| ScriptError::Transaction(e.to_string()))?;
    ensure_success(&receipt)?;

    Ok(receipt.transaction_hash)
}

/// Fail if the transaction reverted
fn ensure_success(receipt: &TransactionReceipt) -> Result<(), ScriptError> {
    if receipt.status() {
        Ok(())
    } else {
        Err(ScriptError::Transaction(format!(
            "transaction {:#x} reverted",
            receipt.transaction_hash
        )))
    }
}
