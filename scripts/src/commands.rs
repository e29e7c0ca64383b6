//! Implementations of the operations scripts.
//!
//! Every address a command needs is resolved from the deployment registry
//! while building its [`Plan`], before any transaction is submitted.

use std::path::Path;

use alloy::primitives::{Address, Bytes, U256};
use itertools::Itertools;
use talentlayer_deployments::{ContractName, DeploymentRegistry, Network};
use tracing::{info, warn};

use crate::{
    config::ScriptConfig,
    constants::SUBGRAPH_NETWORKS_FILE,
    errors::ScriptError,
    plan::{AdminCall, Plan, StepReceipt},
    subgraph::update_subgraph_networks,
    transactor::{DeployedContract, Transactor},
};

// ------------
// | Registry |
// ------------

/// Render every deployment recorded for the configured network
pub fn show(config: &ScriptConfig) -> Result<String, ScriptError> {
    let deployments = config.registry().load(config.network)?;
    if deployments.is_empty() {
        return Ok(format!("no deployments recorded for {}", config.network));
    }

    let lines = deployments.iter().map(|(name, entry)| match entry.implementation {
        Some(implementation) => {
            format!("{name}: {} (implementation {implementation})", entry.address)
        }
        None => format!("{name}: {}", entry.address),
    });
    Ok(format!("{}:\n{}", config.network, lines.format("\n")))
}

/// Record the address of a contract deployed outside of these scripts
pub fn record(
    config: &ScriptConfig,
    contract: ContractName,
    address: Address,
    implementation: Option<Address>,
) -> Result<(), ScriptError> {
    config
        .registry()
        .set(config.network, contract, address, implementation)?;
    info!(network = %config.network, %contract, %address, "recorded deployment");
    Ok(())
}

/// Write the configured network's addresses into the subgraph's `networks.json`
pub fn subgraph_network(
    config: &ScriptConfig,
    subgraph_folder: &Path,
) -> Result<(), ScriptError> {
    let deployments = config.registry().load(config.network)?;
    let path = subgraph_folder.join(SUBGRAPH_NETWORKS_FILE);

    update_subgraph_networks(&path, config.network, &deployments)?;
    info!(
        network = %config.network,
        contracts = deployments.len(),
        path = %path.display(),
        "updated subgraph network configuration"
    );
    Ok(())
}

// --------------
// | Deployment |
// --------------

/// Deploy a contract and record its address on the configured network.
///
/// The registry is checked for writability before the deployment is sent.
pub async fn deploy<T: Transactor + ?Sized>(
    config: &ScriptConfig,
    transactor: &T,
    contract: ContractName,
    bytecode: Bytes,
) -> Result<DeployedContract, ScriptError> {
    let registry = config.registry();
    registry.ensure_writable(config.network)?;

    if contract == ContractName::SimpleErc20 && !config.network.is_test_network() {
        warn!(network = %config.network, "deploying a test token to a production network");
    }

    info!(network = %config.network, %contract, "deploying contract");
    let deployed = transactor.deploy(bytecode).await?;
    info!(%contract, address = %deployed.address, tx_hash = %deployed.tx_hash, "contract deployed");

    if let Err(e) = registry.set(config.network, contract, deployed.address, None) {
        // The contract is on chain; the operator must record it by hand
        warn!(%contract, address = %deployed.address, "deployment could not be recorded");
        return Err(e.into());
    }

    Ok(deployed)
}

/// Deploy a new implementation of an upgradeable contract without recording it
pub async fn prepare_upgrade<T: Transactor + ?Sized>(
    config: &ScriptConfig,
    transactor: &T,
    contract: ContractName,
    bytecode: Bytes,
) -> Result<DeployedContract, ScriptError> {
    ensure_upgradeable(contract)?;
    // Fail early if the contract was never deployed on this network
    config.registry().get(config.network, contract)?;

    info!(network = %config.network, %contract, "deploying new implementation");
    let deployed = transactor.deploy(bytecode).await?;
    info!(%contract, implementation = %deployed.address, "implementation deployed");
    Ok(deployed)
}

/// Upgrade a proxy to a new implementation and record the implementation
pub async fn upgrade_proxy<T: Transactor + ?Sized>(
    config: &ScriptConfig,
    transactor: &T,
    contract: ContractName,
    implementation: Address,
    calldata: Bytes,
) -> Result<Vec<StepReceipt>, ScriptError> {
    let registry = config.registry();
    let plan = upgrade_proxy_plan(&registry, config.network, contract, implementation, calldata)?;
    registry.ensure_writable(config.network)?;

    let receipts = plan.execute(transactor).await?;

    let proxy = registry.get(config.network, contract)?;
    registry.set(config.network, contract, proxy, Some(implementation))?;
    Ok(receipts)
}

// ---------
// | Plans |
// ---------

/// Add or remove a trusted forwarder on every contract that accepts
/// meta-transactions
pub fn trusted_forwarder_plan(
    registry: &DeploymentRegistry,
    network: Network,
    forwarder: Address,
    add: bool,
) -> Result<Plan, ScriptError> {
    let mut plan = Plan::new();
    for contract in ContractName::FORWARDER_RECIPIENTS {
        let address = registry.get(network, contract)?;
        let call = if add {
            AdminCall::AddTrustedForwarder { forwarder }
        } else {
            AdminCall::RemoveTrustedForwarder { forwarder }
        };
        plan.push(contract, address, call);
    }
    Ok(plan)
}

/// Mint a platform ID to an address
pub fn mint_platform_id_plan(
    registry: &DeploymentRegistry,
    network: Network,
    name: String,
    recipient: Address,
) -> Result<Plan, ScriptError> {
    let contract = ContractName::TalentLayerPlatformId;
    let address = registry.get(network, contract)?;
    Ok(Plan::new().with_step(contract, address, AdminCall::MintPlatformId { name, recipient }))
}

/// Mint a TalentLayer ID to an address without payment
pub fn mint_talentlayer_id_plan(
    registry: &DeploymentRegistry,
    network: Network,
    platform_id: u64,
    handle: String,
    recipient: Address,
) -> Result<Plan, ScriptError> {
    let contract = ContractName::TalentLayerId;
    let address = registry.get(network, contract)?;
    let call = AdminCall::MintTalentLayerId {
        platform_id: U256::from(platform_id),
        recipient,
        handle,
    };
    Ok(Plan::new().with_step(contract, address, call))
}

/// Register an arbitrator
pub fn add_arbitrator_plan(
    registry: &DeploymentRegistry,
    network: Network,
    arbitrator: Address,
    is_internal: bool,
) -> Result<Plan, ScriptError> {
    platform_id_plan(
        registry,
        network,
        AdminCall::AddArbitrator {
            arbitrator,
            is_internal,
        },
    )
}

/// Deregister an arbitrator
pub fn remove_arbitrator_plan(
    registry: &DeploymentRegistry,
    network: Network,
    arbitrator: Address,
) -> Result<Plan, ScriptError> {
    platform_id_plan(registry, network, AdminCall::RemoveArbitrator { arbitrator })
}

/// Update the minimum arbitration fee timeout
pub fn update_min_arbitration_fee_timeout_plan(
    registry: &DeploymentRegistry,
    network: Network,
    timeout: u64,
) -> Result<Plan, ScriptError> {
    platform_id_plan(
        registry,
        network,
        AdminCall::UpdateMinArbitrationFeeTimeout {
            timeout: U256::from(timeout),
        },
    )
}

/// Add or remove a token from the list of tokens services may be paid in
pub fn update_allowed_token_plan(
    registry: &DeploymentRegistry,
    network: Network,
    token: Address,
    allowed: bool,
) -> Result<Plan, ScriptError> {
    let contract = ContractName::ServiceRegistry;
    let address = registry.get(network, contract)?;
    Ok(Plan::new().with_step(contract, address, AdminCall::UpdateAllowedToken { token, allowed }))
}

/// Transfer ownership of the proxy admin
pub fn transfer_proxy_ownership_plan(
    registry: &DeploymentRegistry,
    network: Network,
    new_owner: Address,
) -> Result<Plan, ScriptError> {
    let contract = ContractName::ProxyAdmin;
    let address = registry.get(network, contract)?;
    Ok(Plan::new().with_step(contract, address, AdminCall::TransferOwnership { new_owner }))
}

/// Upgrade the proxy of a contract through the proxy admin
pub fn upgrade_proxy_plan(
    registry: &DeploymentRegistry,
    network: Network,
    contract: ContractName,
    implementation: Address,
    calldata: Bytes,
) -> Result<Plan, ScriptError> {
    ensure_upgradeable(contract)?;
    let proxy = registry.get(network, contract)?;
    let proxy_admin = registry.get(network, ContractName::ProxyAdmin)?;

    Ok(Plan::new().with_step(
        ContractName::ProxyAdmin,
        proxy_admin,
        AdminCall::UpgradeProxy {
            proxy,
            implementation,
            calldata,
        },
    ))
}

/// Execute a plan from the given 1-based step, logging each confirmation
pub async fn execute_plan<T: Transactor + ?Sized>(
    plan: &Plan,
    transactor: &T,
    resume_from: usize,
) -> Result<Vec<StepReceipt>, ScriptError> {
    let receipts = plan.execute_from(transactor, resume_from).await?;
    info!(steps = receipts.len(), "operation complete");
    Ok(receipts)
}

// -----------
// | Helpers |
// -----------

/// A single-step plan against the platform ID contract
fn platform_id_plan(
    registry: &DeploymentRegistry,
    network: Network,
    call: AdminCall,
) -> Result<Plan, ScriptError> {
    let contract = ContractName::TalentLayerPlatformId;
    let address = registry.get(network, contract)?;
    Ok(Plan::new().with_step(contract, address, call))
}

/// Fail unless the contract sits behind an upgradeable proxy
fn ensure_upgradeable(contract: ContractName) -> Result<(), ScriptError> {
    if contract.is_upgradeable() {
        Ok(())
    } else {
        Err(ScriptError::Configuration(format!("{contract} is not upgradeable")))
    }
}
