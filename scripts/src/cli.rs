//! Definitions of CLI arguments and commands for the operations scripts

use std::path::PathBuf;

use alloy::primitives::Bytes;
use clap::{Args, Parser, Subcommand, ValueEnum};
use talentlayer_deployments::{ContractName, Network};

use crate::{
    commands::{
        add_arbitrator_plan, deploy, execute_plan, mint_platform_id_plan,
        mint_talentlayer_id_plan, prepare_upgrade, record, remove_arbitrator_plan, show,
        subgraph_network, transfer_proxy_ownership_plan, trusted_forwarder_plan,
        update_allowed_token_plan, update_min_arbitration_fee_timeout_plan, upgrade_proxy,
        upgrade_proxy_plan,
    },
    config::ScriptConfig,
    constants::{
        DEFAULT_DEPLOYMENTS_DIR, DEPLOYMENTS_DIR_ENV_VAR, NETWORK_ENV_VAR, SUBGRAPH_FOLDER_ENV_VAR,
    },
    errors::ScriptError,
    plan::Plan,
    transactor::AlloyTransactor,
    utils::{parse_address, parse_hex_bytes, read_bytecode_artifact, setup_client},
};

/// Deployment and administration scripts for the TalentLayer protocol
#[derive(Parser)]
#[command(version)]
pub struct Cli {
    /// The network to operate on
    #[arg(short, long, env = NETWORK_ENV_VAR)]
    pub network: Network,

    /// The directory holding the per-network deployments files
    #[arg(long, env = DEPLOYMENTS_DIR_ENV_VAR, default_value = DEFAULT_DEPLOYMENTS_DIR)]
    pub deployments_dir: PathBuf,

    /// Print the transactions a command would submit without submitting them
    #[arg(long)]
    pub dry_run: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The operations scripts
#[derive(Subcommand)]
pub enum Command {
    /// Print every deployment recorded for the network
    Show,
    /// Record the address of a contract deployed outside of these scripts
    Record(RecordArgs),
    /// Write the network's addresses into the subgraph's `networks.json`
    SubgraphNetwork(SubgraphNetworkArgs),
    /// Deploy a contract and record its address
    Deploy(DeployArgs),
    /// Deploy a new implementation of an upgradeable contract
    PrepareUpgrade(PrepareUpgradeArgs),
    /// Point a contract's proxy at a new implementation
    UpgradeProxy(UpgradeProxyArgs),
    /// Mint a platform ID
    MintPlatformId(MintPlatformIdArgs),
    /// Mint a TalentLayer ID without payment
    MintTalentlayerId(MintTalentLayerIdArgs),
    /// Register an arbitrator
    AddArbitrator(AddArbitratorArgs),
    /// Deregister an arbitrator
    RemoveArbitrator(AddressArgs),
    /// Update the minimum arbitration fee timeout
    UpdateMinArbitrationFeeTimeout(FeeTimeoutArgs),
    /// Add or remove a token from the list of allowed payment tokens
    UpdateTokenAddressToWhitelist(TokenWhitelistArgs),
    /// Authorize a meta-transaction forwarder on every recipient contract
    AddTrustedForwarder(ForwarderArgs),
    /// Revoke a meta-transaction forwarder on every recipient contract
    RemoveTrustedForwarder(ForwarderArgs),
    /// Transfer ownership of the proxy admin
    TransferProxyOwnership(TransferOwnershipArgs),
}

impl Command {
    /// Whether the command needs a signer and RPC connection
    pub fn requires_chain(&self, dry_run: bool) -> bool {
        match self {
            Command::Show | Command::Record(_) | Command::SubgraphNetwork(_) => false,
            _ => !dry_run,
        }
    }

    /// Run the command against the given configuration
    pub async fn run(self, config: &ScriptConfig) -> Result<(), ScriptError> {
        let registry = config.registry();
        let network = config.network;

        match self {
            Command::Show => {
                println!("{}", show(config)?);
                Ok(())
            }
            Command::Record(args) => {
                let address = parse_address(&args.address)?;
                let implementation = args
                    .implementation
                    .as_deref()
                    .map(parse_address)
                    .transpose()?;
                record(config, args.contract, address, implementation)?;
                println!("recorded {} at {address} on {network}", args.contract);
                Ok(())
            }
            Command::SubgraphNetwork(args) => {
                subgraph_network(config, &args.subgraph_folder)?;
                println!("updated subgraph networks for {network}");
                Ok(())
            }
            Command::Deploy(args) => {
                let mut bytecode = read_bytecode_artifact(&args.artifact)?.to_vec();
                if let Some(constructor_args) = args.constructor_args.as_deref() {
                    bytecode.extend_from_slice(&parse_hex_bytes(constructor_args)?);
                }

                if config.dry_run {
                    println!(
                        "would deploy {} ({} bytes) to {network}",
                        args.contract,
                        bytecode.len()
                    );
                    return Ok(());
                }

                let transactor = connect(config).await?;
                let deployed =
                    deploy(config, &transactor, args.contract, Bytes::from(bytecode)).await?;
                println!(
                    "{} deployed at {} (tx {:#x})",
                    args.contract, deployed.address, deployed.tx_hash
                );
                Ok(())
            }
            Command::PrepareUpgrade(args) => {
                let bytecode = read_bytecode_artifact(&args.artifact)?;
                if config.dry_run {
                    println!(
                        "would deploy a new {} implementation ({} bytes) to {network}",
                        args.contract,
                        bytecode.len()
                    );
                    return Ok(());
                }

                let transactor = connect(config).await?;
                let deployed = prepare_upgrade(config, &transactor, args.contract, bytecode).await?;
                println!(
                    "new {} implementation deployed at {} (tx {:#x})",
                    args.contract, deployed.address, deployed.tx_hash
                );
                Ok(())
            }
            Command::UpgradeProxy(args) => {
                let implementation = parse_address(&args.implementation)?;
                let calldata = match args.calldata.as_deref() {
                    Some(calldata) => parse_hex_bytes(calldata)?,
                    None => Bytes::new(),
                };

                if config.dry_run {
                    let plan = upgrade_proxy_plan(
                        &registry,
                        network,
                        args.contract,
                        implementation,
                        calldata,
                    )?;
                    print!("{plan}");
                    return Ok(());
                }

                let transactor = connect(config).await?;
                let receipts =
                    upgrade_proxy(config, &transactor, args.contract, implementation, calldata)
                        .await?;
                for receipt in receipts {
                    println!("{} confirmed (tx {:#x})", receipt.description, receipt.tx_hash);
                }
                println!("{} upgraded to {implementation}", args.contract);
                Ok(())
            }
            Command::MintPlatformId(args) => {
                let recipient = parse_address(&args.address)?;
                let plan = mint_platform_id_plan(&registry, network, args.name, recipient)?;
                run_plan(&plan, config, 1).await
            }
            Command::MintTalentlayerId(args) => {
                let recipient = parse_address(&args.address)?;
                let plan = mint_talentlayer_id_plan(
                    &registry,
                    network,
                    args.platform_id,
                    args.handle,
                    recipient,
                )?;
                run_plan(&plan, config, 1).await
            }
            Command::AddArbitrator(args) => {
                let arbitrator = parse_address(&args.address)?;
                let plan = add_arbitrator_plan(&registry, network, arbitrator, args.internal)?;
                run_plan(&plan, config, 1).await
            }
            Command::RemoveArbitrator(args) => {
                let arbitrator = parse_address(&args.address)?;
                let plan = remove_arbitrator_plan(&registry, network, arbitrator)?;
                run_plan(&plan, config, 1).await
            }
            Command::UpdateMinArbitrationFeeTimeout(args) => {
                let plan =
                    update_min_arbitration_fee_timeout_plan(&registry, network, args.timeout)?;
                run_plan(&plan, config, 1).await
            }
            Command::UpdateTokenAddressToWhitelist(args) => {
                let token = parse_address(&args.address)?;
                let allowed = args.action == TokenAction::Add;
                let plan = update_allowed_token_plan(&registry, network, token, allowed)?;
                run_plan(&plan, config, 1).await
            }
            Command::AddTrustedForwarder(args) => {
                let forwarder = parse_address(&args.address)?;
                let plan = trusted_forwarder_plan(&registry, network, forwarder, true)?;
                run_plan(&plan, config, args.resume_from).await
            }
            Command::RemoveTrustedForwarder(args) => {
                let forwarder = parse_address(&args.address)?;
                let plan = trusted_forwarder_plan(&registry, network, forwarder, false)?;
                run_plan(&plan, config, args.resume_from).await
            }
            Command::TransferProxyOwnership(args) => {
                let new_owner = parse_address(&args.new_owner)?;
                let plan = transfer_proxy_ownership_plan(&registry, network, new_owner)?;
                run_plan(&plan, config, 1).await
            }
        }
    }
}

/// Record the address of a contract
#[derive(Args)]
pub struct RecordArgs {
    /// The logical name of the contract
    #[arg(short, long)]
    pub contract: ContractName,

    /// The address of the contract, or of its proxy
    #[arg(short, long)]
    pub address: String,

    /// The address of the implementation behind the proxy
    #[arg(short, long)]
    pub implementation: Option<String>,
}

/// Export addresses to the subgraph
#[derive(Args)]
pub struct SubgraphNetworkArgs {
    /// The root folder of the subgraph
    #[arg(short, long, env = SUBGRAPH_FOLDER_ENV_VAR)]
    pub subgraph_folder: PathBuf,
}

/// Deploy a contract
#[derive(Args)]
pub struct DeployArgs {
    /// The logical name to record the contract under
    #[arg(short, long)]
    pub contract: ContractName,

    /// Path to the compilation artifact: Hardhat or Foundry JSON, or raw hex
    #[arg(short, long)]
    pub artifact: PathBuf,

    /// ABI-encoded constructor arguments, in hex, appended to the bytecode
    #[arg(long)]
    pub constructor_args: Option<String>,
}

/// Deploy a new implementation
#[derive(Args)]
pub struct PrepareUpgradeArgs {
    /// The upgradeable contract the implementation is for
    #[arg(short, long)]
    pub contract: ContractName,

    /// Path to the compilation artifact of the new implementation
    #[arg(short, long)]
    pub artifact: PathBuf,
}

/// Upgrade a contract's proxy
#[derive(Args)]
pub struct UpgradeProxyArgs {
    /// The upgradeable contract whose proxy is upgraded
    #[arg(short, long)]
    pub contract: ContractName,

    /// Address of the new implementation contract
    #[arg(short, long)]
    pub implementation: String,

    /// Optional calldata, in hex form, with which to
    /// call the implementation contract when upgrading
    #[arg(long)]
    pub calldata: Option<String>,
}

/// Mint a platform ID
#[derive(Args)]
pub struct MintPlatformIdArgs {
    /// The platform name
    #[arg(long)]
    pub name: String,

    /// The address receiving the platform ID
    #[arg(short, long)]
    pub address: String,
}

/// Mint a TalentLayer ID
#[derive(Args)]
pub struct MintTalentLayerIdArgs {
    /// The ID of the platform the user is onboarded through
    #[arg(long)]
    pub platform_id: u64,

    /// The user handle
    #[arg(long)]
    pub handle: String,

    /// The address receiving the TalentLayer ID
    #[arg(short, long)]
    pub address: String,
}

/// Register an arbitrator
#[derive(Args)]
pub struct AddArbitratorArgs {
    /// The arbitrator contract address
    #[arg(short, long)]
    pub address: String,

    /// Whether the arbitrator is operated by the protocol
    #[arg(long)]
    pub internal: bool,
}

/// A command taking a single address
#[derive(Args)]
pub struct AddressArgs {
    /// The address to operate on
    #[arg(short, long)]
    pub address: String,
}

/// Update the minimum arbitration fee timeout
#[derive(Args)]
pub struct FeeTimeoutArgs {
    /// The new timeout, in seconds
    #[arg(short, long)]
    pub timeout: u64,
}

/// Update the payment token whitelist
#[derive(Args)]
pub struct TokenWhitelistArgs {
    /// The token address
    #[arg(short, long)]
    pub address: String,

    /// Whether to add the token to the whitelist or remove it
    #[arg(long, value_enum)]
    pub action: TokenAction,
}

/// A change to the payment token whitelist
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenAction {
    /// Allow the token
    Add,
    /// Disallow the token
    Remove,
}

/// Change a trusted forwarder
#[derive(Args)]
pub struct ForwarderArgs {
    /// The forwarder address
    #[arg(short, long)]
    pub address: String,

    /// The 1-based step to start from, skipping steps that already completed
    #[arg(long, default_value_t = 1)]
    pub resume_from: usize,
}

/// Transfer ownership of the proxy admin
#[derive(Args)]
pub struct TransferOwnershipArgs {
    /// The new owner
    #[arg(long)]
    pub new_owner: String,
}

// -----------
// | Helpers |
// -----------

/// Connect a transactor to the configured network
async fn connect(config: &ScriptConfig) -> Result<AlloyTransactor, ScriptError> {
    let client = setup_client(config.chain()?).await?;
    Ok(AlloyTransactor::new(client))
}

/// Execute a plan, or print it in a dry run
async fn run_plan(
    plan: &Plan,
    config: &ScriptConfig,
    resume_from: usize,
) -> Result<(), ScriptError> {
    if config.dry_run {
        print!("{plan}");
        return Ok(());
    }

    let transactor = connect(config).await?;
    let receipts = execute_plan(plan, &transactor, resume_from).await?;
    for receipt in receipts {
        println!(
            "step {}/{}: {} confirmed (tx {:#x})",
            receipt.step,
            plan.len(),
            receipt.description,
            receipt.tx_hash
        );
    }
    Ok(())
}
