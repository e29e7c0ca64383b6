//! Tests of the administrative operations against a recording transactor

use std::sync::Mutex;

use alloy::primitives::{address, Address, Bytes, TxHash};
use async_trait::async_trait;
use eyre::Result;
use talentlayer_deployments::{ContractName, Network};
use talentlayer_scripts::{
    commands::{
        deploy, execute_plan, mint_platform_id_plan, prepare_upgrade, trusted_forwarder_plan,
        upgrade_proxy,
    },
    config::ScriptConfig,
    errors::ScriptError,
    plan::{AdminCall, Step},
    transactor::{DeployedContract, Transactor},
};
use tempfile::TempDir;

/// The address of the forwarder used across tests
const FORWARDER: Address = address!("0xf0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0");

/// A transactor that records every submission and can fail a given attempt
#[derive(Default)]
struct MockTransactor {
    /// The steps submitted, in order
    submitted: Mutex<Vec<Step>>,
    /// The number of deployments sent
    deployments: Mutex<usize>,
    /// The 1-based submission attempt that fails, if any
    fail_on: Option<usize>,
}

impl MockTransactor {
    fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on: Some(attempt),
            ..Default::default()
        }
    }

    fn submitted(&self) -> Vec<Step> {
        self.submitted.lock().unwrap().clone()
    }

    fn deployments(&self) -> usize {
        *self.deployments.lock().unwrap()
    }
}

#[async_trait]
impl Transactor for MockTransactor {
    async fn submit(&self, step: &Step) -> Result<TxHash, ScriptError> {
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(step.clone());

        let attempt = submitted.len();
        if self.fail_on == Some(attempt) {
            return Err(ScriptError::Transaction("execution reverted".to_string()));
        }
        Ok(TxHash::repeat_byte(attempt as u8))
    }

    async fn deploy(&self, _bytecode: Bytes) -> Result<DeployedContract, ScriptError> {
        let mut deployments = self.deployments.lock().unwrap();
        *deployments += 1;
        Ok(DeployedContract {
            address: Address::repeat_byte(0xd0 + *deployments as u8),
            tx_hash: TxHash::repeat_byte(0xee),
        })
    }
}

fn setup_config(network: Network) -> (TempDir, ScriptConfig) {
    let dir = TempDir::new().unwrap();
    let config = ScriptConfig::new(network, dir.path().join(".deployment"), false);
    (dir, config)
}

/// Record every contract that accepts meta-transactions
fn record_forwarder_recipients(config: &ScriptConfig) -> Result<()> {
    let registry = config.registry();
    for (i, contract) in ContractName::FORWARDER_RECIPIENTS.into_iter().enumerate() {
        registry.set(config.network, contract, Address::repeat_byte(i as u8 + 1), None)?;
    }
    Ok(())
}

#[tokio::test]
async fn test_forwarder_removal_stops_at_failed_step() -> Result<()> {
    let (_dir, config) = setup_config(Network::Mumbai);
    record_forwarder_recipients(&config)?;

    let plan = trusted_forwarder_plan(&config.registry(), config.network, FORWARDER, false)?;
    assert_eq!(plan.len(), 4);

    let transactor = MockTransactor::failing_on(2);
    let err = execute_plan(&plan, &transactor, 1).await.unwrap_err();

    // Steps 3 and 4 are never attempted
    let submitted = transactor.submitted();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0].contract, ContractName::TalentLayerId);
    assert_eq!(submitted[1].contract, ContractName::ServiceRegistry);

    match err {
        ScriptError::StepFailed {
            step,
            total,
            completed,
            source,
            ..
        } => {
            assert_eq!((step, total, completed), (2, 4, 1));
            assert!(matches!(*source, ScriptError::Transaction(_)));
        }
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_forwarder_addition_calls_every_recipient_in_order() -> Result<()> {
    let (_dir, config) = setup_config(Network::Fuji);
    record_forwarder_recipients(&config)?;

    let plan = trusted_forwarder_plan(&config.registry(), config.network, FORWARDER, true)?;
    let transactor = MockTransactor::default();
    let receipts = execute_plan(&plan, &transactor, 1).await?;

    assert_eq!(receipts.len(), 4);
    let submitted = transactor.submitted();
    let contracts: Vec<_> = submitted.iter().map(|step| step.contract).collect();
    assert_eq!(contracts, ContractName::FORWARDER_RECIPIENTS);
    assert!(submitted
        .iter()
        .all(|step| step.call == AdminCall::AddTrustedForwarder { forwarder: FORWARDER }));
    assert_eq!(submitted[3].address, Address::repeat_byte(4));

    Ok(())
}

#[tokio::test]
async fn test_resume_skips_completed_steps() -> Result<()> {
    let (_dir, config) = setup_config(Network::Mumbai);
    record_forwarder_recipients(&config)?;

    let plan = trusted_forwarder_plan(&config.registry(), config.network, FORWARDER, false)?;
    let transactor = MockTransactor::default();
    let receipts = execute_plan(&plan, &transactor, 2).await?;

    let contracts: Vec<_> = transactor.submitted().iter().map(|step| step.contract).collect();
    assert_eq!(
        contracts,
        [
            ContractName::ServiceRegistry,
            ContractName::TalentLayerReview,
            ContractName::TalentLayerEscrow,
        ]
    );
    assert_eq!(receipts.first().map(|receipt| receipt.step), Some(2));

    let err = execute_plan(&plan, &transactor, 5).await.unwrap_err();
    assert!(matches!(err, ScriptError::Configuration(_)));
    Ok(())
}

#[tokio::test]
async fn test_missing_entry_fails_before_any_transaction() -> Result<()> {
    let (_dir, config) = setup_config(Network::Fuji);
    let registry = config.registry();
    registry.set(config.network, ContractName::TalentLayerId, Address::repeat_byte(1), None)?;
    registry.set(config.network, ContractName::ServiceRegistry, Address::repeat_byte(2), None)?;

    let err = trusted_forwarder_plan(&registry, config.network, FORWARDER, true).unwrap_err();
    assert_eq!(
        err.to_string(),
        "no deployment of TalentLayerReview recorded for network fuji"
    );

    let err = mint_platform_id_plan(&registry, config.network, "hirevibes".to_string(), FORWARDER)
        .unwrap_err();
    assert!(matches!(err, ScriptError::Deployments(e) if e.is_not_found()));
    Ok(())
}

#[tokio::test]
async fn test_deploy_records_address() -> Result<()> {
    let (_dir, config) = setup_config(Network::Localhost);
    let transactor = MockTransactor::default();

    let deployed = deploy(
        &config,
        &transactor,
        ContractName::SimpleErc20,
        Bytes::from_static(&[0x60, 0x80]),
    )
    .await?;

    assert_eq!(
        config.registry().get(Network::Localhost, ContractName::SimpleErc20)?,
        deployed.address
    );
    Ok(())
}

#[tokio::test]
async fn test_deploy_with_unwritable_registry_sends_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    // The registry root is a file, so no network file can be created under it
    let root = dir.path().join(".deployment");
    std::fs::write(&root, "not a directory")?;
    let config = ScriptConfig::new(Network::Mumbai, root, false);

    let transactor = MockTransactor::default();
    let result = deploy(
        &config,
        &transactor,
        ContractName::TalentLayerId,
        Bytes::from_static(&[0x60, 0x80]),
    )
    .await;

    assert!(matches!(result, Err(ScriptError::Deployments(_))));
    assert_eq!(transactor.deployments(), 0);
    Ok(())
}

#[tokio::test]
async fn test_prepare_upgrade_records_nothing() -> Result<()> {
    let (_dir, config) = setup_config(Network::Fuji);
    let registry = config.registry();
    let proxy = Address::repeat_byte(1);
    registry.set(config.network, ContractName::TalentLayerEscrow, proxy, None)?;

    let transactor = MockTransactor::default();
    let deployed = prepare_upgrade(
        &config,
        &transactor,
        ContractName::TalentLayerEscrow,
        Bytes::from_static(&[0x60, 0x80]),
    )
    .await?;

    assert_ne!(deployed.address, proxy);
    let entry = registry.entry(config.network, ContractName::TalentLayerEscrow)?;
    assert_eq!(entry.address, proxy);
    assert_eq!(entry.implementation, None);
    Ok(())
}

#[tokio::test]
async fn test_upgrade_records_implementation() -> Result<()> {
    let (_dir, config) = setup_config(Network::Mumbai);
    let registry = config.registry();
    let proxy = Address::repeat_byte(1);
    let proxy_admin = Address::repeat_byte(2);
    let implementation = Address::repeat_byte(3);
    registry.set(config.network, ContractName::ServiceRegistry, proxy, None)?;
    registry.set(config.network, ContractName::ProxyAdmin, proxy_admin, None)?;

    let transactor = MockTransactor::default();
    upgrade_proxy(
        &config,
        &transactor,
        ContractName::ServiceRegistry,
        implementation,
        Bytes::new(),
    )
    .await?;

    let submitted = transactor.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].address, proxy_admin);
    assert_eq!(submitted[0].call.function_name(), "upgrade");

    let entry = registry.entry(config.network, ContractName::ServiceRegistry)?;
    assert_eq!(entry.address, proxy);
    assert_eq!(entry.implementation, Some(implementation));
    Ok(())
}

#[tokio::test]
async fn test_failed_upgrade_records_nothing() -> Result<()> {
    let (_dir, config) = setup_config(Network::Mumbai);
    let registry = config.registry();
    registry.set(config.network, ContractName::ServiceRegistry, Address::repeat_byte(1), None)?;
    registry.set(config.network, ContractName::ProxyAdmin, Address::repeat_byte(2), None)?;

    let transactor = MockTransactor::failing_on(1);
    let result = upgrade_proxy(
        &config,
        &transactor,
        ContractName::ServiceRegistry,
        Address::repeat_byte(3),
        Bytes::new(),
    )
    .await;

    assert!(matches!(result, Err(ScriptError::StepFailed { step: 1, .. })));
    let entry = registry.entry(config.network, ContractName::ServiceRegistry)?;
    assert_eq!(entry.implementation, None);
    Ok(())
}

/// A forwarder configured on fuji only must not resolve on mumbai
#[tokio::test]
async fn test_networks_are_isolated_end_to_end() -> Result<()> {
    let dir = TempDir::new()?;
    let root = dir.path().join(".deployment");
    let fuji = ScriptConfig::new(Network::Fuji, &root, false);
    let mumbai = ScriptConfig::new(Network::Mumbai, &root, false);
    record_forwarder_recipients(&fuji)?;

    let plan = trusted_forwarder_plan(&fuji.registry(), fuji.network, FORWARDER, true)?;
    let transactor = MockTransactor::default();
    execute_plan(&plan, &transactor, 1).await?;

    let err = trusted_forwarder_plan(&mumbai.registry(), mumbai.network, FORWARDER, true)
        .unwrap_err();
    assert!(matches!(err, ScriptError::Deployments(e) if e.is_not_found()));
    assert_eq!(transactor.submitted().len(), 4);
    Ok(())
}
