//! The deployment registry, backed by one JSON file per network

use std::path::PathBuf;

use alloy_primitives::Address;
use tracing::debug;

use crate::{
    errors::DeploymentsError,
    fs::{check_writable, read_json, write_json_atomic},
    types::{ContractName, DeploymentEntry, Network, NetworkDeployments},
};

/// The extension of the per-network deployments files
const DEPLOYMENTS_FILE_EXTENSION: &str = "json";

/// A registry of deployed contract addresses.
///
/// The registry holds no state beyond its root directory: every read goes to
/// disk and every write is persisted before returning, so separate script
/// invocations always observe each other's writes.
#[derive(Debug, Clone)]
pub struct DeploymentRegistry {
    /// The directory holding the per-network deployments files
    root: PathBuf,
}

impl DeploymentRegistry {
    /// Create a registry rooted at the given directory.
    ///
    /// The directory is created on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The path of the deployments file for the given network
    pub fn network_file(&self, network: Network) -> PathBuf {
        self.root
            .join(network.as_str())
            .with_extension(DEPLOYMENTS_FILE_EXTENSION)
    }

    /// Load every deployment recorded for the given network.
    ///
    /// A file holding the zero address for any contract is rejected.
    pub fn load(&self, network: Network) -> Result<NetworkDeployments, DeploymentsError> {
        let deployments = self.read_network(network)?;
        if let Some((name, _)) = deployments.iter().find(|(_, entry)| entry.has_zero_address()) {
            return Err(DeploymentsError::ZeroAddress {
                network,
                name: *name,
            });
        }

        Ok(deployments)
    }

    /// Get the full entry recorded for a contract on the given network
    pub fn entry(
        &self,
        network: Network,
        name: ContractName,
    ) -> Result<DeploymentEntry, DeploymentsError> {
        let entry = self
            .read_network(network)?
            .remove(&name)
            .ok_or(DeploymentsError::NotFound { network, name })?;
        if entry.has_zero_address() {
            return Err(DeploymentsError::ZeroAddress { network, name });
        }

        Ok(entry)
    }

    /// Get the address recorded for a contract on the given network
    pub fn get(&self, network: Network, name: ContractName) -> Result<Address, DeploymentsError> {
        self.entry(network, name).map(|entry| entry.address)
    }

    /// Whether an address has been recorded for a contract on the given network
    pub fn exists(&self, network: Network, name: ContractName) -> Result<bool, DeploymentsError> {
        Ok(self.read_network(network)?.contains_key(&name))
    }

    /// Record the address of a contract on the given network, replacing any
    /// previously recorded entry, and persist the network's file
    pub fn set(
        &self,
        network: Network,
        name: ContractName,
        address: Address,
        implementation: Option<Address>,
    ) -> Result<(), DeploymentsError> {
        let entry = DeploymentEntry {
            address,
            implementation,
        };
        if entry.has_zero_address() {
            return Err(DeploymentsError::ZeroAddress { network, name });
        }

        // Other entries are written back unvalidated
        let mut deployments = self.read_network(network)?;
        if let Some(previous) = deployments.insert(name, entry) {
            if previous != entry {
                debug!(%network, contract = %name, previous = %previous.address, "replacing recorded deployment");
            }
        }

        write_json_atomic(&self.network_file(network), &deployments)?;
        debug!(%network, contract = %name, %address, "recorded deployment");
        Ok(())
    }

    /// Check that the network's deployments file can be written.
    ///
    /// Run before any transaction whose result must be recorded, so that a
    /// deployment is never left unrecorded because the registry was unwritable.
    pub fn ensure_writable(&self, network: Network) -> Result<(), DeploymentsError> {
        check_writable(&self.network_file(network))
    }

    /// Read a network's file as stored, treating a missing file as empty
    fn read_network(&self, network: Network) -> Result<NetworkDeployments, DeploymentsError> {
        Ok(read_json(&self.network_file(network))?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use alloy_primitives::{address, Address};
    use tempfile::TempDir;

    use super::DeploymentRegistry;
    use crate::{
        errors::DeploymentsError,
        types::{ContractName, Network},
    };

    const ADDR_A: Address = address!("0x00000000000000000000000000000000000000aa");
    const ADDR_B: Address = address!("0x00000000000000000000000000000000000000bb");

    fn setup_registry() -> (TempDir, DeploymentRegistry) {
        let dir = TempDir::new().unwrap();
        let registry = DeploymentRegistry::new(dir.path().join(".deployment"));
        (dir, registry)
    }

    #[test]
    fn test_set_then_get() {
        let (_dir, registry) = setup_registry();
        registry
            .set(Network::Fuji, ContractName::TalentLayerId, ADDR_A, None)
            .unwrap();

        assert_eq!(
            registry.get(Network::Fuji, ContractName::TalentLayerId).unwrap(),
            ADDR_A
        );
    }

    #[test]
    fn test_get_unwritten_is_not_found() {
        let (_dir, registry) = setup_registry();
        let err = registry
            .get(Network::Fuji, ContractName::ServiceRegistry)
            .unwrap_err();

        assert!(matches!(
            err,
            DeploymentsError::NotFound {
                network: Network::Fuji,
                name: ContractName::ServiceRegistry
            }
        ));
    }

    #[test]
    fn test_zero_address_is_rejected() {
        let (_dir, registry) = setup_registry();
        let err = registry
            .set(Network::Fuji, ContractName::TalentLayerId, Address::ZERO, None)
            .unwrap_err();
        assert!(matches!(err, DeploymentsError::ZeroAddress { .. }));

        let err = registry
            .set(
                Network::Fuji,
                ContractName::TalentLayerId,
                ADDR_A,
                Some(Address::ZERO),
            )
            .unwrap_err();
        assert!(matches!(err, DeploymentsError::ZeroAddress { .. }));
        assert!(!registry
            .exists(Network::Fuji, ContractName::TalentLayerId)
            .unwrap());
    }

    #[test]
    fn test_implementation_is_kept_with_entry() {
        let (_dir, registry) = setup_registry();
        registry
            .set(
                Network::Polygon,
                ContractName::ServiceRegistry,
                ADDR_A,
                Some(ADDR_B),
            )
            .unwrap();

        let entry = registry
            .entry(Network::Polygon, ContractName::ServiceRegistry)
            .unwrap();
        assert_eq!(entry.address, ADDR_A);
        assert_eq!(entry.implementation, Some(ADDR_B));
    }

    #[test]
    fn test_network_file_layout() {
        let (_dir, registry) = setup_registry();
        registry
            .set(Network::Mumbai, ContractName::TalentLayerId, ADDR_A, None)
            .unwrap();

        let path = registry.network_file(Network::Mumbai);
        assert!(path.ends_with(".deployment/mumbai.json"));

        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("\"TalentLayerID\""));
        assert!(!contents.contains("implementation"));
    }

    #[test]
    fn test_unknown_contract_in_file_is_a_parse_error() {
        let (_dir, registry) = setup_registry();
        let path = registry.network_file(Network::Fuji);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{ "TalentLayerIdd": { "address": "0x00000000000000000000000000000000000000aa" } }"#,
        )
        .unwrap();

        let err = registry.load(Network::Fuji).unwrap_err();
        assert!(matches!(err, DeploymentsError::Parse { .. }));
    }

    #[test]
    fn test_ensure_writable_fails_when_root_is_a_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("not-a-dir");
        fs::write(&root, "").unwrap();

        let registry = DeploymentRegistry::new(&root);
        assert!(matches!(
            registry.ensure_writable(Network::Fuji),
            Err(DeploymentsError::Write { .. })
        ));
        assert!(registry
            .set(Network::Fuji, ContractName::TalentLayerId, ADDR_A, None)
            .is_err());
    }
}
