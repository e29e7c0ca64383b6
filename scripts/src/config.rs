//! Configuration assembled once at process entry and passed to every command

use std::{path::PathBuf, str::FromStr};

use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use talentlayer_deployments::{DeploymentRegistry, Network};

use crate::{
    constants::{
        ACCOUNT_INDEX_ENV_VAR, AVALANCHE_INFURA_URL, FUJI_INFURA_URL, INFURA_API_KEY_ENV_VAR,
        LOCALHOST_RPC_URL, MAINNET_INFURA_URL, MNEMONIC_ENV_VAR, MUMBAI_RPC_URL,
        POLYGON_RPC_URL, PRIVATE_KEY_ENV_VAR, RPC_URL_ENV_VAR,
    },
    errors::ScriptError,
};

/// The configuration shared by every command
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// The network the command targets
    pub network: Network,
    /// The directory holding the per-network deployments files
    pub deployments_dir: PathBuf,
    /// Print the transactions a command would submit instead of submitting them
    pub dry_run: bool,
    /// Connection details, present only for commands that touch the chain
    chain: Option<ChainConfig>,
}

impl ScriptConfig {
    /// Create a configuration without chain access
    pub fn new(network: Network, deployments_dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            network,
            deployments_dir: deployments_dir.into(),
            dry_run,
            chain: None,
        }
    }

    /// Attach chain connection details
    pub fn with_chain(mut self, chain: ChainConfig) -> Self {
        self.chain = Some(chain);
        self
    }

    /// The deployment registry the command reads from and writes to
    pub fn registry(&self) -> DeploymentRegistry {
        DeploymentRegistry::new(&self.deployments_dir)
    }

    /// The chain connection details, required by commands that submit transactions
    pub fn chain(&self) -> Result<&ChainConfig, ScriptError> {
        self.chain.as_ref().ok_or_else(|| {
            ScriptError::Configuration(format!(
                "no chain configuration loaded for network {}",
                self.network
            ))
        })
    }
}

/// Connection details for submitting transactions to a network
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// The network being connected to
    pub network: Network,
    /// The RPC URL of a node on the network
    pub rpc_url: String,
    /// The key that signs transactions
    pub signer: PrivateKeySigner,
}

impl ChainConfig {
    /// Build the chain configuration for a network from environment values.
    ///
    /// `lookup` returns the value of an environment variable; empty values are
    /// treated as unset. Fails if no signer is configured or if the network's
    /// RPC URL cannot be determined.
    pub fn from_env(
        network: Network,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ScriptError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let signer = match (var(PRIVATE_KEY_ENV_VAR), var(MNEMONIC_ENV_VAR)) {
            (Some(key), _) => PrivateKeySigner::from_str(key.trim()).map_err(|e| {
                ScriptError::Configuration(format!("invalid {PRIVATE_KEY_ENV_VAR}: {e}"))
            })?,
            (None, Some(phrase)) => {
                let index = var(ACCOUNT_INDEX_ENV_VAR)
                    .map(|index| {
                        index.trim().parse::<u32>().map_err(|e| {
                            ScriptError::Configuration(format!(
                                "invalid {ACCOUNT_INDEX_ENV_VAR}: {e}"
                            ))
                        })
                    })
                    .transpose()?
                    .unwrap_or_default();
                signer_from_mnemonic(&phrase, index)?
            }
            (None, None) => {
                return Err(ScriptError::Configuration(format!(
                    "set either {PRIVATE_KEY_ENV_VAR} or {MNEMONIC_ENV_VAR}"
                )))
            }
        };

        let rpc_url = match var(RPC_URL_ENV_VAR) {
            Some(url) => url,
            None => default_rpc_url(network, var(INFURA_API_KEY_ENV_VAR))?,
        };

        Ok(Self {
            network,
            rpc_url,
            signer,
        })
    }
}

/// Derive a signer from a mnemonic at `m/44'/60'/0'/0/{index}`
fn signer_from_mnemonic(phrase: &str, index: u32) -> Result<PrivateKeySigner, ScriptError> {
    MnemonicBuilder::<English>::default()
        .phrase(phrase.trim())
        .index(index)
        .and_then(|builder| builder.build())
        .map_err(|e| ScriptError::Configuration(format!("invalid {MNEMONIC_ENV_VAR}: {e}")))
}

/// The default RPC URL of a network
fn default_rpc_url(network: Network, infura_key: Option<String>) -> Result<String, ScriptError> {
    let infura = |prefix: &str| {
        infura_key
            .as_deref()
            .map(|key| format!("{prefix}{key}"))
            .ok_or_else(|| {
                ScriptError::Configuration(format!(
                    "{network} requires {INFURA_API_KEY_ENV_VAR} or {RPC_URL_ENV_VAR}"
                ))
            })
    };

    match network {
        Network::Localhost => Ok(LOCALHOST_RPC_URL.to_string()),
        Network::Mainnet => infura(MAINNET_INFURA_URL),
        Network::Avalanche => infura(AVALANCHE_INFURA_URL),
        Network::Fuji => infura(FUJI_INFURA_URL),
        Network::Polygon => Ok(POLYGON_RPC_URL.to_string()),
        Network::Mumbai => Ok(MUMBAI_RPC_URL.to_string()),
    }
}
