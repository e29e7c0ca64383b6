//! Utilities for the operations scripts

use std::{fs, path::Path, str::FromStr};

use alloy::{
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder},
    transports::http::reqwest::Url,
};
use serde_json::Value;
use tracing::info;

use crate::{
    config::ChainConfig,
    constants::{ARTIFACT_BYTECODE_KEY, ARTIFACT_BYTECODE_OBJECT_KEY},
    errors::ScriptError,
    transactor::Client,
};

/// Sets up a signing client for the configured network, checking that the
/// node reports the network's chain ID
pub async fn setup_client(config: &ChainConfig) -> Result<Client, ScriptError> {
    let url = Url::parse(&config.rpc_url)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let provider = ProviderBuilder::new()
        .wallet(config.signer.clone())
        .connect_http(url);

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    if let Some(expected) = config.network.chain_id() {
        if chain_id != expected {
            return Err(ScriptError::Configuration(format!(
                "RPC node reports chain ID {chain_id}, but {} has chain ID {expected}",
                config.network
            )));
        }
    }

    info!(
        network = %config.network,
        chain_id,
        sender = %config.signer.address(),
        "connected to RPC node"
    );
    Ok(DynProvider::new(provider))
}

/// Parse an address argument, rejecting the zero address
pub fn parse_address(value: &str) -> Result<Address, ScriptError> {
    let address = Address::from_str(value.trim())
        .map_err(|e| ScriptError::CalldataConstruction(format!("invalid address {value}: {e}")))?;

    if address.is_zero() {
        return Err(ScriptError::CalldataConstruction(
            "the zero address is not a valid argument".to_string(),
        ));
    }

    Ok(address)
}

/// Parse a hex-encoded byte string, with or without a `0x` prefix
pub fn parse_hex_bytes(value: &str) -> Result<Bytes, ScriptError> {
    Bytes::from_str(value.trim())
        .map_err(|e| ScriptError::CalldataConstruction(format!("invalid hex {value}: {e}")))
}

/// Read the creation bytecode from a compilation artifact file
pub fn read_bytecode_artifact(path: &Path) -> Result<Bytes, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;

    parse_bytecode_artifact(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))
}

/// Extract creation bytecode from the contents of a compilation artifact.
///
/// Accepts Hardhat artifacts (`"bytecode": "0x…"`), Foundry artifacts
/// (`"bytecode": { "object": "0x…" }`), and raw hex as emitted by `solc --bin`.
pub fn parse_bytecode_artifact(contents: &str) -> Result<Bytes, String> {
    let contents = contents.trim();

    let hex = if contents.starts_with('{') {
        let artifact: Value = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        let bytecode = &artifact[ARTIFACT_BYTECODE_KEY];

        bytecode
            .as_str()
            .or_else(|| bytecode[ARTIFACT_BYTECODE_OBJECT_KEY].as_str())
            .ok_or_else(|| format!("artifact has no `{ARTIFACT_BYTECODE_KEY}` field"))?
            .to_string()
    } else {
        contents.to_string()
    };

    let bytecode = Bytes::from_str(&hex).map_err(|e| format!("invalid bytecode hex: {e}"))?;
    if bytecode.is_empty() {
        return Err("artifact has no deployable bytecode".to_string());
    }

    Ok(bytecode)
}
