//! Export of recorded addresses to the subgraph's network configuration

use std::path::Path;

use serde_json::{Map, Value};
use talentlayer_deployments::{
    fs::{read_json, write_json_atomic},
    Network, NetworkDeployments,
};

use crate::errors::ScriptError;

/// The key of a contract's address in the subgraph network configuration
const ADDRESS_KEY: &str = "address";

/// Merge a network's recorded addresses into a subgraph `networks.json` file.
///
/// The file maps network names to contract names to data sources, e.g.
/// `{ "mumbai": { "TalentLayerID": { "address": "0x…", "startBlock": 1 } } }`.
/// Only the `address` fields of the given network are written; other networks
/// and other data source fields are preserved, in their existing order. A
/// missing file is created.
pub fn update_subgraph_networks(
    path: &Path,
    network: Network,
    deployments: &NetworkDeployments,
) -> Result<(), ScriptError> {
    let mut networks: Value = read_json(path)?.unwrap_or_else(|| Value::Object(Map::new()));
    let root = networks.as_object_mut().ok_or_else(|| {
        ScriptError::Configuration(format!("{} is not a JSON object", path.display()))
    })?;

    let sources = root
        .entry(network.as_str())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| {
            ScriptError::Configuration(format!(
                "entry for {network} in {} is not a JSON object",
                path.display()
            ))
        })?;

    for (name, entry) in deployments {
        let source = sources
            .entry(name.as_str())
            .or_insert_with(|| Value::Object(Map::new()));
        match source.as_object_mut() {
            Some(fields) => {
                fields.insert(
                    ADDRESS_KEY.to_string(),
                    Value::String(entry.address.to_checksum(None)),
                );
            }
            None => {
                return Err(ScriptError::Configuration(format!(
                    "entry for {name} on {network} in {} is not a JSON object",
                    path.display()
                )))
            }
        }
    }

    write_json_atomic(path, &networks)?;
    Ok(())
}
