//! Constants used in the operations scripts

/// The default directory holding the per-network deployments files
pub const DEFAULT_DEPLOYMENTS_DIR: &str = ".deployment";

/// The name of the environment variable selecting the target network
pub const NETWORK_ENV_VAR: &str = "NETWORK";

/// The name of the environment variable overriding the deployments directory
pub const DEPLOYMENTS_DIR_ENV_VAR: &str = "DEPLOYMENTS_DIR";

/// The name of the environment variable holding a hex-encoded private key
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// The name of the environment variable holding a BIP-39 mnemonic
pub const MNEMONIC_ENV_VAR: &str = "MNEMONIC";

/// The name of the environment variable selecting the mnemonic account index
pub const ACCOUNT_INDEX_ENV_VAR: &str = "ACCOUNT_INDEX";

/// The name of the environment variable holding the Infura API key
pub const INFURA_API_KEY_ENV_VAR: &str = "INFURA_API_KEY";

/// The name of the environment variable overriding the network's RPC URL
pub const RPC_URL_ENV_VAR: &str = "RPC_URL";

/// The name of the environment variable pointing at the subgraph folder
pub const SUBGRAPH_FOLDER_ENV_VAR: &str = "SUBGRAPH_FOLDER";

/// The name of the subgraph's network configuration file
pub const SUBGRAPH_NETWORKS_FILE: &str = "networks.json";

/// The RPC URL of a local development node
pub const LOCALHOST_RPC_URL: &str = "http://127.0.0.1:8545";

/// The Infura RPC URL prefix for Ethereum mainnet
pub const MAINNET_INFURA_URL: &str = "https://mainnet.infura.io/v3/";

/// The Infura RPC URL prefix for Avalanche C-Chain
pub const AVALANCHE_INFURA_URL: &str = "https://avalanche-mainnet.infura.io/v3/";

/// The Infura RPC URL prefix for the Avalanche Fuji testnet
pub const FUJI_INFURA_URL: &str = "https://avalanche-fuji.infura.io/v3/";

/// The public RPC URL for Polygon PoS
pub const POLYGON_RPC_URL: &str = "https://polygon-rpc.com/";

/// The public RPC URL for the Polygon Mumbai testnet
pub const MUMBAI_RPC_URL: &str = "https://matic-mumbai.chainstacklabs.com";

/// The key under which Hardhat and Foundry artifacts store deployment bytecode
pub const ARTIFACT_BYTECODE_KEY: &str = "bytecode";

/// The key under which Foundry artifacts nest the bytecode hex string
pub const ARTIFACT_BYTECODE_OBJECT_KEY: &str = "object";
