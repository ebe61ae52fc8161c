use config::{Config as ConfigLoader, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Environment variable pointing at the directory holding `chains.toml`
pub const CONFIG_DIR_ENV: &str = "SAFE_CONSOLE_CONFIG_DIR";

/// Optional capabilities a chain may advertise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainFeature {
    /// Type-2 transactions with max fee / priority fee
    Eip1559,
    /// Counterfactual (deploy on first transaction) Safes
    Counterfactual,
    /// MPC social login signer
    SocialLogin,
    /// Recovery module with email notifications
    Recovery,
}

/// Native currency of a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// Chain information loaded from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Numeric EIP-155 chain id
    pub chain_id: u64,
    /// Human readable chain name
    pub chain_name: String,
    /// Default RPC endpoint
    pub rpc_url: String,
    /// Enabled chain features
    #[serde(default)]
    pub features: Vec<ChainFeature>,
    /// Native token
    #[serde(default)]
    pub native_currency: NativeCurrency,
}

impl ChainInfo {
    /// Create a new chain with no features enabled
    pub fn new(chain_id: u64, chain_name: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id,
            chain_name: chain_name.into(),
            rpc_url: rpc_url.into(),
            features: Vec::new(),
            native_currency: NativeCurrency::default(),
        }
    }

    /// Enable a feature
    pub fn with_feature(mut self, feature: ChainFeature) -> Self {
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
        self
    }

    /// Whether the chain advertises a feature
    pub fn has_feature(&self, feature: ChainFeature) -> bool {
        self.features.contains(&feature)
    }

    /// Load a chain section (e.g. `sepolia`) from `chains.toml`
    pub fn load(chain: &str) -> Result<Self, ConfigError> {
        let config_dir = env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| "config".to_string());

        let settings = ConfigLoader::builder()
            .add_source(File::with_name(&format!("{}/chains", config_dir)))
            .build()?;

        settings.get::<ChainInfo>(chain)
    }

    /// Load every chain section from `chains.toml`, keyed by section name
    pub fn load_all() -> Result<BTreeMap<String, Self>, ConfigError> {
        let config_dir = env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| "config".to_string());
        Self::load_all_from(Path::new(&config_dir))
    }

    /// Load every chain section from `<dir>/chains.toml`.
    ///
    /// A missing file yields no chains; a malformed one is an error.
    pub fn load_all_from(dir: &Path) -> Result<BTreeMap<String, Self>, ConfigError> {
        let settings = ConfigLoader::builder()
            .add_source(File::with_name(&dir.join("chains").to_string_lossy()).required(false))
            .build()?;

        settings.try_deserialize::<BTreeMap<String, ChainInfo>>()
    }
}

/// Console configuration persisted between sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Section name of the active chain in `chains.toml`
    pub active_chain: String,
    /// Where undeployed Safes are stored; defaults next to the config file
    pub registry_path: Option<PathBuf>,
    /// Chains configured inline, taking precedence over `chains.toml`
    #[serde(default)]
    pub chains: BTreeMap<String, ChainInfo>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            active_chain: "sepolia".to_string(),
            registry_path: None,
            chains: BTreeMap::new(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a file
    pub fn load(path: &PathBuf) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        let config: ConsoleConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default(path: &PathBuf) -> Result<Self, Error> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &PathBuf) -> Result<(), Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("safe-console");
        path.push("config.toml");
        path
    }

    /// Path of the undeployed Safe registry file
    pub fn registry_path(&self) -> PathBuf {
        self.registry_path.clone().unwrap_or_else(|| {
            let mut path = Self::default_path();
            path.set_file_name("undeployed_safes.json");
            path
        })
    }

    /// Resolve the active chain, inline chains first
    pub fn active_chain(&self) -> Result<ChainInfo, Error> {
        self.chain(&self.active_chain)
    }

    /// Resolve a chain by section name, inline chains first
    pub fn chain(&self, name: &str) -> Result<ChainInfo, Error> {
        if let Some(chain) = self.chains.get(name) {
            return Ok(chain.clone());
        }
        ChainInfo::load(name).map_err(Error::from)
    }

    /// Resolve a chain by numeric id among inline and file chains
    pub fn chain_by_id(&self, chain_id: u64) -> Result<ChainInfo, Error> {
        if let Some(chain) = self.chains.values().find(|c| c.chain_id == chain_id) {
            return Ok(chain.clone());
        }
        ChainInfo::load_all()?
            .into_values()
            .find(|c| c.chain_id == chain_id)
            .ok_or_else(|| Error::Config(format!("Unknown chain id {}", chain_id)))
    }
}
