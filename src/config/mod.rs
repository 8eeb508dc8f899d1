use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use alloy_json_abi::JsonAbi;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::domain::abi::decode_contract_abi;
use crate::domain::contract::ContractVersionSet;
use crate::infrastructure::ethereum::{ContractHandle, EthereumProvider};

/// One logical contract and the addresses it was deployed at
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentSpec {
    pub name: String,
    /// Base64, deflate-compressed ABI JSON
    pub abi: Option<String>,
    /// Plain ABI JSON file, used when `abi` is absent
    pub abi_path: Option<PathBuf>,
    /// Deployment addresses, oldest first
    #[serde(default)]
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: Option<String>,

    #[serde(default = "default_confirmations")]
    pub confirmations: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub deployments: Vec<DeploymentSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: None,
            confirmations: default_confirmations(),
            poll_interval_ms: default_poll_interval_ms(),
            deployments: Vec::new(),
        }
    }
}

fn default_confirmations() -> u64 {
    12
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn deployment(&self, name: &str) -> Option<&DeploymentSpec> {
        self.deployments.iter().find(|d| d.name == name)
    }
}

impl DeploymentSpec {
    /// Load the ABI from the inline blob or the ABI file
    pub fn load_abi(&self) -> Result<JsonAbi> {
        if let Some(blob) = &self.abi {
            return decode_contract_abi(blob)
                .with_context(|| format!("decode ABI for deployment '{}'", self.name));
        }
        if let Some(path) = &self.abi_path {
            let content = fs::read_to_string(path)
                .with_context(|| format!("read ABI file {}", path.display()))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("parse ABI file {}", path.display()));
        }
        bail!("deployment '{}' has neither `abi` nor `abi_path`", self.name)
    }

    pub fn parsed_addresses(&self) -> Result<Vec<Address>> {
        self.addresses
            .iter()
            .map(|addr| {
                addr.trim()
                    .parse::<Address>()
                    .with_context(|| format!("invalid address '{}' in '{}'", addr, self.name))
            })
            .collect()
    }

    /// Build the version set for this deployment, every version sharing the ABI
    pub fn version_set(
        &self,
        provider: Arc<dyn EthereumProvider>,
    ) -> Result<ContractVersionSet<ContractHandle>> {
        let abi = Arc::new(self.load_abi()?);
        let handles = self
            .parsed_addresses()?
            .into_iter()
            .map(|address| ContractHandle::new(address, Arc::clone(&abi), Arc::clone(&provider)))
            .collect();
        ContractVersionSet::new(handles)
            .with_context(|| format!("deployment '{}' lists no addresses", self.name))
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    load_from(&path)
}

/// Read a config file; a missing or malformed file yields the defaults
pub fn load_from(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring invalid config");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("STAKEKIT_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("stakekit").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("stakekit").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "stakekit", "stakekit")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
