use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anchor_lang::prelude::Pubkey;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod client;
pub mod digest;
pub mod verify;
pub mod view;

#[derive(Debug, Error)]
pub enum DsigError {
    #[error("config file exists: {0}")]
    ConfigExists(String),
    #[error("config not found: {0}")]
    ConfigNotFound(String),
    #[error("unknown config key: {0}")]
    UnknownConfigKey(String),
    #[error("invalid program id {0}")]
    InvalidProgramId(String),
    #[error("no registry account at {0}")]
    RegistryNotFound(Pubkey),
    #[error("account {address} is owned by {owner}, not the registry program")]
    ForeignAccount { address: Pubkey, owner: Pubkey },
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsigConfig {
    pub cluster: String,
    pub rpc_url: String,
    pub keypair_path: PathBuf,
    pub commitment: String,
    /// Deployed registry program; the built-in id is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
}

impl Default for DsigConfig {
    fn default() -> Self {
        Self {
            cluster: "devnet".to_string(),
            rpc_url: default_cluster_rpc_url("devnet"),
            keypair_path: default_solana_keypair_path(),
            commitment: "confirmed".to_string(),
            program_id: None,
        }
    }
}

impl DsigConfig {
    pub fn program_id(&self) -> Result<Pubkey> {
        match self.program_id.as_deref() {
            Some(id) => Pubkey::from_str(id.trim())
                .map_err(|_| DsigError::InvalidProgramId(id.to_string()).into()),
            None => Ok(digital_signatures_contract::ID),
        }
    }
}

/// Command-line values that take precedence over the environment and the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rpc_url: Option<String>,
    pub keypair_path: Option<PathBuf>,
    pub program_id: Option<String>,
}

pub fn write_config_file(path: &Path, cfg: &DsigConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(DsigError::ConfigExists(path.display().to_string()).into());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let toml_string = toml::to_string_pretty(cfg)?;
    let mut file =
        fs::File::create(path).with_context(|| format!("create file {}", path.display()))?;
    file.write_all(toml_string.as_bytes())
        .with_context(|| format!("write file {}", path.display()))?;
    Ok(())
}

pub fn read_config_from(path: &Path) -> Result<DsigConfig> {
    if !path.exists() {
        return Err(DsigError::ConfigNotFound(path.display().to_string()).into());
    }
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parse TOML at {}", path.display()))
}

pub fn save_default_config(cfg: &DsigConfig) -> Result<()> {
    write_config_file(&default_config_file_path(), cfg, true)
}

pub fn read_config_file() -> Result<DsigConfig> {
    read_config_from(&default_config_file_path())
}

/// Config file values, then `SOLANA_RPC_URL`/`SOLANA_KEYPAIR`/`DSIG_PROGRAM_ID`, then `overrides`.
pub fn load_config_with_overrides(overrides: ConfigOverrides) -> Result<DsigConfig> {
    let mut cfg = read_config_file().unwrap_or_default();
    if let Some(rpc) = overrides.rpc_url {
        cfg.rpc_url = rpc;
    } else if let Some(env_rpc) = non_empty_env("SOLANA_RPC_URL") {
        cfg.rpc_url = env_rpc;
    }
    if let Some(kp) = overrides.keypair_path.as_deref().map(expand_tilde) {
        cfg.keypair_path = kp;
    } else if let Some(env_kp) = non_empty_env("SOLANA_KEYPAIR") {
        cfg.keypair_path = expand_tilde(Path::new(&env_kp));
    }
    if let Some(program_id) = overrides.program_id {
        cfg.program_id = Some(program_id);
    } else if let Some(env_program) = non_empty_env("DSIG_PROGRAM_ID") {
        cfg.program_id = Some(env_program);
    }
    Ok(cfg)
}

pub fn get_config_value(cfg: &DsigConfig, key: &str) -> Result<String> {
    match key {
        "cluster" => Ok(cfg.cluster.clone()),
        "rpc_url" => Ok(cfg.rpc_url.clone()),
        "keypair_path" => Ok(cfg.keypair_path.display().to_string()),
        "commitment" => Ok(cfg.commitment.clone()),
        "program_id" => Ok(cfg.program_id()?.to_string()),
        _ => Err(DsigError::UnknownConfigKey(key.to_string()).into()),
    }
}

pub fn set_config_value(cfg: &mut DsigConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "cluster" => {
            cfg.cluster = value.to_string();
            cfg.rpc_url = default_cluster_rpc_url(value);
        }
        "rpc_url" => cfg.rpc_url = value.to_string(),
        "keypair_path" => cfg.keypair_path = expand_tilde(Path::new(value)),
        "commitment" => cfg.commitment = value.to_string(),
        "program_id" => {
            Pubkey::from_str(value).map_err(|_| DsigError::InvalidProgramId(value.to_string()))?;
            cfg.program_id = Some(value.to_string());
        }
        _ => return Err(DsigError::UnknownConfigKey(key.to_string()).into()),
    }
    Ok(())
}

pub fn default_config_file_path() -> PathBuf {
    xdg_config_home().join("dsig").join("config.toml")
}

pub fn xdg_config_home() -> PathBuf {
    if let Some(xdg) = non_empty_env("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg.trim());
    }
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config")
}

/// Same default as the Solana CLI.
pub fn default_solana_keypair_path() -> PathBuf {
    if let Some(env_kp) = non_empty_env("SOLANA_KEYPAIR") {
        return expand_tilde(Path::new(&env_kp));
    }
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("solana").join("id.json")
}

pub fn default_cluster_rpc_url(cluster: &str) -> String {
    match cluster {
        "mainnet" | "mainnet-beta" => "https://api.mainnet-beta.solana.com".to_string(),
        "testnet" => "https://api.testnet.solana.com".to_string(),
        "localnet" | "local" => "http://127.0.0.1:8899".to_string(),
        _ => "https://api.devnet.solana.com".to_string(),
    }
}

/// Pubsub endpoint matching an RPC URL. Local validators serve it one port up.
pub fn websocket_url(rpc_url: &str) -> String {
    if rpc_url.contains("127.0.0.1:8899") || rpc_url.contains("localhost:8899") {
        return rpc_url
            .replacen("http", "ws", 1)
            .replacen(":8899", ":8900", 1);
    }
    rpc_url.replacen("http", "ws", 1)
}

pub fn expand_tilde(path: &Path) -> PathBuf {
    let p = path.to_string_lossy();
    if let Some(stripped) = p.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
