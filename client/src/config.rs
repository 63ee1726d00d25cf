use crate::error::{ClientError, ClientResult};
use anchor_lang::prelude::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub program_id: String,
    pub keypair_path: PathBuf,
    pub commitment: CommitmentConfig,
    pub log_level: String,
}

impl ClientConfig {
    /// Create client config from environment variables
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let rpc_url = lookup("SOLANA_RPC_URL").unwrap_or(defaults.rpc_url);
        validate_rpc_url(&rpc_url)?;

        let program_id = lookup("PROGRAM_ID").unwrap_or(defaults.program_id);
        Pubkey::from_str(&program_id)
            .map_err(|e| ClientError::Config(format!("Invalid PROGRAM_ID {}: {}", program_id, e)))?;

        let keypair_path = lookup("KEYPAIR_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.keypair_path);

        let commitment = match lookup("SOLANA_COMMITMENT") {
            Some(value) => parse_commitment(&value)?,
            None => defaults.commitment,
        };

        let log_level = lookup("LOG_LEVEL")
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.as_str()) {
            return Err(ClientError::Config(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            )));
        }

        Ok(Self {
            rpc_url,
            program_id,
            keypair_path,
            commitment,
            log_level,
        })
    }

    /// Replace the RPC endpoint, applying the same check as `SOLANA_RPC_URL`
    pub fn with_rpc_url(mut self, rpc_url: &str) -> ClientResult<Self> {
        validate_rpc_url(rpc_url)?;
        self.rpc_url = rpc_url.to_string();
        Ok(self)
    }

    /// Parsed program id
    pub fn program_id(&self) -> ClientResult<Pubkey> {
        Pubkey::from_str(&self.program_id)
            .map_err(|e| ClientError::Config(format!("Invalid program ID: {}", e)))
    }

    /// Check if pointed at a local validator
    pub fn is_localnet(&self) -> bool {
        self.rpc_url.contains("127.0.0.1") || self.rpc_url.contains("localhost")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            program_id: solana_private_prediction_market::ID.to_string(),
            keypair_path: default_keypair_path(),
            commitment: CommitmentConfig::confirmed(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn validate_rpc_url(rpc_url: &str) -> ClientResult<()> {
    if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
        return Err(ClientError::Config(format!(
            "Invalid RPC URL: {}. Must be an http(s) URL",
            rpc_url
        )));
    }
    Ok(())
}

/// Parse a commitment level name
pub fn parse_commitment(value: &str) -> ClientResult<CommitmentConfig> {
    match value.to_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(ClientError::Config(format!(
            "Invalid SOLANA_COMMITMENT: {}. Must be one of: processed, confirmed, finalized",
            other
        ))),
    }
}

/// The Solana CLI's default wallet location
pub fn default_keypair_path() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config").join("solana").join("id.json")
}
